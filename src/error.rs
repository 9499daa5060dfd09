//! Error taxonomy for the patch engine.
//!
//! Every error here is local to one patch file or one patch entry. The
//! engine logs and swallows them; nothing propagates to the program loader.

use snafu::Snafu;
use std::io;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Patch file {} does not exist", path.display()))]
    FileNotFound { path: PathBuf },

    #[snafu(display("Could not open patch file {}: {}", path.display(), source))]
    OpenFailed { path: PathBuf, source: io::Error },

    #[snafu(display("Could not list patch directory {}: {}", path.display(), source))]
    ListFailed { path: PathBuf, source: io::Error },

    #[snafu(display("Bad patch file magic {:02X?}", found))]
    MalformedHeader { found: [u8; 3] },

    #[snafu(display("Truncated read of {}: {}", field, source))]
    TruncatedRead {
        field: &'static str,
        source: io::Error,
    },

    #[snafu(display("Could not seek in patch file: {}", source))]
    Seek { source: io::Error },

    /// A displaced write would leave the code image.
    #[snafu(display(
        "Write of {} bytes at {} falls outside a {} byte image",
        len,
        start,
        size
    ))]
    OutOfBounds { start: i64, len: usize, size: usize },

    #[snafu(display("Invalid pattern of {} bytes: {}", len, reason))]
    InvalidPattern { len: usize, reason: &'static str },

    #[snafu(display("{} is {}, the format allows at most {}", field, value, max))]
    FieldOverflow {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[snafu(display("Could not write patch file: {}", source))]
    Write { source: io::Error },
}
