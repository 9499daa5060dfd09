//! `.rnp` patch file codec.
//!
//! ```text
//! offset  size   field
//! 0       3      magic "RNP"
//! 3       1      title count
//! 4       11     reserved
//! 15      3*N    title prefixes, 24-bit little-endian
//! ...     1      patch count
//! ...     10     reserved
//! ...            patch entries:
//!           1    pattern length
//!           1    replacement length
//!           1    repeat count (i8)
//!           1    byte offset (i8)
//!           ...  pattern, then replacement
//! ```

use crate::error::{FieldOverflow, MalformedHeader, Result, Seek, TruncatedRead, Write};
use crate::patch::{PatchEntry, PatchFile, TitlePrefix};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::trace;
use snafu::{ensure, ResultExt};
use std::io::{self, Read, SeekFrom};

pub const MAGIC: [u8; 3] = *b"RNP";
pub const EXTENSION: &str = "rnp";

const TITLE_RESERVED: usize = 11;
const PATCH_RESERVED: usize = 10;
const ENTRY_HEADER_LEN: u64 = 4;

/// How much of a patch file to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Title prefixes and every patch entry.
    Full,
    /// Title prefixes only. Entry payloads are skipped by seeking, but the
    /// entry headers are still walked so a truncated file is rejected.
    Index,
}

pub fn parse<R: Read + io::Seek>(reader: &mut R, mode: ParseMode) -> Result<PatchFile> {
    let title_ids = read_header(reader)?;
    let count = reader.read_u8().context(TruncatedRead { field: "patch count" })?;
    skip_reserved(reader, PATCH_RESERVED)?;

    let patches = match mode {
        ParseMode::Full => (0..count)
            .map(|_| read_entry(reader))
            .collect::<Result<Vec<_>>>()?,
        ParseMode::Index => {
            skip_entries(reader, count)?;
            Vec::new()
        }
    };
    trace!(
        "decoded {} titles, {} patches ({:?})",
        title_ids.len(),
        count,
        mode
    );
    Ok(PatchFile { title_ids, patches })
}

fn read_header<R: Read>(reader: &mut R) -> Result<Vec<TitlePrefix>> {
    let mut magic = [0u8; 3];
    reader
        .read_exact(&mut magic)
        .context(TruncatedRead { field: "magic" })?;
    ensure!(magic == MAGIC, MalformedHeader { found: magic });

    let count = reader.read_u8().context(TruncatedRead { field: "title count" })?;
    skip_reserved(reader, TITLE_RESERVED)?;

    (0..count)
        .map(|_| {
            reader
                .read_u24::<LittleEndian>()
                .map(TitlePrefix::new)
                .context(TruncatedRead { field: "title id" })
        })
        .collect()
}

fn skip_reserved<R: Read>(reader: &mut R, len: usize) -> Result<()> {
    let mut reserved = [0u8; TITLE_RESERVED];
    reader
        .read_exact(&mut reserved[..len])
        .context(TruncatedRead { field: "reserved" })
}

fn read_entry<R: Read>(reader: &mut R) -> Result<PatchEntry> {
    let pattern_len = reader.read_u8().context(TruncatedRead { field: "pattern length" })?;
    let patch_len = reader.read_u8().context(TruncatedRead { field: "patch length" })?;
    let repeat_count = reader.read_i8().context(TruncatedRead { field: "repeat count" })?;
    let byte_offset = reader.read_i8().context(TruncatedRead { field: "byte offset" })?;

    // Lengths are single bytes, so both buffers stay within the scratch capacity.
    let mut pattern = vec![0u8; pattern_len as usize];
    reader
        .read_exact(&mut pattern)
        .context(TruncatedRead { field: "pattern" })?;
    let mut replacement = vec![0u8; patch_len as usize];
    reader
        .read_exact(&mut replacement)
        .context(TruncatedRead { field: "replacement" })?;

    Ok(PatchEntry {
        repeat_count,
        byte_offset,
        pattern,
        replacement,
    })
}

fn skip_entries<R: Read + io::Seek>(reader: &mut R, count: u8) -> Result<()> {
    let mut pos = reader.seek(SeekFrom::Current(0)).context(Seek)?;
    let size = reader.seek(SeekFrom::End(0)).context(Seek)?;
    for _ in 0..count {
        ensure_within(pos + ENTRY_HEADER_LEN, size, "entry header")?;
        reader.seek(SeekFrom::Start(pos)).context(Seek)?;
        let pattern_len = reader.read_u8().context(TruncatedRead { field: "pattern length" })?;
        let patch_len = reader.read_u8().context(TruncatedRead { field: "patch length" })?;
        pos += ENTRY_HEADER_LEN + pattern_len as u64 + patch_len as u64;
        ensure_within(pos, size, "entry payload")?;
    }
    Ok(())
}

fn ensure_within(pos: u64, size: u64, field: &'static str) -> Result<()> {
    if pos > size {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof)).context(TruncatedRead { field });
    }
    Ok(())
}

impl PatchFile {
    /// Encodes the file in `.rnp` layout with zeroed reserved bytes.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let title_count = checked_u8("title count", self.title_ids.len())?;
        let patch_count = checked_u8("patch count", self.patches.len())?;

        writer.write_all(&MAGIC).context(Write)?;
        writer.write_u8(title_count).context(Write)?;
        writer.write_all(&[0; TITLE_RESERVED]).context(Write)?;
        for id in &self.title_ids {
            writer
                .write_u24::<LittleEndian>(id.value())
                .context(Write)?;
        }
        writer.write_u8(patch_count).context(Write)?;
        writer.write_all(&[0; PATCH_RESERVED]).context(Write)?;

        for entry in &self.patches {
            writer
                .write_u8(checked_u8("pattern length", entry.pattern.len())?)
                .context(Write)?;
            writer
                .write_u8(checked_u8("patch length", entry.replacement.len())?)
                .context(Write)?;
            writer.write_i8(entry.repeat_count).context(Write)?;
            writer.write_i8(entry.byte_offset).context(Write)?;
            writer.write_all(&entry.pattern).context(Write)?;
            writer.write_all(&entry.replacement).context(Write)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

fn checked_u8(field: &'static str, value: usize) -> Result<u8> {
    ensure!(
        value <= u8::MAX as usize,
        FieldOverflow {
            field,
            value,
            max: u8::MAX as usize,
        }
    );
    Ok(value as u8)
}
