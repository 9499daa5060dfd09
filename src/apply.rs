//! Iterative find-and-replace over a code image.

use crate::error::{OutOfBounds, Result};
use crate::matcher::{self, Matcher};
use crate::patch::PatchEntry;
use log::{trace, warn};
use snafu::ensure;

/// Replaces up to `max_count` occurrences of `pattern`, leftmost first.
///
/// Each replacement is written at `match_start + offset`. The search resumes
/// right after the matched bytes, so a region that was just matched is never
/// matched again. Returns the number of replacements made.
///
/// Every write is bounds-checked before it happens. When a write would leave
/// `code` the call stops with [`OutOfBounds`](crate::Error::OutOfBounds);
/// replacements made by earlier iterations stay in place.
pub fn apply(
    code: &mut [u8],
    pattern: &[u8],
    offset: isize,
    replacement: &[u8],
    max_count: usize,
) -> Result<usize> {
    let matcher = Matcher::new(pattern)?;
    matcher::check_len(replacement.len())?;

    let mut cursor = 0;
    let mut applied = 0;
    while applied < max_count && cursor < code.len() {
        let found = match matcher.find(&code[cursor..]) {
            Some(at) => cursor + at,
            None => break,
        };

        let start = found as i64 + offset as i64;
        let end = start + replacement.len() as i64;
        ensure!(
            start >= 0 && end <= code.len() as i64,
            OutOfBounds {
                start,
                len: replacement.len(),
                size: code.len(),
            }
        );
        let start = start as usize;
        code[start..start + replacement.len()].copy_from_slice(replacement);
        trace!("replaced {} bytes at {:#x} (match at {:#x})", replacement.len(), start, found);

        applied += 1;
        cursor = found + pattern.len();
    }
    Ok(applied)
}

/// Applies one decoded patch entry. A repeat count of zero or below
/// disables the entry.
pub fn apply_entry(code: &mut [u8], entry: &PatchEntry) -> Result<usize> {
    if entry.repeat_count <= 0 {
        warn!("repeat count {} disables entry", entry.repeat_count);
        return Ok(0);
    }
    apply(
        code,
        &entry.pattern,
        entry.byte_offset as isize,
        &entry.replacement,
        entry.repeat_count as usize,
    )
}
