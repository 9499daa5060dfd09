//! Exact byte-sequence search.
//!
//! Boyer-Moore with a bad-character table and a good-suffix table. The
//! tables are built once per pattern so a [`Matcher`] can be reused over
//! successive windows of the same code image.

use crate::error::{InvalidPattern, Result};
use crate::patch::SCRATCH_CAPACITY;
use snafu::ensure;
use std::cmp::max;

const ALPHABET_LEN: usize = 256;

#[derive(Debug, Clone)]
pub struct Matcher<'p> {
    pattern: &'p [u8],
    bad_char: [usize; ALPHABET_LEN],
    good_suffix: Vec<usize>,
}

impl<'p> Matcher<'p> {
    pub fn new(pattern: &'p [u8]) -> Result<Self> {
        check_len(pattern.len())?;
        Ok(Matcher {
            pattern,
            bad_char: bad_char_table(pattern),
            good_suffix: good_suffix_table(pattern),
        })
    }

    pub fn pattern(&self) -> &'p [u8] {
        self.pattern
    }

    /// Offset of the leftmost occurrence of the pattern in `haystack`.
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        let pat = self.pattern;
        let last = pat.len() - 1;
        // Index into haystack, aligned with `pat[j]` while comparing.
        let mut i = last;
        while i < haystack.len() {
            let mut j = last;
            loop {
                if haystack[i] != pat[j] {
                    break;
                }
                if j == 0 {
                    return Some(i);
                }
                i -= 1;
                j -= 1;
            }
            i += max(self.bad_char[haystack[i] as usize], self.good_suffix[j]);
        }
        None
    }
}

/// Leftmost offset of `pattern` inside `haystack`.
pub fn search(haystack: &[u8], pattern: &[u8]) -> Result<Option<usize>> {
    Ok(Matcher::new(pattern)?.find(haystack))
}

pub(crate) fn check_len(len: usize) -> Result<()> {
    ensure!(len > 0, InvalidPattern { len, reason: "empty" });
    ensure!(
        len <= SCRATCH_CAPACITY,
        InvalidPattern {
            len,
            reason: "longer than the scratch capacity"
        }
    );
    Ok(())
}

// Distance from the last byte of `pat` to the rightmost earlier occurrence
// of each byte value; `pat.len()` when absent.
fn bad_char_table(pat: &[u8]) -> [usize; ALPHABET_LEN] {
    let len = pat.len();
    let mut table = [len; ALPHABET_LEN];
    for (i, &b) in pat[..len - 1].iter().enumerate() {
        table[b as usize] = len - 1 - i;
    }
    table
}

// Whether the suffix `word[pos..]` is also a prefix of `word`.
fn is_prefix(word: &[u8], pos: usize) -> bool {
    word[pos..] == word[..word.len() - pos]
}

// Length of the longest suffix of `word` that ends at `word[pos]`.
fn suffix_length(word: &[u8], pos: usize) -> usize {
    let last = word.len() - 1;
    let mut i = 0;
    while i < pos && word[pos - i] == word[last - i] {
        i += 1;
    }
    i
}

fn good_suffix_table(pat: &[u8]) -> Vec<usize> {
    let len = pat.len();
    let last = len - 1;
    let mut table = vec![0; len];

    // Matched suffix does not recur: realign on the longest prefix that is
    // also a suffix of what has been matched.
    let mut last_prefix = len;
    for p in (0..len).rev() {
        if is_prefix(pat, p + 1) {
            last_prefix = p + 1;
        }
        table[p] = last_prefix + (last - p);
    }

    // Matched suffix recurs earlier in the pattern: take the closest recurrence.
    for p in 0..last {
        let slen = suffix_length(pat, p);
        if pat[p - slen] != pat[last - slen] {
            table[last - slen] = last - p + slen;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn finds_leftmost() {
        let hay = b"xxabcabcab";
        assert_eq!(search(hay, b"abc").unwrap(), Some(2));
        assert_eq!(search(hay, b"cab").unwrap(), Some(4));
        assert_eq!(search(hay, b"abcd").unwrap(), None);
    }

    #[test]
    fn match_at_both_ends() {
        assert_eq!(search(b"abxyz", b"ab").unwrap(), Some(0));
        assert_eq!(search(b"xyzab", b"ab").unwrap(), Some(3));
        assert_eq!(search(b"ab", b"ab").unwrap(), Some(0));
    }

    #[test]
    fn single_byte_pattern() {
        assert_eq!(search(&[1, 2, 3, 2], &[2]).unwrap(), Some(1));
        assert_eq!(search(&[], &[2]).unwrap(), None);
    }

    #[test]
    fn pattern_longer_than_haystack() {
        assert_eq!(search(b"abc", b"abcd").unwrap(), None);
    }

    #[test]
    fn periodic_pattern() {
        // Exercises the good-suffix table where every suffix is a prefix.
        assert_eq!(search(b"aaabaaaab", b"aaaab").unwrap(), Some(4));
        assert_eq!(search(b"ABYXCDEYXABYXCDEYX", b"ABYXCDEYX").unwrap(), Some(0));
        assert_eq!(search(b"..ABYXCDEYX", b"ABYXCDEYX").unwrap(), Some(2));
    }

    #[test]
    fn tables_for_known_word() {
        let m = Matcher::new(b"ANPANMAN").unwrap();
        assert_eq!(m.bad_char[b'A' as usize], 1);
        assert_eq!(m.bad_char[b'M' as usize], 2);
        assert_eq!(m.bad_char[b'Z' as usize], 8);
        assert_eq!(m.good_suffix[7], 1);
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(matches!(
            search(b"abc", b""),
            Err(Error::InvalidPattern { len: 0, .. })
        ));
        let big = vec![0u8; SCRATCH_CAPACITY + 1];
        assert!(matches!(
            search(&big, &big),
            Err(Error::InvalidPattern { len: 257, .. })
        ));
        let max = vec![7u8; SCRATCH_CAPACITY];
        assert_eq!(search(&max, &max).unwrap(), Some(0));
    }
}
