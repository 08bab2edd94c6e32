//! Sliding-window chunking over normalised text.
//!
//! Lengths are counted in `char`s so multi-byte text never splits inside a
//! code point. The window prefers to end on whitespace found in its last 40%,
//! and the next window starts `overlap` chars before the previous cut (but
//! always at least one char after the previous start).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_len: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_len: 900, overlap: 150 }
    }
}

impl ChunkingConfig {
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.max_len, self.overlap)
    }
}

/// Collapse runs of spaces/tabs, trim every line, squeeze 3+ newlines into a
/// single blank line and trim the whole text.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;
    for line in text.split('\n') {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            pending_blank = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(&line);
        pending_blank = false;
    }
    out
}

/// Split `text` into overlapping spans of at most `max_len` chars.
///
/// Never yields an empty string and always terminates: the window start moves
/// forward by at least one char per step even when `overlap >= max_len`. The
/// next window starts `overlap` chars before the previous window's end, so
/// consecutive chunks share text and nothing falls between them.
///
/// Without whitespace cuts every step advances `max_len - overlap`; a cut can
/// end a window as early as `min_cut_offset(max_len)`, so in general a step
/// advances at least `min_cut_offset(max_len) - overlap` (never below one).
pub fn chunk_text(text: &str, max_len: usize, overlap: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    let chars: Vec<char> = normalized.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let max_len = max_len.max(1);
    let min_cut = min_cut_offset(max_len);
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < total {
        let mut end = start.saturating_add(max_len).min(total);
        if end < total {
            if let Some(cut) = (start.saturating_add(min_cut)..end).rev().find(|&i| chars[i].is_whitespace()) {
                end = cut;
            }
        }
        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        if end == total {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }
    chunks
}

/// Earliest offset inside a window where a whitespace cut is accepted: the
/// start of the window's last 40%.
pub fn min_cut_offset(max_len: usize) -> usize {
    let offset = (max_len as u128 * 3 / 5) as usize;
    offset.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_spaces_and_blank_runs() {
        let raw = "  Hello \t  world \r\n\r\n\r\n\n  second\tline  \nthird ";
        assert_eq!(normalize_whitespace(raw), "Hello world\n\nsecond line\nthird");
    }

    #[test]
    fn normalize_whitespace_only_is_empty() {
        assert_eq!(normalize_whitespace(" \t\n\n \r\n"), "");
    }

    #[test]
    fn cut_prefers_whitespace_in_tail_of_window() {
        // window of 10 over "aaaaaaa bbbbbbbbb": whitespace at index 7 is in the last 40%
        let chunks = chunk_text("aaaaaaa bbbbbbbbb", 10, 0);
        assert_eq!(chunks[0], "aaaaaaa");
        assert_eq!(chunks.concat().replace(' ', ""), "aaaaaaabbbbbbbbb");
    }

    #[test]
    fn cut_offset_does_not_overflow() {
        assert_eq!(min_cut_offset(10), 6);
        assert_eq!(min_cut_offset(1), 1);
        assert!(min_cut_offset(usize::MAX) < usize::MAX);
    }

    #[test]
    fn whitespace_too_early_is_ignored() {
        // whitespace at index 2 lies outside the last 40% of a 10-char window
        let chunks = chunk_text("ab cdefghijklmnop", 10, 0);
        assert_eq!(chunks[0], "ab cdefghi");
    }
}
