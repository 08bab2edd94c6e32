//! Bounded context block handed to the generator.

use ragdesk_core::types::Hit;

pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";
pub const DEFAULT_MAX_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy)]
pub struct ContextComposer {
    max_chars: usize,
}

impl Default for ContextComposer {
    fn default() -> Self { Self { max_chars: DEFAULT_MAX_CHARS } }
}

impl ContextComposer {
    pub fn new(max_chars: usize) -> Self { Self { max_chars } }

    pub fn max_chars(&self) -> usize { self.max_chars }

    pub fn compose(&self, hits: &[Hit]) -> String { compose(hits, self.max_chars) }
}

/// Join hits as `[label] text` blocks, in order, until the next block would
/// push the total past `max_chars` (counted in chars, separators included).
/// Blocks are never cut; the first one that does not fit ends the context.
pub fn compose(hits: &[Hit], max_chars: usize) -> String {
    let sep_len = BLOCK_SEPARATOR.chars().count();
    let mut out = String::new();
    let mut used = 0usize;
    for hit in hits {
        let block = format!("[{}] {}", hit.label(), hit.text);
        let extra = block.chars().count() + if out.is_empty() { 0 } else { sep_len };
        if used + extra > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push_str(BLOCK_SEPARATOR);
        }
        out.push_str(&block);
        used += extra;
    }
    out
}
