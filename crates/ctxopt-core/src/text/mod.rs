//! Text utilities shared by the pipeline stages

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

/// Compile a fixed pattern once and cache it in `cell`.
///
/// Returns `None` (and logs) if the pattern fails to compile, so callers
/// treat the pattern as never matching.
pub(crate) fn static_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, pattern, "Failed to compile built-in regex");
            None
        }
    })
    .as_ref()
}

/// Truncate to at most `max_chars` characters, appending `...` when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

/// Lowercase slug of a section name, capped at `max_len` characters
///
/// Non-alphanumeric runs collapse to a single `-`; leading and trailing
/// dashes are trimmed. An empty result becomes `section`.
pub fn slugify_capped(name: &str, max_len: usize) -> String {
    let slug = slug::slugify(name);
    let capped: String = slug.chars().take(max_len).collect();
    let trimmed = capped.trim_matches('-');
    if trimmed.is_empty() {
        "section".to_string()
    } else {
        trimmed.to_string()
    }
}

/// True if the line opens or closes a fenced code block
pub fn is_code_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// A fenced code block inside a body, by 0-indexed line offsets (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlock {
    pub open: usize,
    pub close: usize,
}

impl CodeBlock {
    /// Number of lines between the fences
    pub fn inner_len(&self) -> usize {
        self.close.saturating_sub(self.open + 1)
    }
}

/// Find closed fenced code blocks. An unterminated trailing fence is ignored.
pub fn code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;
    for (idx, line) in content.lines().enumerate() {
        if !is_code_fence(line) {
            continue;
        }
        match open.take() {
            Some(start) => blocks.push(CodeBlock {
                open: start,
                close: idx,
            }),
            None => open = Some(idx),
        }
    }
    blocks
}

/// Mark which lines sit inside (or on the fence of) a code block
pub fn code_line_mask(lines: &[&str]) -> Vec<bool> {
    let mut mask = Vec::with_capacity(lines.len());
    let mut in_block = false;
    for line in lines {
        if is_code_fence(line) {
            mask.push(true);
            in_block = !in_block;
        } else {
            mask.push(in_block);
        }
    }
    mask
}
