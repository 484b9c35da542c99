//! Header-delimited section parsing and token estimation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::text::static_regex;

static HEADER_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// A header-delimited block of the document
///
/// Line numbers are 1-indexed and inclusive. `start_line` is the header line;
/// `content` is the body without the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSection {
    pub name: String,
    pub level: u8,
    pub start_line: usize,
    pub end_line: usize,
    pub line_count: usize,
    pub content: String,
    pub estimated_tokens: usize,
}

impl ParsedSection {
    /// True if the 1-indexed `line` falls within this section
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Body lines, excluding the header
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }
}

/// Estimate the token count of `text` as one token per four characters
pub fn count_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Split a document into lines the way every stage counts them
///
/// A trailing newline yields a final empty line.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Match a markdown ATX header, returning `(level, name)`
pub fn parse_header(line: &str) -> Option<(u8, String)> {
    let re = static_regex(&HEADER_RE, r"^(#{1,6})\s+(.+)$")?;
    let line = line.strip_suffix('\r').unwrap_or(line);
    let caps = re.captures(line)?;
    let level = caps.get(1)?.as_str().len() as u8;
    let name = caps.get(2)?.as_str().trim().to_string();
    Some((level, name))
}

/// Parse `content` into sections in a single scan
///
/// Text before the first header is not part of any section. The last
/// section runs to the end of the input.
pub fn parse_sections(content: &str) -> Vec<ParsedSection> {
    let lines = split_lines(content);
    let mut sections = Vec::new();
    let mut open: Option<(u8, String, usize)> = None;

    for (idx, line) in lines.iter().enumerate() {
        let Some((level, name)) = parse_header(line) else {
            continue;
        };
        if let Some((prev_level, prev_name, start)) = open.take() {
            sections.push(build_section(&lines, prev_level, prev_name, start, idx));
        }
        open = Some((level, name, idx));
    }

    if let Some((level, name, start)) = open {
        sections.push(build_section(&lines, level, name, start, lines.len()));
    }

    sections
}

/// Build a section from 0-indexed `[start, end)` line bounds
fn build_section(
    lines: &[&str],
    level: u8,
    name: String,
    start: usize,
    end: usize,
) -> ParsedSection {
    let content = lines[start + 1..end].join("\n");
    let estimated_tokens = count_tokens(content.trim());
    ParsedSection {
        name,
        level,
        start_line: start + 1,
        end_line: end,
        line_count: end - start,
        content,
        estimated_tokens,
    }
}
