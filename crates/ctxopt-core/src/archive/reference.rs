//! In-document pointers to archive files

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyzer::{parse_header, split_lines};
use crate::text::static_regex;

use super::ArchiveContent;

static PLAN_REFERENCE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static ARCHIVE_REFERENCE_RE: OnceLock<Option<Regex>> = OnceLock::new();

const PLAN_REFERENCE: &str = r"^>\s*\*\*Archived:\*\*\s+See\s+`([^`]+)`(?:\s+for\s+(\d+)\s+lines?)?";
const ARCHIVE_REFERENCE: &str =
    r"^>\s*\*\*Archived Content\*\*:?\s*(?:(\d+)\s+lines?)?[^\[]*\[((?:\\.|[^\]\\])*)\]\(([^)\s]+)\)";

/// An archive pointer found in a live document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReference {
    /// 1-indexed line of the pointer
    pub line_number: usize,
    /// Linked section name, or the nearest header above the pointer
    pub section_name: Option<String>,
    pub path: String,
    pub line_count: Option<usize>,
}

/// Backslash-escape `\`, `[` and `]` so a section name survives as link text
fn escape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn unescape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Blockquote pointing at `archive`, for pasting into the live document
pub fn format_archive_reference(archive: &ArchiveContent) -> String {
    let m = &archive.metadata;
    format!(
        "> **Archived Content**: {} lines moved to [{}]({}) on {}.\n> Reason: {}",
        m.original_lines,
        escape_link_text(&m.section_name),
        archive.relative_path,
        m.archived_at.format("%Y-%m-%d"),
        m.reason
    )
}

/// Every archive pointer in `content`, in document order
///
/// Recognizes both the planner's `> **Archived:** See `path`` line and the
/// `> **Archived Content**` blockquote.
pub fn find_archive_references(content: &str) -> Vec<ArchiveReference> {
    let plan_re = static_regex(&PLAN_REFERENCE_RE, PLAN_REFERENCE);
    let archive_re = static_regex(&ARCHIVE_REFERENCE_RE, ARCHIVE_REFERENCE);

    let mut refs = Vec::new();
    let mut header: Option<String> = None;

    for (idx, line) in split_lines(content).into_iter().enumerate() {
        let line = line.trim_end_matches('\r');
        if let Some((_, name)) = parse_header(line) {
            header = Some(name);
            continue;
        }

        if let Some(caps) = plan_re.and_then(|re| re.captures(line)) {
            refs.push(ArchiveReference {
                line_number: idx + 1,
                section_name: header.clone(),
                path: caps[1].to_string(),
                line_count: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            });
            continue;
        }

        if let Some(caps) = archive_re.and_then(|re| re.captures(line)) {
            let linked = unescape_link_text(caps[2].trim());
            refs.push(ArchiveReference {
                line_number: idx + 1,
                section_name: if linked.is_empty() {
                    header.clone()
                } else {
                    Some(linked)
                },
                path: caps[3].to_string(),
                line_count: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            });
        }
    }

    refs
}
