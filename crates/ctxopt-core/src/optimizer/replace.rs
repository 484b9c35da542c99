//! Replacement blocks for each action type
//!
//! The planner and the applier both render through [`render_replacement`],
//! so a planned `lines_saved` is exactly the line delta the applier makes.

use crate::text::{code_blocks, code_line_mask};

use super::{ActionType, OptimizationAction};

pub const DEFAULT_REFERENCE: &str = "README.md";

/// Reference line left in place of an archived section
pub fn archive_reference_line(path: &str, lines: usize) -> String {
    format!(
        "> **Archived:** See `{}` for {} lines of historical content.",
        path, lines
    )
}

fn condense_note(lines: usize) -> String {
    format!("_Condensed from {} lines; full text in version control._", lines)
}

/// True for lines worth keeping in a condensed section
fn is_key_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with('#')
        || t.starts_with("- ")
        || t.starts_with("* ")
        || t.starts_with("+ ")
        || t.starts_with('|')
        || t.split_once(". ")
            .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        || t.contains(':')
}

/// Indices of at most `keep` prose lines, key lines first
fn select_prose(body: &[&str], keep: usize) -> Vec<usize> {
    let in_code = code_line_mask(body);
    let candidates: Vec<(usize, &str)> = body
        .iter()
        .enumerate()
        .filter(|(idx, line)| !in_code[*idx] && !line.trim().is_empty())
        .map(|(idx, line)| (idx, *line))
        .collect();

    let mut chosen: Vec<usize> = candidates
        .iter()
        .filter(|(_, line)| is_key_line(line))
        .map(|(idx, _)| *idx)
        .take(keep)
        .collect();
    if chosen.len() < keep {
        let room = keep - chosen.len();
        chosen.extend(
            candidates
                .iter()
                .filter(|(_, line)| !is_key_line(line))
                .map(|(idx, _)| *idx)
                .take(room),
        );
    }
    chosen
}

/// Pick at most `keep` body lines, key lines first, in document order
///
/// Fenced code and blank lines are never kept.
pub fn condense_lines(body: &[&str], keep: usize) -> Vec<String> {
    condense_with_examples(body, keep, 0)
}

/// [`condense_lines`] plus the first `examples` fenced blocks, fences included
///
/// Kept examples do not count against `keep`.
pub fn condense_with_examples(body: &[&str], keep: usize, examples: usize) -> Vec<String> {
    let mut chosen = select_prose(body, keep);
    for block in code_blocks(&body.join("\n")).into_iter().take(examples) {
        chosen.extend(block.open..=block.close);
    }
    chosen.sort_unstable();
    chosen.dedup();

    chosen
        .into_iter()
        .map(|idx| body[idx].trim_end().to_string())
        .collect()
}

/// Lines that replace `section_lines` (header first) for `action`
///
/// Errors name why the action cannot be applied automatically.
pub fn render_replacement(
    action: &OptimizationAction,
    section_lines: &[&str],
) -> Result<Vec<String>, String> {
    let Some(header) = section_lines.first() else {
        return Err("empty line range".to_string());
    };
    let header = header.to_string();
    let total = section_lines.len();

    match action.action_type {
        ActionType::Archive => {
            let path = action
                .archive_path
                .as_deref()
                .ok_or_else(|| "archive action has no archive path".to_string())?;
            Ok(vec![header, String::new(), archive_reference_line(path, total)])
        }
        ActionType::Condense => {
            let keep = action
                .keep_lines
                .ok_or_else(|| "condense action has no line budget".to_string())?;
            let mut out = vec![header];
            out.extend(condense_with_examples(
                &section_lines[1..],
                keep,
                action.keep_examples.unwrap_or(0),
            ));
            out.push(String::new());
            out.push(condense_note(total));
            Ok(out)
        }
        ActionType::Dedupe => {
            let reference = action.reference.as_deref().unwrap_or(DEFAULT_REFERENCE);
            Ok(vec![
                header,
                String::new(),
                format!("See `{}` for details.", reference),
            ])
        }
        ActionType::Remove => Ok(Vec::new()),
        ActionType::Move => Err("move actions require manual intervention".to_string()),
    }
}
