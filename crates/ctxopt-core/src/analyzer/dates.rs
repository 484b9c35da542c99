//! Stale date detection
//!
//! Recognized shapes: `January 5, 2024` (full or three-letter month, optional
//! ordinal), `January 2024`, `2024-01-05`, `01/05/2024`, and bare recent
//! years. A bare year is dated to December 31 of that year.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::OnceLock;

use crate::text::{static_regex, truncate_chars};

static MONTH_DAY_YEAR_RE: OnceLock<Option<Regex>> = OnceLock::new();
static MONTH_YEAR_RE: OnceLock<Option<Regex>> = OnceLock::new();
static ISO_RE: OnceLock<Option<Regex>> = OnceLock::new();
static US_RE: OnceLock<Option<Regex>> = OnceLock::new();
static YEAR_RE: OnceLock<Option<Regex>> = OnceLock::new();

const MONTH_DAY_YEAR: &str = r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b";
const MONTH_YEAR: &str = r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b";
const ISO: &str = r"\b(\d{4})-(\d{2})-(\d{2})\b";
const US: &str = r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b";
const YEAR: &str = r"\b(20\d{2})\b";

const CONTEXT_CHARS: usize = 100;

/// A date reference older than the staleness threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleDate {
    pub date_string: String,
    /// 1-indexed line the date appears on
    pub line_number: usize,
    pub context: String,
    pub days_old: i64,
}

/// Scan every line for stale dates relative to `today`
///
/// A date is stale when it is more than `stale_after_days` days old. Results
/// are deduplicated by `(line_number, date_string)`.
pub fn detect_stale_dates(content: &str, today: NaiveDate, stale_after_days: i64) -> Vec<StaleDate> {
    let mut found = Vec::new();
    let mut seen: HashSet<(usize, String)> = HashSet::new();

    for (idx, line) in content.split('\n').enumerate() {
        for (date_string, date) in dates_in_line(line, Some(today.year())) {
            let days_old = (today - date).num_days();
            if days_old <= stale_after_days {
                continue;
            }
            if !seen.insert((idx + 1, date_string.clone())) {
                continue;
            }
            found.push(StaleDate {
                date_string,
                line_number: idx + 1,
                context: truncate_chars(line.trim(), CONTEXT_CHARS),
                days_old,
            });
        }
    }

    found
}

/// Every recognizable date on a line, in discovery order
///
/// Bare years are only reported when `current_year` is given.
pub(crate) fn dates_in_line(line: &str, current_year: Option<i32>) -> Vec<(String, NaiveDate)> {
    let mut dates = Vec::new();
    let mut spans: Vec<Range<usize>> = Vec::new();

    if let Some(re) = static_regex(&MONTH_DAY_YEAR_RE, MONTH_DAY_YEAR) {
        for caps in re.captures_iter(line) {
            let date = month_number(&caps[1]).and_then(|month| {
                NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?)
            });
            push_match(&mut dates, &mut spans, caps.get(0), date);
        }
    }

    if let Some(re) = static_regex(&MONTH_YEAR_RE, MONTH_YEAR) {
        for caps in re.captures_iter(line) {
            let date = month_number(&caps[1])
                .and_then(|month| last_day_of_month(caps[2].parse().ok()?, month));
            push_match(&mut dates, &mut spans, caps.get(0), date);
        }
    }

    if let Some(re) = static_regex(&ISO_RE, ISO) {
        for caps in re.captures_iter(line) {
            let date = ymd(&caps[1], &caps[2], &caps[3]);
            push_match(&mut dates, &mut spans, caps.get(0), date);
        }
    }

    if let Some(re) = static_regex(&US_RE, US) {
        for caps in re.captures_iter(line) {
            let date = ymd(&caps[3], &caps[1], &caps[2]);
            push_match(&mut dates, &mut spans, caps.get(0), date);
        }
    }

    let Some(current_year) = current_year else {
        return dates;
    };

    if let Some(re) = static_regex(&YEAR_RE, YEAR) {
        for m in re.find_iter(line) {
            let Ok(year) = m.as_str().parse::<i32>() else {
                continue;
            };
            if year < current_year - 4 || year > current_year - 1 {
                continue;
            }
            if spans.iter().any(|s| s.start < m.end() && m.start() < s.end) {
                continue;
            }
            if is_version_like(line, m.start(), m.end()) {
                continue;
            }
            if let Some(date) = NaiveDate::from_ymd_opt(year, 12, 31) {
                dates.push((m.as_str().to_string(), date));
            }
        }
    }

    dates
}

fn push_match(
    dates: &mut Vec<(String, NaiveDate)>,
    spans: &mut Vec<Range<usize>>,
    m: Option<regex::Match<'_>>,
    date: Option<NaiveDate>,
) {
    let Some(m) = m else {
        return;
    };
    // Invalid calendar dates still claim their span so the bare-year pass
    // does not re-report their year.
    spans.push(m.range());
    if let Some(date) = date {
        dates.push((m.as_str().to_string(), date));
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// A bare year next to `v`, `.`, or the word `version` is a version string
fn is_version_like(line: &str, start: usize, end: usize) -> bool {
    let before = &line[..start];
    let after = &line[end..];

    if let Some(prev) = before.chars().next_back() {
        if prev == 'v' || prev == 'V' || prev == '.' {
            return true;
        }
    }

    let mut after_chars = after.chars();
    if after_chars.next() == Some('.') && after_chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }

    let window: String = before
        .chars()
        .rev()
        .take(10)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    window.to_lowercase().contains("version")
}
