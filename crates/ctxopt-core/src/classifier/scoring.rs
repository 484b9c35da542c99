//! Actionability, staleness and recommendation heuristics

use crate::analyzer::{ParsedSection, StaleDate};

use super::categories::{default_actionability, default_recommendation};
use super::{Actionability, Recommendation, SectionType};

/// Phrases that suggest a section describes superseded state
pub const STALE_PHRASES: &[&str] = &[
    "deprecated",
    "obsolete",
    "legacy",
    "no longer",
    "outdated",
    "superseded",
    "was replaced",
    "used to",
    "removed in",
    "previously",
];

/// Days of age at which the date component reaches its 0.5 cap
const DATE_SCALE_DAYS: f64 = 730.0;
const DATE_COMPONENT_CAP: f64 = 0.5;
const STALE_PHRASE_WEIGHT: f64 = 0.1;

const STALE_HITS_BEFORE_DOWNGRADE: usize = 3;
const HISTORICAL_LOW_LINES: usize = 100;
const SHORT_SECTION_LINES: usize = 20;

fn stale_dates_in<'a>(
    section: &'a ParsedSection,
    stale_dates: &'a [StaleDate],
) -> impl Iterator<Item = &'a StaleDate> + 'a {
    stale_dates
        .iter()
        .filter(move |d| section.contains_line(d.line_number))
}

/// Estimate how useful a section is to an active coding session
pub fn assess_actionability(
    section: &ParsedSection,
    section_type: SectionType,
    stale_dates: &[StaleDate],
) -> Actionability {
    let mut level = default_actionability(section_type);

    if stale_dates_in(section, stale_dates).count() > STALE_HITS_BEFORE_DOWNGRADE {
        level = level.downgrade();
    }

    if section.line_count > HISTORICAL_LOW_LINES && section_type.is_historical() {
        level = Actionability::Low;
    }

    if section.line_count < SHORT_SECTION_LINES && level == Actionability::Medium {
        level = Actionability::High;
    }

    level
}

/// Per-type staleness bias
fn type_bias(section_type: SectionType) -> f64 {
    match section_type {
        SectionType::CompletedWork | SectionType::WorkSessions => 0.4,
        SectionType::Notes => 0.2,
        SectionType::Testing => 0.1,
        _ => 0.0,
    }
}

/// Estimate how outdated a section is, in `[0, 1]`
pub fn assess_staleness(
    section: &ParsedSection,
    section_type: SectionType,
    stale_dates: &[StaleDate],
) -> f64 {
    let ages: Vec<i64> = stale_dates_in(section, stale_dates)
        .map(|d| d.days_old)
        .collect();
    let date_component = if ages.is_empty() {
        0.0
    } else {
        let avg = ages.iter().sum::<i64>() as f64 / ages.len() as f64;
        (avg / DATE_SCALE_DAYS).clamp(0.0, DATE_COMPONENT_CAP)
    };

    let text = format!("{}\n{}", section.name, section.content).to_lowercase();
    let phrase_hits = STALE_PHRASES
        .iter()
        .filter(|phrase| text.contains(*phrase))
        .count();

    let score = date_component + type_bias(section_type) + phrase_hits as f64 * STALE_PHRASE_WEIGHT;
    score.clamp(0.0, 1.0)
}

/// Pick the recommendation for a classified section
pub fn get_recommendation(
    section_type: SectionType,
    actionability: Actionability,
    staleness: f64,
    line_count: usize,
) -> Recommendation {
    let default = default_recommendation(section_type);

    if staleness > 0.7 && actionability == Actionability::Low {
        return Recommendation::Archive;
    }
    if line_count > 150 && actionability != Actionability::High {
        return Recommendation::Condense;
    }
    if staleness > 0.5 && default == Recommendation::Keep {
        return Recommendation::Review;
    }
    default
}
