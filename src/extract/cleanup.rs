use once_cell::sync::Lazy;
use regex::Regex;

use super::classifier::ClassificationState;
use super::status::SeatsStatus;
use crate::config::ExtractionConfig;
use crate::constants::SENTINEL;
use crate::types::{EventRecord, Field, ImageSource};

static AGE_LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+\s*yrs\s*\+?)").expect("age limit pattern compiles"));

/// `"Age Limit - 18 yrs +"` becomes `"18yrs+"`; anything without the strict shape is dropped.
pub fn clean_age_limit(raw: &str) -> Option<String> {
    let m = AGE_LIMIT_RE.find(raw)?;
    Some(m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
}

pub fn clean_duration(raw: &str) -> String {
    raw.trim_start_matches(|c: char| !c.is_ascii_digit()).to_string()
}

pub fn clean_language(raw: &str) -> String {
    raw.replace("By", "").trim().to_string()
}

pub fn clean_price(raw: &str, config: &ExtractionConfig) -> String {
    let marked = config
        .currency_markers
        .iter()
        .chain(std::iter::once(&config.currency_symbol))
        .any(|marker| raw.starts_with(marker.as_str()));
    if marked {
        raw.to_string()
    } else {
        format!("{}{}", config.currency_symbol, raw)
    }
}

fn or_sentinel(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| SENTINEL.to_string())
}

/// Applies the post-pass corrections and fills every unresolved field with `"-"`.
pub fn finalize(
    mut state: ClassificationState,
    status: Option<SeatsStatus>,
    source: &ImageSource,
    config: &ExtractionConfig,
) -> EventRecord {
    let age_limit = state.take(Field::AgeLimit).and_then(|v| clean_age_limit(&v));
    let duration = state.take(Field::Duration).map(|v| clean_duration(&v));
    let language = state.take(Field::Language).map(|v| clean_language(&v));
    let price = state.take(Field::Price).map(|v| clean_price(&v, config));

    EventRecord {
        event_name: source.event_name.clone(),
        date_range: or_sentinel(state.take(Field::DateRange)),
        event_end_date: or_sentinel(state.take(Field::EventEndDate)),
        event_time: or_sentinel(state.take(Field::EventTime)),
        duration: or_sentinel(duration),
        age_limit: or_sentinel(age_limit),
        language: or_sentinel(language),
        venue: or_sentinel(state.take(Field::Venue)),
        price: or_sentinel(price),
        seats_status: or_sentinel(status.map(|s| s.as_str().to_string())),
        source_image: source.source_image.clone(),
    }
}
