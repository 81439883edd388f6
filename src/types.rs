use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::SENTINEL;

pub const FIELD_COUNT: usize = 9;

/// Text-derived fields of an [`EventRecord`], in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DateRange,
    EventEndDate,
    EventTime,
    Duration,
    AgeLimit,
    Language,
    Venue,
    Price,
    SeatsStatus,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::DateRange,
        Field::EventEndDate,
        Field::EventTime,
        Field::Duration,
        Field::AgeLimit,
        Field::Language,
        Field::Venue,
        Field::Price,
        Field::SeatsStatus,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::DateRange => "date_range",
            Field::EventEndDate => "event_end_date",
            Field::EventTime => "event_time",
            Field::Duration => "duration",
            Field::AgeLimit => "age_limit",
            Field::Language => "language",
            Field::Venue => "venue",
            Field::Price => "price",
            Field::SeatsStatus => "seats_status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved extraction for one image. Every field is a value or `"-"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_name: String,
    pub date_range: String,
    pub event_end_date: String,
    pub event_time: String,
    pub duration: String,
    pub age_limit: String,
    pub language: String,
    pub venue: String,
    pub price: String,
    pub seats_status: String,
    pub source_image: String,
}

impl EventRecord {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::DateRange => &self.date_range,
            Field::EventEndDate => &self.event_end_date,
            Field::EventTime => &self.event_time,
            Field::Duration => &self.duration,
            Field::AgeLimit => &self.age_limit,
            Field::Language => &self.language,
            Field::Venue => &self.venue,
            Field::Price => &self.price,
            Field::SeatsStatus => &self.seats_status,
        }
    }

    pub fn is_resolved(&self, field: Field) -> bool {
        self.field(field) != SENTINEL
    }
}

/// Substitute for an [`EventRecord`] when an image could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedRecord {
    pub event_name: String,
    pub error: String,
    pub source_image: String,
}

/// One entry of a batch; serialized without a tag so the JSON carries either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    Event(EventRecord),
    Degraded(DegradedRecord),
}

impl ExtractionOutcome {
    pub fn event_name(&self) -> &str {
        match self {
            ExtractionOutcome::Event(r) => &r.event_name,
            ExtractionOutcome::Degraded(r) => &r.event_name,
        }
    }

    pub fn source_image(&self) -> &str {
        match self {
            ExtractionOutcome::Event(r) => &r.source_image,
            ExtractionOutcome::Degraded(r) => &r.source_image,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionOutcome::Degraded(_))
    }
}

/// Identity of one per-image input, derived from its file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// Numeric display-order prefix; 0 when the name has none
    pub index: u32,
    /// File stem with underscores rendered as spaces
    pub event_name: String,
    pub source_image: String,
}
