use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::lines::Line;
use super::price::{normalize_price, PricePattern};
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::types::{Field, FIELD_COUNT};

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)\s*)?(\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{4})",
    )
    .expect("date pattern compiles")
});

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d{1,2}:\d{2}(?:\s*[AP]M)?\b").expect("time pattern compiles"));

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}:\d{2}\b").expect("clock pattern compiles"));

static VENUE_ARTIFACT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\d+").expect("venue artifact pattern compiles"));

/// Per-image classification state: tentative values plus the set of claimed fields.
///
/// A claimed field is never re-assigned during the same pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationState {
    values: [Option<String>; FIELD_COUNT],
    claimed: [bool; FIELD_COUNT],
}

impl ClassificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self, field: Field) -> bool {
        self.claimed[field.index()]
    }

    /// Claims `field` with `value`. Returns false, leaving the state untouched, when the
    /// field was already claimed.
    pub fn claim(&mut self, field: Field, value: String) -> bool {
        if self.is_claimed(field) {
            return false;
        }
        self.claimed[field.index()] = true;
        self.values[field.index()] = Some(value);
        true
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// Rewrites the value of an already claimed field in place.
    pub fn normalize_claimed(&mut self, field: Field, normalize: impl Fn(&str) -> String) {
        if let Some(value) = self.values[field.index()].as_mut() {
            *value = normalize(value);
        }
    }

    pub fn take(&mut self, field: Field) -> Option<String> {
        self.values[field.index()].take()
    }
}

/// What a predicate decided about one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Claim the predicate's target (first entry) and any companion fields
    Claim(Vec<(Field, String)>),
    /// Stop evaluating this line without claiming anything
    Consume,
    Pass,
}

/// Everything a predicate may look at while judging one line
pub struct LineContext<'a> {
    pub line: &'a Line,
    pub next: Option<&'a Line>,
    pub lower: String,
    pub config: &'a ExtractionConfig,
    pub price: &'a PricePattern,
}

pub struct Predicate {
    pub name: &'static str,
    /// Field this predicate claims; skipped once that field is claimed
    pub target: Option<Field>,
    /// Extra precondition on the state accumulated so far
    pub applies: fn(&ClassificationState) -> bool,
    pub eval: fn(&LineContext<'_>) -> Verdict,
}

/// Precedence table: the first applicable predicate that does not pass decides the line.
pub static PREDICATES: &[Predicate] = &[
    Predicate {
        name: "date_range",
        target: Some(Field::DateRange),
        applies: always,
        eval: match_date,
    },
    Predicate {
        name: "event_time",
        target: Some(Field::EventTime),
        applies: always,
        eval: match_time,
    },
    Predicate {
        name: "duration",
        target: Some(Field::Duration),
        applies: always,
        eval: match_duration,
    },
    Predicate {
        name: "age_limit",
        target: Some(Field::AgeLimit),
        applies: always,
        eval: match_age_limit,
    },
    Predicate {
        name: "language",
        target: Some(Field::Language),
        applies: always,
        eval: match_language,
    },
    Predicate {
        name: "venue",
        target: Some(Field::Venue),
        applies: language_resolved,
        eval: match_venue,
    },
    Predicate {
        name: "time_guard",
        target: None,
        applies: time_unresolved,
        eval: guard_clock_fragment,
    },
    Predicate {
        name: "price",
        target: Some(Field::Price),
        applies: always,
        eval: match_price,
    },
];

fn always(_: &ClassificationState) -> bool {
    true
}

fn language_resolved(state: &ClassificationState) -> bool {
    state.is_claimed(Field::Language)
}

fn time_unresolved(state: &ClassificationState) -> bool {
    !state.is_claimed(Field::EventTime)
}

fn match_date(ctx: &LineContext<'_>) -> Verdict {
    let mut dates = DATE_RE
        .captures_iter(&ctx.line.text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()));

    let Some(start) = dates.next() else {
        return Verdict::Pass;
    };
    let mut claims = vec![(Field::DateRange, start)];
    if let Some(end) = dates.next() {
        claims.push((Field::EventEndDate, end));
    }
    Verdict::Claim(claims)
}

fn match_time(ctx: &LineContext<'_>) -> Verdict {
    match TIME_RE.find(&ctx.line.text) {
        Some(m) => Verdict::Claim(vec![(Field::EventTime, m.as_str().to_string())]),
        None => Verdict::Pass,
    }
}

fn match_duration(ctx: &LineContext<'_>) -> Verdict {
    let mentions_unit = ctx.lower.contains("hour") || ctx.lower.contains("min");
    if mentions_unit && ctx.line.text.chars().any(|c| c.is_ascii_digit()) {
        Verdict::Claim(vec![(Field::Duration, ctx.line.text.clone())])
    } else {
        Verdict::Pass
    }
}

fn match_age_limit(ctx: &LineContext<'_>) -> Verdict {
    if ctx.lower.contains("age limit") || ctx.lower.contains("yrs") {
        Verdict::Claim(vec![(Field::AgeLimit, ctx.line.text.clone())])
    } else {
        Verdict::Pass
    }
}

fn match_language(ctx: &LineContext<'_>) -> Verdict {
    if ctx.config.languages.iter().any(|lang| ctx.line.text.contains(lang.as_str())) {
        Verdict::Claim(vec![(Field::Language, ctx.line.text.clone())])
    } else {
        Verdict::Pass
    }
}

fn match_venue(ctx: &LineContext<'_>) -> Verdict {
    let text = &ctx.line.text;
    let has_keyword = ctx
        .config
        .venue_keywords
        .iter()
        .any(|keyword| ctx.lower.contains(&keyword.to_lowercase()));
    if !text.contains(':') && !has_keyword {
        return Verdict::Pass;
    }

    let venue = match ctx.next {
        Some(next) if text.ends_with(':') => format!("{} {}", text, next.text).trim().to_string(),
        _ => text.clone(),
    };
    Verdict::Claim(vec![(Field::Venue, venue)])
}

fn guard_clock_fragment(ctx: &LineContext<'_>) -> Verdict {
    if ctx.line.text.contains(':') && CLOCK_RE.is_match(&ctx.line.text) {
        Verdict::Consume
    } else {
        Verdict::Pass
    }
}

fn match_price(ctx: &LineContext<'_>) -> Verdict {
    let Some(candidate) = ctx.price.find(&ctx.line.text) else {
        return Verdict::Pass;
    };
    match normalize_price(
        candidate.amount,
        candidate.fraction,
        candidate.suffix,
        &ctx.config.currency_symbol,
        ctx.config.price_threshold,
    ) {
        Some(price) => Verdict::Claim(vec![(Field::Price, price)]),
        None => Verdict::Pass,
    }
}

/// Drops `<digits` OCR artifacts and trailing separator punctuation from a venue.
/// Applying it twice gives the same result as applying it once.
pub fn clean_venue(venue: &str) -> String {
    let stripped = VENUE_ARTIFACT_RE.replace_all(venue, "");
    stripped
        .trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}

/// Runs the precedence table over `lines` in document order.
pub struct FieldClassifier {
    config: ExtractionConfig,
    price: PricePattern,
}

impl FieldClassifier {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let price = PricePattern::new(&config)?;
        Ok(Self { config, price })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn classify(&self, lines: &[Line]) -> ClassificationState {
        let mut state = ClassificationState::new();

        for (i, line) in lines.iter().enumerate() {
            let ctx = LineContext {
                line,
                next: lines.get(i + 1),
                lower: line.text.to_lowercase(),
                config: &self.config,
                price: &self.price,
            };

            for predicate in PREDICATES {
                if predicate.target.is_some_and(|field| state.is_claimed(field)) {
                    continue;
                }
                if !(predicate.applies)(&state) {
                    continue;
                }
                match (predicate.eval)(&ctx) {
                    Verdict::Pass => continue,
                    Verdict::Consume => {
                        trace!(
                            line = line.position,
                            source_line = line.source_line,
                            predicate = predicate.name,
                            "Line consumed"
                        );
                        break;
                    }
                    Verdict::Claim(claims) => {
                        for (field, value) in claims {
                            if state.claim(field, value) {
                                trace!(
                                    line = line.position,
                                    source_line = line.source_line,
                                    %field,
                                    "Field claimed"
                                );
                            }
                        }
                        break;
                    }
                }
            }

            if state.is_claimed(Field::Venue) {
                state.normalize_claimed(Field::Venue, clean_venue);
            }
        }

        state
    }
}
