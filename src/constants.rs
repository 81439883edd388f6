//! Default vocabularies and file-layout names used when no config file overrides them.

/// Placeholder written into every field that has no resolved value
pub const SENTINEL: &str = "-";

pub const DEFAULT_PRICE_THRESHOLD: u64 = 50;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

pub const DEFAULT_PRICE_SUFFIXES: &[&str] = &["onwards", "only", "and above"];
pub const DEFAULT_CURRENCY_MARKERS: &[&str] = &["₹", "Rs", "INR"];

pub const DEFAULT_LANGUAGES: &[&str] = &["Hindi", "English", "Tamil", "Telugu", "Kannada", "Malayalam"];

pub const DEFAULT_VENUE_KEYWORDS: &[&str] = &[
    "arena", "stadium", "center", "centre", "hall", "theatre", "club", "venue",
];

// Batch layout
pub const DEFAULT_INPUT_DIR: &str = "screenshots";
pub const DEFAULT_INPUT_EXTENSION: &str = "png";
pub const DEFAULT_OUTPUT_FILE: &str = "all_event_details.json";
pub const DEFAULT_HISTORY_DIR: &str = "history";
pub const DEFAULT_HISTORY_SUFFIX: &str = "event_details";

/// chrono format of the date key in historical snapshot names (DD-MM-YY)
pub const HISTORY_DATE_FORMAT: &str = "%d-%m-%y";

/// Extension of the plain-text OCR output stored beside each image
pub const SIDECAR_EXTENSION: &str = "txt";

pub const CONFIG_PATH_ENV: &str = "EXTRACTOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub(crate) fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
