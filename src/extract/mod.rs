//! Field extraction for one event panel's OCR text.
//!
//! Raw text is split into lines, classified in a single forward pass, scanned for
//! occupancy status, then cleaned into a sentinel-complete [`EventRecord`].

pub mod classifier;
pub mod cleanup;
pub mod lines;
pub mod price;
pub mod status;

use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::types::{EventRecord, ImageSource};

pub use classifier::{ClassificationState, FieldClassifier};
pub use lines::{normalize_lines, Line};
pub use status::SeatsStatus;

/// Reusable extractor; holds the configuration and its compiled patterns.
pub struct Extractor {
    classifier: FieldClassifier,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        Ok(Self {
            classifier: FieldClassifier::new(config)?,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        self.classifier.config()
    }

    /// Extracts the event record for `source` from its OCR text.
    pub fn extract(&self, text: &str, source: &ImageSource) -> EventRecord {
        let lines = normalize_lines(text);
        let state = self.classifier.classify(&lines);
        let status = status::scan_status(&lines);
        debug!(
            source = %source.source_image,
            lines = lines.len(),
            ?status,
            "Classified OCR text"
        );
        cleanup::finalize(state, status, source, self.config())
    }
}
