pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod logging;
pub mod metrics;
pub mod recognizer;
pub mod storage;
pub mod types;

pub use batch::{BatchReport, BatchRunner};
pub use config::Config;
pub use error::{ExtractError, Result};
pub use extract::Extractor;
pub use types::{DegradedRecord, EventRecord, ExtractionOutcome, Field, ImageSource};
