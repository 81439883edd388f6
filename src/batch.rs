use chrono::NaiveDate;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{BatchConfig, Config};
use crate::error::{ExtractError, Result};
use crate::extract::Extractor;
use crate::recognizer::TextRecognizer;
use crate::storage::{SnapshotStore, SnapshotWrite};
use crate::types::{DegradedRecord, ExtractionOutcome, Field, ImageSource};

static ORDER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[\s_.\-]*").expect("order prefix pattern compiles"));

/// Ordered outcomes of one run
pub type BatchResult = Vec<ExtractionOutcome>;

/// Summary of a complete batch run
#[derive(Debug)]
pub struct BatchReport {
    /// Outcomes in persisted (sorted) order
    pub outcomes: BatchResult,
    pub total_inputs: usize,
    pub extracted: usize,
    pub degraded: usize,
    pub current: Option<SnapshotWrite>,
    pub historical: Option<SnapshotWrite>,
}

impl BatchReport {
    fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
            total_inputs: 0,
            extracted: 0,
            degraded: 0,
            current: None,
            historical: None,
        }
    }
}

/// Derives an [`ImageSource`] from `<index>_<event-name>.<ext>`.
pub fn parse_source(path: &Path) -> Result<ImageSource> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExtractError::InvalidFileName(path.display().to_string()))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ExtractError::InvalidFileName(file_name.to_string()))?;

    let index = stem
        .split('_')
        .next()
        .and_then(|prefix| prefix.parse::<u32>().ok())
        .unwrap_or(0);

    Ok(ImageSource {
        index,
        event_name: stem.replace('_', " "),
        source_image: file_name.to_string(),
    })
}

/// Event name without its numeric ordering prefix and separator
pub fn cleaned_event_name(event_name: &str) -> String {
    ORDER_PREFIX_RE.replace(event_name, "").trim().to_string()
}

/// Stable, case-insensitive sort by cleaned event name.
pub fn sort_by_cleaned_name(outcomes: &mut [ExtractionOutcome]) {
    outcomes.sort_by_cached_key(|o| cleaned_event_name(o.event_name()).to_lowercase());
}

/// Inputs with the configured extension, in numeric-prefix order (file name breaks ties).
/// A missing or unreadable directory yields no inputs.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<(ImageSource, PathBuf)>> {
    if !dir.is_dir() {
        warn!("Input directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read input directory {}: {}", dir.display(), e);
            return Ok(Vec::new());
        }
    };
    Ok(collect_inputs(entries.map(|entry| entry.map(|e| e.path())), extension))
}

/// Unreadable entries and undecodable file names are skipped with a warning.
fn collect_inputs(
    entries: impl IntoIterator<Item = io::Result<PathBuf>>,
    extension: &str,
) -> Vec<(ImageSource, PathBuf)> {
    let mut inputs = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !path.is_file() || !matches_ext {
            continue;
        }
        match parse_source(&path) {
            Ok(source) => inputs.push((source, path)),
            Err(e) => warn!("Skipping input: {}", e),
        }
    }

    inputs.sort_by(|(a, _), (b, _)| (a.index, &a.source_image).cmp(&(b.index, &b.source_image)));
    inputs
}

/// JSON array with 4-space indentation; non-ASCII text is written as-is.
pub fn render_snapshot(outcomes: &[ExtractionOutcome]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    outcomes.serialize(&mut ser)?;
    Ok(buf)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extraction panicked".to_string()
    }
}

/// Runs extraction over a directory of screenshots and persists the sorted result.
pub struct BatchRunner {
    extractor: Extractor,
    batch: BatchConfig,
    recognizer: Box<dyn TextRecognizer>,
    store: Box<dyn SnapshotStore>,
}

impl BatchRunner {
    pub fn new(
        config: Config,
        recognizer: Box<dyn TextRecognizer>,
        store: Box<dyn SnapshotStore>,
    ) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(config.extraction)?,
            batch: config.batch,
            recognizer,
            store,
        })
    }

    /// Processes one image; any failure becomes a degraded record.
    #[instrument(skip_all, fields(image = %source.source_image))]
    pub fn process_image(&self, source: &ImageSource, path: &Path) -> ExtractionOutcome {
        let extracted = self.recognizer.recognize(path).and_then(|text| {
            panic::catch_unwind(AssertUnwindSafe(|| self.extractor.extract(&text, source)))
                .map_err(|payload| ExtractError::Extraction(panic_message(payload)))
        });

        match extracted {
            Ok(record) => {
                for field in Field::ALL.into_iter().filter(|f| record.is_resolved(*f)) {
                    counter!("extractor_fields_resolved_total", "field" => field.as_str()).increment(1);
                }
                ExtractionOutcome::Event(record)
            }
            Err(e) => {
                error!("Error processing {}: {}", source.source_image, e);
                ExtractionOutcome::Degraded(DegradedRecord {
                    event_name: source.event_name.clone(),
                    error: e.to_string(),
                    source_image: source.source_image.clone(),
                })
            }
        }
    }

    /// Processes every input in `input_dir` (the configured directory when `None`).
    #[instrument(skip_all, fields(recognizer = self.recognizer.name(), %run_date))]
    pub fn run(&self, input_dir: Option<&Path>, run_date: NaiveDate) -> Result<BatchReport> {
        let started = std::time::Instant::now();
        let dir = input_dir.unwrap_or(self.batch.input_dir.as_path());

        let inputs = discover_inputs(dir, &self.batch.input_extension)?;
        if inputs.is_empty() {
            warn!(
                "No .{} files found in {}; nothing persisted",
                self.batch.input_extension,
                dir.display()
            );
            return Ok(BatchReport::empty());
        }
        info!("Found {} screenshots to process", inputs.len());

        let mut outcomes = Vec::with_capacity(inputs.len());
        for (source, path) in &inputs {
            debug!("Processing: {}", source.source_image);
            outcomes.push(self.process_image(source, path));
        }

        let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
        let extracted = outcomes.len() - degraded;
        counter!("extractor_images_processed_total").increment(extracted as u64);
        counter!("extractor_images_failed_total").increment(degraded as u64);

        sort_by_cleaned_name(&mut outcomes);

        let payload = render_snapshot(&outcomes)?;
        let current = self.store.write_current(&payload)?;
        let historical = self.store.write_historical(run_date, &payload)?;
        info!(
            digest = %current.digest,
            historical_digest = %historical.digest,
            "Saved {} records to {} and {} ({:?})",
            outcomes.len(),
            current.location,
            historical.location,
            historical.status
        );

        histogram!("extractor_batch_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(BatchReport {
            outcomes,
            total_inputs: inputs.len(),
            extracted,
            degraded,
            current: Some(current),
            historical: Some(historical),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str) -> ExtractionOutcome {
        ExtractionOutcome::Degraded(DegradedRecord {
            event_name: name.to_string(),
            error: "x".to_string(),
            source_image: format!("{}.png", name.replace(' ', "_")),
        })
    }

    #[test]
    fn test_parse_source() {
        let source = parse_source(Path::new("shots/07_Sunburn_Arena_Tour.png")).unwrap();
        assert_eq!(source.index, 7);
        assert_eq!(source.event_name, "07 Sunburn Arena Tour");
        assert_eq!(source.source_image, "07_Sunburn_Arena_Tour.png");

        assert_eq!(parse_source(Path::new("Untitled.png")).unwrap().index, 0);
    }

    #[test]
    fn test_cleaned_event_name() {
        assert_eq!(cleaned_event_name("07 Sunburn Arena Tour"), "Sunburn Arena Tour");
        assert_eq!(cleaned_event_name("12_-Comedy Night"), "Comedy Night");
        assert_eq!(cleaned_event_name("No Prefix"), "No Prefix");
    }

    #[test]
    fn test_sort_is_case_insensitive_and_stable() {
        let mut outcomes = vec![
            outcome("01 zakir live"),
            outcome("02 Arijit Singh"),
            outcome("03 arijit singh"),
            outcome("04 Ballet"),
        ];
        sort_by_cleaned_name(&mut outcomes);
        let names: Vec<_> = outcomes.iter().map(|o| o.event_name()).collect();
        assert_eq!(names, ["02 Arijit Singh", "03 arijit singh", "04 Ballet", "01 zakir live"]);
    }

    #[test]
    fn test_discover_inputs_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["10_Late.png", "2_Early.png", "01_First.png", "notes.txt", "03_Upper.PNG"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let inputs = discover_inputs(dir.path(), "png").unwrap();
        let names: Vec<_> = inputs.iter().map(|(s, _)| s.source_image.as_str()).collect();
        assert_eq!(names, ["01_First.png", "2_Early.png", "03_Upper.PNG", "10_Late.png"]);
    }

    #[test]
    fn test_unreadable_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("02_Second.png"), b"").unwrap();
        fs::write(dir.path().join("01_First.png"), b"").unwrap();

        let entries = vec![
            Ok(dir.path().join("02_Second.png")),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Ok(dir.path().join("01_First.png")),
        ];
        let inputs = collect_inputs(entries, "png");
        let names: Vec<_> = inputs.iter().map(|(s, _)| s.source_image.as_str()).collect();
        assert_eq!(names, ["01_First.png", "02_Second.png"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_inputs(&dir.path().join("absent"), "png").unwrap().is_empty());
    }

    #[test]
    fn test_render_snapshot_keeps_key_order_and_unicode() {
        let payload = render_snapshot(&[outcome("01 Show")]).unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert!(text.starts_with("[\n    {\n        \"event_name\": \"01 Show\",\n        \"error\""));

        let priced = ExtractionOutcome::Degraded(DegradedRecord {
            event_name: "₹".to_string(),
            error: String::new(),
            source_image: String::new(),
        });
        let text = String::from_utf8(render_snapshot(&[priced]).unwrap()).unwrap();
        assert!(text.contains("\"₹\""));
    }
}
