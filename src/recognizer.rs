use std::fs;
use std::io;
use std::path::Path;

use crate::constants::SIDECAR_EXTENSION;
use crate::error::{ExtractError, Result};

/// Source of OCR text for one screenshot
pub trait TextRecognizer {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    /// Returns the plain, newline-separated text recognized in `image`.
    fn recognize(&self, image: &Path) -> Result<String>;
}

/// Reads OCR output that an upstream stage stored beside each image as `<stem>.txt`.
/// When the input itself is a `.txt` file it is read directly.
#[derive(Debug, Clone, Default)]
pub struct SidecarRecognizer;

impl SidecarRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl TextRecognizer for SidecarRecognizer {
    fn name(&self) -> &'static str {
        "sidecar_text"
    }

    fn recognize(&self, image: &Path) -> Result<String> {
        let sidecar = image.with_extension(SIDECAR_EXTENSION);
        fs::read_to_string(&sidecar).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ExtractError::MissingInput(format!("no OCR text at {}", sidecar.display()))
            }
            _ => ExtractError::Recognition {
                image: image.display().to_string(),
                message: e.to_string(),
            },
        })
    }
}
