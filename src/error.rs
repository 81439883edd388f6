use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input file name: {0}")]
    InvalidFileName(String),

    #[error("Text recognition failed for {image}: {message}")]
    Recognition { image: String, message: String },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Snapshot write failed for {path}: {message}")]
    Snapshot { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
