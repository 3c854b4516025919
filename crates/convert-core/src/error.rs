use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Font load error: {0}")]
    FontLoad(String),

    #[error("Cannot write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("{0}")]
    Other(String),
}

impl ConvertError {
    /// Build a `Write` error for `path` from any displayable cause.
    pub fn write(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        ConvertError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
