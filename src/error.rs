//! Error types for the Factur-X attachment library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Factur-X attachment library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF object model error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Input could not be parsed as a PDF
    #[error("Invalid PDF {}: {source}", .path.display())]
    InvalidPdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// ICC profile failed the header check
    #[error("Invalid ICC profile: {0}")]
    InvalidIccProfile(String),

    /// Date parsing error
    #[error("Invalid date expression: {0}")]
    InvalidDateExpression(String),

    /// General error
    #[error("{0}")]
    General(String),
}
