//! Error types shared by the loaders, consolidator and writers.
//!
//! Malformed *content* inside FASTA/GFF text never produces an error: the
//! codecs report it through [`crate::diagnostics::Diagnostics`]. Errors
//! are reserved for unreadable inputs and for file-list inconsistencies
//! that would make downstream artifacts silently wrong.

use crate::diagnostics::Diagnostics;
use std::io;
use thiserror::Error;

/// Errors that can occur while loading, validating or writing.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Fatal structural problem in a file list.
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported input: {0}")]
    Unsupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, PrepError>;

impl PrepError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        PrepError::Validation(message.into())
    }

    /// Fatal column-name check, carrying the warnings that explain it.
    pub(crate) fn invalid_columns(source: &str, diags: &Diagnostics) -> Self {
        let reasons: Vec<String> = diags.warnings().map(|d| d.message.clone()).collect();
        PrepError::Validation(format!(
            "invalid column names in {}: {}",
            source,
            reasons.join("; ")
        ))
    }
}
