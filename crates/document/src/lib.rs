//! plancheck document infrastructure adapter.
//!
//! Reads the two inputs of a review from disk: the building document (a PDF,
//! flattened to [`review::DocumentText`]) and the requirements list (a text
//! file, one requirement per line).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File-system access and PDF parsing live here. The
//! [`review`] crate only ever sees the extracted text and parsed requirements.

use std::path::PathBuf;

use thiserror::Error;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod pdf;
pub mod requirements;

pub use pdf::{extract_text, extract_text_from_bytes};
pub use requirements::read_requirements;

/// Failures while reading review inputs.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes could not be parsed as a PDF.
    #[error("Not a valid PDF: {reason}")]
    InvalidPdf {
        /// Source file, when extraction started from a path.
        path: Option<PathBuf>,
        reason: String,
    },
}
