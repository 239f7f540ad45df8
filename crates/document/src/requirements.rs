//! Requirements-file reading.

use std::path::Path;

use review::{parse_requirements, Requirement};
use tracing::debug;

use crate::DocumentError;

/// Reads a plain-text requirements file, one requirement per line.
///
/// Blank lines are dropped and each line is whitespace-trimmed.
///
/// # Errors
///
/// [`DocumentError::Io`] if the file cannot be read as UTF-8 text.
pub fn read_requirements(path: &Path) -> Result<Vec<Requirement>, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let requirements = parse_requirements(&text);
    debug!(path = %path.display(), count = requirements.len(), "Read requirements");
    Ok(requirements)
}
