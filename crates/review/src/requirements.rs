//! Requirements-list parsing.

use crate::Requirement;

/// Splits `text` into requirements, one per line.
///
/// Lines are whitespace-trimmed and blank lines are dropped. Order is kept.
/// Both `\n` and `\r\n` line endings are accepted.
pub fn parse_requirements(text: &str) -> Vec<Requirement> {
    text.lines().filter_map(Requirement::new).collect()
}
