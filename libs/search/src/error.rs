//! Error types for query compilation

use thiserror::Error;

use crate::hierarchy::HierarchyError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a compilation.
///
/// Bad user input never shows up here: malformed leaves compile to a clause
/// that matches nothing. Only failures that would make the produced filter
/// untrustworthy are reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
