//! Error types for the domain models

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown grant type: {0}")]
    UnknownGrantType(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Unknown search field: {0}")]
    UnknownField(String),

    #[error("Unknown metadata subfield: {0}")]
    UnknownSubfield(String),

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),
}
