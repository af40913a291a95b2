//! Visibility status of collections and items

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Draft, visible to grant holders only.
    Pending,
    Released,
    Withdrawn,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Released => "RELEASED",
            Status::Withdrawn => "WITHDRAWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical names, the `private`/`public`/`discarded` aliases,
/// and status URIs such as `http://imeji.org/terms/status#RELEASED` (only the
/// part after `#` counts). Case-insensitive.
impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.rsplit_once('#').map(|(_, n)| n).unwrap_or(s).trim();
        match name.to_ascii_lowercase().as_str() {
            "pending" | "private" => Ok(Status::Pending),
            "released" | "public" => Ok(Status::Released),
            "withdrawn" | "discarded" => Ok(Status::Withdrawn),
            _ => Err(Error::UnknownStatus(s.to_string())),
        }
    }
}
