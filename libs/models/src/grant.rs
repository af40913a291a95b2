//! Authorization grants
//!
//! A grant gives a role on one target resource and travels as the string
//! `"ROLE,targetId"`. Parsing never fails: malformed strings produce a grant
//! without a role, which never satisfies any role check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Role held through a grant. `Read < Edit < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantType {
    Read,
    Edit,
    Admin,
}

impl GrantType {
    pub const ALL: [GrantType; 3] = [GrantType::Read, GrantType::Edit, GrantType::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Read => "READ",
            GrantType::Edit => "EDIT",
            GrantType::Admin => "ADMIN",
        }
    }

    /// True if `other` is this role or a stronger one.
    ///
    /// Used with `self` as the required role and `other` as the held role:
    /// a `Read` requirement is met by every grant, an `Edit` requirement by
    /// `Edit` or `Admin`, an `Admin` requirement only by `Admin`.
    pub fn is_same_or_bigger(self, other: GrantType) -> bool {
        match self {
            GrantType::Read => true,
            GrantType::Edit => matches!(other, GrantType::Edit | GrantType::Admin),
            GrantType::Admin => other == GrantType::Admin,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "READ" => Ok(GrantType::Read),
            "EDIT" => Ok(GrantType::Edit),
            "ADMIN" => Ok(GrantType::Admin),
            other => Err(Error::UnknownGrantType(other.to_string())),
        }
    }
}

/// A role on a target resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Grant {
    pub grant_type: Option<GrantType>,
    pub target: Option<String>,
}

impl Grant {
    pub fn new(grant_type: GrantType, target: impl Into<String>) -> Self {
        Self {
            grant_type: Some(grant_type),
            target: Some(target.into()),
        }
    }

    /// The grant issued to whoever creates `target`.
    pub fn creator(target: impl Into<String>) -> Self {
        Self::new(GrantType::Admin, target)
    }

    /// Parse `"ROLE,target"`.
    ///
    /// Anything other than exactly two comma-separated parts yields an empty
    /// grant. An unknown role keeps the target but leaves `grant_type` unset.
    pub fn parse(s: &str) -> Self {
        let parts: Vec<&str> = s.trim().split(',').collect();
        match parts.as_slice() {
            [role, target] if !target.is_empty() => Self {
                grant_type: role.parse().ok(),
                target: Some((*target).to_string()),
            },
            _ => Self::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.grant_type.is_some() && self.target.is_some()
    }

    pub fn to_grant_string(&self) -> String {
        format!(
            "{},{}",
            self.grant_type.map(|t| t.as_str()).unwrap_or_default(),
            self.target.as_deref().unwrap_or_default()
        )
    }

    /// True if the grant's role meets `required`.
    pub fn satisfies(&self, required: GrantType) -> bool {
        self.grant_type
            .map(|held| required.is_same_or_bigger(held))
            .unwrap_or(false)
    }

    pub fn equals_by_target(&self, other: &Grant) -> bool {
        self.target.is_some() && self.target == other.target
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_grant_string())
    }
}

/// Target id of a serialized grant: everything after the first comma.
pub fn extract_target_id(grant_string: &str) -> Option<&str> {
    grant_string
        .split_once(',')
        .map(|(_, target)| target)
        .filter(|target| !target.is_empty())
}

/// Position of the first grant string whose target is `target`.
pub fn find_index_by_target<S: AsRef<str>>(grants: &[S], target: &str) -> Option<usize> {
    grants
        .iter()
        .position(|g| extract_target_id(g.as_ref()) == Some(target))
}
