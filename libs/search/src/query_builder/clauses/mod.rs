//! Leaf clause builders organized by value type.
//!
//! Every builder returns a [`ClauseResult`]. Bad user input is reported as
//! [`ClauseError::Invalid`] and turned into `MatchNone` by the caller; only
//! store failures travel further.

mod bounds;
mod date;
mod metadata;
mod number;
mod special;
mod string;
mod technical;

use atrium_models::User;

use crate::clause::Clause;
use crate::config::CompilerConfig;
use crate::hierarchy::{HierarchyError, HierarchyService};

pub(crate) use special::build_pair_clause;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClauseError {
    /// The value cannot be turned into a predicate.
    Invalid(String),
    Store(HierarchyError),
}

impl From<HierarchyError> for ClauseError {
    fn from(e: HierarchyError) -> Self {
        ClauseError::Store(e)
    }
}

pub(crate) type ClauseResult = Result<Clause, ClauseError>;

pub(crate) fn invalid(reason: impl Into<String>) -> ClauseError {
    ClauseError::Invalid(reason.into())
}

/// What leaf builders may consult besides the pair itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClauseContext<'a> {
    pub config: &'a CompilerConfig,
    pub hierarchy: &'a HierarchyService,
    pub user: Option<&'a User>,
    pub for_containers: bool,
}
