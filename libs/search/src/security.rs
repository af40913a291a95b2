//! Authorization clause
//!
//! Restricts results to what a user may see: objects in containers the user
//! holds a grant on (including every sub-container), plus released objects
//! when no particular role is asked for.

use std::collections::BTreeSet;

use atrium_models::{GrantType, User};

use crate::attributes;
use crate::clause::Clause;
use crate::config::CompilerConfig;
use crate::hierarchy::{HierarchyError, HierarchyService};
use crate::status::released_clause;

/// Builder for the security clause of one request.
#[derive(Debug, Clone)]
pub struct SecurityClauseBuilder<'a> {
    config: &'a CompilerConfig,
    hierarchy: &'a HierarchyService,
    user: Option<&'a User>,
    role: Option<GrantType>,
    for_containers: bool,
}

impl<'a> SecurityClauseBuilder<'a> {
    pub fn new(config: &'a CompilerConfig, hierarchy: &'a HierarchyService) -> Self {
        Self {
            config,
            hierarchy,
            user: None,
            role: None,
            for_containers: false,
        }
    }

    pub fn with_user(mut self, user: Option<&'a User>) -> Self {
        self.user = user;
        self
    }

    /// Only count grants that carry at least `role`.
    pub fn with_role(mut self, role: Option<GrantType>) -> Self {
        self.role = role;
        self
    }

    /// Scope containers by their own id instead of items by their container.
    pub fn for_containers(mut self, for_containers: bool) -> Self {
        self.for_containers = for_containers;
        self
    }

    pub fn build(self) -> Result<Clause, HierarchyError> {
        let Some(user) = self.user else {
            if self.role.is_some() {
                tracing::debug!(role = ?self.role, "Anonymous user holds no role");
                return Ok(Clause::MatchNone);
            }
            return Ok(released_clause());
        };

        if self.role.is_none() && user.is_sysadmin(&self.config.global_grant_target) {
            return Ok(Clause::MatchAll);
        }

        let targets = self.granted_containers(user);
        if targets.is_empty() && self.role.is_some() {
            tracing::debug!(user = %user.id, role = ?self.role, "No container grant with required role");
            return Ok(Clause::MatchNone);
        }

        let attr = if self.for_containers {
            attributes::ID
        } else {
            attributes::FOLDER
        };

        let mut clauses: Vec<Clause> = self
            .hierarchy
            .expand_with_descendants(&targets)?
            .into_iter()
            .map(|id| Clause::term(attr, id))
            .collect();

        if self.role.is_none() {
            clauses.push(released_clause());
        }

        Ok(Clause::should(clauses))
    }

    /// Container targets of the user's valid grants that meet the required
    /// role, own grants first, without duplicates.
    fn granted_containers(&self, user: &User) -> Vec<String> {
        let mut seen = BTreeSet::new();
        user.all_grants()
            .filter(|g| g.is_valid())
            .filter(|g| self.role.map_or(true, |required| g.satisfies(required)))
            .filter_map(|g| g.target)
            .filter(|target| self.config.is_container_id(target))
            .filter(|target| seen.insert(target.clone()))
            .collect()
    }
}

/// Shorthand for [`SecurityClauseBuilder`].
pub fn build_security_clause(
    config: &CompilerConfig,
    hierarchy: &HierarchyService,
    user: Option<&User>,
    role: Option<GrantType>,
    for_containers: bool,
) -> Result<Clause, HierarchyError> {
    SecurityClauseBuilder::new(config, hierarchy)
        .with_user(user)
        .with_role(role)
        .for_containers(for_containers)
        .build()
}
