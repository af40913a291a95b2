//! Users, user groups and the grant lists they carry
//!
//! Grants are stored in their serialized form so that strings read from the
//! store are kept verbatim, malformed ones included. They are only parsed
//! when a decision is made.

use serde::{Deserialize, Serialize};

use crate::grant::{extract_target_id, find_index_by_target, Grant, GrantType};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub grants: Vec<String>,
    #[serde(default)]
    pub groups: Vec<UserGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grants: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant.to_grant_string());
        self
    }

    pub fn with_group(mut self, group: UserGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Own grants followed by the grants of every group, in order.
    pub fn all_grants(&self) -> impl Iterator<Item = Grant> + '_ {
        self.grants
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.grants.iter()))
            .map(|s| Grant::parse(s))
    }

    /// A system administrator holds `ADMIN` on the global target. Group grants
    /// never confer it.
    pub fn is_sysadmin(&self, global_target: &str) -> bool {
        self.grants.iter().map(|s| Grant::parse(s)).any(|g| {
            g.grant_type == Some(GrantType::Admin) && g.target.as_deref() == Some(global_target)
        })
    }

    /// Give `role` on `target`, replacing the role of an existing grant for
    /// the same target.
    pub fn grant(&mut self, role: GrantType, target: &str) {
        upsert_grant(&mut self.grants, Grant::new(role, target));
    }

    /// Remove every grant on `target`. Returns how many were removed.
    pub fn revoke(&mut self, target: &str) -> usize {
        revoke_target(&mut self.grants, target)
    }

    /// Remove one grant by its exact serialized form.
    pub fn remove_grant_string(&mut self, grant: &str) -> bool {
        match self.grants.iter().position(|g| g == grant) {
            Some(idx) => {
                self.grants.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Role of the user's own first grant on `target`.
    pub fn role_for(&self, target: &str) -> Option<GrantType> {
        find_index_by_target(&self.grants, target)
            .and_then(|idx| Grant::parse(&self.grants[idx]).grant_type)
    }
}

impl UserGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grants: Vec::new(),
        }
    }

    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.push(grant.to_grant_string());
        self
    }

    pub fn grant(&mut self, role: GrantType, target: &str) {
        upsert_grant(&mut self.grants, Grant::new(role, target));
    }

    pub fn revoke(&mut self, target: &str) -> usize {
        revoke_target(&mut self.grants, target)
    }
}

fn upsert_grant(grants: &mut Vec<String>, grant: Grant) {
    let target = grant.target.as_deref().unwrap_or_default();
    match find_index_by_target(grants, target) {
        Some(idx) => grants[idx] = grant.to_grant_string(),
        None => grants.push(grant.to_grant_string()),
    }
}

fn revoke_target(grants: &mut Vec<String>, target: &str) -> usize {
    let before = grants.len();
    grants.retain(|g| extract_target_id(g) != Some(target));
    before - grants.len()
}
