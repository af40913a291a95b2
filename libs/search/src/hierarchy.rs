//! Collection hierarchy navigation
//!
//! The hierarchy is read through an injected [`HierarchyStore`]. Stored
//! parent links are not trusted to be acyclic: every walk keeps a visited
//! set and terminates on cycles, logging them as data errors.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("hierarchy store unavailable: {0}")]
    Unavailable(String),

    #[error("hierarchy lookup failed for '{id}': {reason}")]
    Lookup { id: String, reason: String },
}

/// Read access to stored parent/child links between containers.
pub trait HierarchyStore: Send + Sync {
    /// Direct children of `id`.
    fn children(&self, id: &str) -> Result<Vec<String>, HierarchyError>;

    /// Direct parent of `id`, if any.
    fn parent(&self, id: &str) -> Result<Option<String>, HierarchyError>;
}

#[derive(Clone)]
pub struct HierarchyService {
    store: Arc<dyn HierarchyStore>,
}

impl std::fmt::Debug for HierarchyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyService").finish_non_exhaustive()
    }
}

impl HierarchyService {
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }

    /// All containers below `id`, breadth-first, without `id` itself.
    pub fn descendants(&self, id: &str) -> Result<Vec<String>, HierarchyError> {
        let mut seen: HashSet<String> = HashSet::from([id.to_string()]);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id.to_string()]);

        while let Some(current) = queue.pop_front() {
            for child in self.store.children(&current)? {
                if seen.insert(child.clone()) {
                    out.push(child.clone());
                    queue.push_back(child);
                } else if child == id {
                    tracing::warn!(container = %id, via = %current, "Cycle in collection hierarchy");
                }
            }
        }

        Ok(out)
    }

    /// `ids` followed by their descendants, without duplicates.
    pub fn expand_with_descendants<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<String>, HierarchyError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if !seen.insert(id.to_string()) {
                continue;
            }
            out.push(id.to_string());
            for d in self.descendants(id)? {
                if seen.insert(d.clone()) {
                    out.push(d);
                }
            }
        }
        Ok(out)
    }

    pub fn parent(&self, id: &str) -> Result<Option<String>, HierarchyError> {
        self.store.parent(id)
    }

    /// Containers above `id`, root first.
    pub fn ancestors(&self, id: &str) -> Result<Vec<String>, HierarchyError> {
        let mut seen: HashSet<String> = HashSet::from([id.to_string()]);
        let mut out = Vec::new();
        let mut current = id.to_string();

        while let Some(parent) = self.store.parent(&current)? {
            if !seen.insert(parent.clone()) {
                tracing::warn!(container = %id, at = %parent, "Cycle in collection hierarchy");
                break;
            }
            out.push(parent.clone());
            current = parent;
        }

        out.reverse();
        Ok(out)
    }

    /// Topmost ancestor of `id`; `id` itself when it has no parent.
    pub fn root(&self, id: &str) -> Result<String, HierarchyError> {
        Ok(self
            .ancestors(id)?
            .into_iter()
            .next()
            .unwrap_or_else(|| id.to_string()))
    }
}

/// Hierarchy snapshot held in memory, built from child → parent links.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHierarchy {
    parents: HashMap<String, String>,
    children: BTreeMap<String, Vec<String>>,
}

impl InMemoryHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parent_links<I, C, P>(links: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        let mut hierarchy = Self::new();
        for (child, parent) in links {
            hierarchy.insert(child, parent);
        }
        hierarchy
    }

    /// Record `child` under `parent`, replacing any previous parent.
    pub fn insert(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        let child = child.into();
        let parent = parent.into();
        if let Some(old) = self.parents.insert(child.clone(), parent.clone()) {
            if let Some(siblings) = self.children.get_mut(&old) {
                siblings.retain(|c| c != &child);
            }
        }
        self.children.entry(parent).or_default().push(child);
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl HierarchyStore for InMemoryHierarchy {
    fn children(&self, id: &str) -> Result<Vec<String>, HierarchyError> {
        Ok(self.children.get(id).cloned().unwrap_or_default())
    }

    fn parent(&self, id: &str) -> Result<Option<String>, HierarchyError> {
        Ok(self.parents.get(id).cloned())
    }
}
