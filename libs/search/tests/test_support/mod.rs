#![allow(dead_code)]

use std::sync::Arc;

use atrium_search::{CompilerConfig, HierarchyService, InMemoryHierarchy, QueryCompiler};

pub const BASE: &str = "http://atrium.test";

pub fn col(id: &str) -> String {
    format!("{BASE}/collection/{id}")
}

pub fn global_target() -> String {
    format!("{BASE}/")
}

pub fn config() -> CompilerConfig {
    CompilerConfig::default()
        .with_base_uri(BASE)
        .with_global_grant_target(global_target())
}

/// 42 -> 43 -> 44, and a lone 7.
pub fn hierarchy() -> HierarchyService {
    HierarchyService::new(Arc::new(InMemoryHierarchy::from_parent_links([
        (col("43"), col("42")),
        (col("44"), col("43")),
    ])))
}

pub fn compiler() -> QueryCompiler {
    QueryCompiler::new(config(), hierarchy())
}
