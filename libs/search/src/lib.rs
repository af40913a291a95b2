//! Atrium search compiler
//!
//! Translates a search expression, a user and a container scope into one
//! backend-agnostic boolean clause. The clause combines what the user asked
//! for with what the user may see:
//!
//! ```text
//! query string
//!      |
//!   parser -> SearchQuery
//!      |
//! QueryCompiler -> Clause
//!      |   (leaf builders, container scope, security, status, filter)
//!      |
//! search backend (out of scope)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use atrium_search::{
//!     parser, Clause, CompilerConfig, HierarchyService, InMemoryHierarchy, QueryCompiler,
//!     SearchRequest,
//! };
//!
//! let compiler = QueryCompiler::new(
//!     CompilerConfig::default(),
//!     HierarchyService::new(Arc::new(InMemoryHierarchy::new())),
//! );
//! let query = parser::parse("title=birds").unwrap();
//! let clause = compiler.compile(&SearchRequest::new(&query)).unwrap();
//! assert!(matches!(clause, Clause::Must(_)));
//! ```

pub mod attributes;
pub mod clause;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod parser;
pub mod query_builder;
pub mod security;
pub mod sort;
pub mod status;
mod string_normalization;

// Re-export main types
pub use clause::{Clause, RangeValue};
pub use config::CompilerConfig;
pub use error::{Error, Result};
pub use hierarchy::{HierarchyError, HierarchyService, HierarchyStore, InMemoryHierarchy};
pub use parser::{is_simple_search, to_query_string, QueryParser};
pub use query_builder::{QueryCompiler, SearchRequest, SearchTarget};
pub use security::{build_security_clause, SecurityClauseBuilder};
pub use sort::{compile_sort, SortClause, UnmappedType};
pub use status::{build_status_clause, has_status_predicate};
