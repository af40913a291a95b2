//! Search expression model
//!
//! Built by the request layer, consumed read-only by the compiler.

pub mod element;
pub mod fields;
pub mod sort;

pub use element::{
    first_relation, LogicalRelation, PairTarget, SearchElement, SearchGroup, SearchOperator,
    SearchPair, SearchQuery,
};
pub use fields::{MetadataSubfield, SearchField};
pub use sort::{SortCriterion, SortOrder};
