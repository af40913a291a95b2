//! Search expression tree
//!
//! A query is an ordered list of elements. Relations are positional markers
//! between siblings, not binary nodes: the first relation found among a
//! group's direct children applies to every sibling of that group.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::fields::{MetadataSubfield, SearchField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchOperator {
    Equals,
    Greater,
    Lesser,
    /// Substring or pattern match.
    #[default]
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalRelation {
    And,
    Or,
}

impl LogicalRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalRelation::And => "AND",
            LogicalRelation::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a leaf predicate is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairTarget {
    Field { field: SearchField },
    /// Profile-defined field `md.<index>[.<subfield>]`.
    Metadata {
        index: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subfield: Option<MetadataSubfield>,
    },
    /// File-derived technical metadata `technical[<label>]`.
    Technical { label: String },
    /// Collection-level metadata entry `collection.md.<label>`.
    CollectionMetadata { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPair {
    pub target: PairTarget,
    #[serde(default)]
    pub operator: SearchOperator,
    pub value: String,
    #[serde(default)]
    pub negate: bool,
}

impl SearchPair {
    pub fn new(field: SearchField, operator: SearchOperator, value: impl Into<String>) -> Self {
        Self {
            target: PairTarget::Field { field },
            operator,
            value: value.into(),
            negate: false,
        }
    }

    pub fn metadata(
        index: impl Into<String>,
        subfield: Option<MetadataSubfield>,
        operator: SearchOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target: PairTarget::Metadata {
                index: index.into(),
                subfield,
            },
            operator,
            value: value.into(),
            negate: false,
        }
    }

    pub fn technical(
        label: impl Into<String>,
        operator: SearchOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target: PairTarget::Technical {
                label: label.into(),
            },
            operator,
            value: value.into(),
            negate: false,
        }
    }

    pub fn collection_metadata(
        label: impl Into<String>,
        operator: SearchOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target: PairTarget::CollectionMetadata {
                label: label.into(),
            },
            operator,
            value: value.into(),
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn field(&self) -> Option<SearchField> {
        match &self.target {
            PairTarget::Field { field } => Some(*field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchGroup {
    pub elements: Vec<SearchElement>,
    #[serde(default)]
    pub negate: bool,
}

impl SearchGroup {
    pub fn new(elements: Vec<SearchElement>) -> Self {
        Self {
            elements,
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchElement {
    Pair(SearchPair),
    Group(SearchGroup),
    Relation { relation: LogicalRelation },
}

impl SearchElement {
    pub fn and() -> Self {
        SearchElement::Relation {
            relation: LogicalRelation::And,
        }
    }

    pub fn or() -> Self {
        SearchElement::Relation {
            relation: LogicalRelation::Or,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SearchElement::Group(g) => g.elements.iter().all(SearchElement::is_empty),
            SearchElement::Pair(_) => false,
            SearchElement::Relation { .. } => true,
        }
    }
}

impl From<SearchPair> for SearchElement {
    fn from(pair: SearchPair) -> Self {
        SearchElement::Pair(pair)
    }
}

impl From<SearchGroup> for SearchElement {
    fn from(group: SearchGroup) -> Self {
        SearchElement::Group(group)
    }
}

impl From<LogicalRelation> for SearchElement {
    fn from(relation: LogicalRelation) -> Self {
        SearchElement::Relation { relation }
    }
}

/// Relation governing a list of siblings: the first marker found, if any.
pub fn first_relation(elements: &[SearchElement]) -> Option<LogicalRelation> {
    elements.iter().find_map(|e| match e {
        SearchElement::Relation { relation } => Some(*relation),
        _ => None,
    })
}

/// A complete, immutable search expression.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery {
    pub elements: Vec<SearchElement>,
}

impl SearchQuery {
    pub fn new(elements: Vec<SearchElement>) -> Self {
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(SearchElement::is_empty)
    }

    /// Depth-first walk over every pair in the tree.
    pub fn pairs(&self) -> Vec<&SearchPair> {
        fn walk<'a>(elements: &'a [SearchElement], out: &mut Vec<&'a SearchPair>) {
            for e in elements {
                match e {
                    SearchElement::Pair(p) => out.push(p),
                    SearchElement::Group(g) => walk(&g.elements, out),
                    SearchElement::Relation { .. } => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.elements, &mut out);
        out
    }

    /// True if some pair anywhere in the tree targets `field`.
    pub fn contains_field(&self, field: SearchField) -> bool {
        self.pairs().iter().any(|p| p.field() == Some(field))
    }
}

impl From<Vec<SearchElement>> for SearchQuery {
    fn from(elements: Vec<SearchElement>) -> Self {
        Self { elements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(v: &str) -> SearchElement {
        SearchPair::new(SearchField::Title, SearchOperator::Regex, v).into()
    }

    #[test]
    fn first_relation_wins() {
        let elements = vec![title("a"), SearchElement::or(), title("b"), SearchElement::and(), title("c")];
        assert_eq!(first_relation(&elements), Some(LogicalRelation::Or));
        assert_eq!(first_relation(&[title("a")]), None);
    }

    #[test]
    fn empty_groups_make_an_empty_query() {
        let query = SearchQuery::new(vec![SearchGroup::new(vec![SearchGroup::default().into()]).into()]);
        assert!(query.is_empty());
        assert!(!SearchQuery::new(vec![title("x")]).is_empty());
    }

    #[test]
    fn contains_field_walks_nested_groups() {
        let status = SearchPair::new(SearchField::Status, SearchOperator::Equals, "public");
        let query = SearchQuery::new(vec![
            title("a"),
            SearchGroup::new(vec![SearchGroup::new(vec![status.into()]).into()]).into(),
        ]);
        assert!(query.contains_field(SearchField::Status));
        assert!(!query.contains_field(SearchField::License));
    }

    #[test]
    fn operator_defaults_to_regex_when_missing() {
        let pair: SearchPair = serde_json::from_value(serde_json::json!({
            "target": {"kind": "field", "field": "title"},
            "value": "cat"
        }))
        .unwrap();
        assert_eq!(pair.operator, SearchOperator::Regex);
        assert!(!pair.negate);
    }
}
