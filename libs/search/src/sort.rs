//! Sort clauses
//!
//! Each criterion maps to one backend sort attribute. Criteria that are
//! missing or name a field without a sort attribute become the default
//! order, creation date ascending, one per entry.

use serde::{Deserialize, Serialize};

use atrium_models::search::{SearchField, SortCriterion, SortOrder};

use crate::attributes;

/// How the backend should treat documents lacking the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedType {
    Keyword,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub attr: String,
    pub order: SortOrder,
    pub unmapped_type: UnmappedType,
}

impl SortClause {
    fn new(attr: &str, order: SortOrder, unmapped_type: UnmappedType) -> Self {
        Self {
            attr: attr.to_string(),
            order,
            unmapped_type,
        }
    }

    pub fn default_order() -> Self {
        Self::new(attributes::CREATED, SortOrder::Asc, UnmappedType::Long)
    }
}

fn sort_attribute(field: SearchField) -> Option<(&'static str, UnmappedType)> {
    let mapped = match field {
        SearchField::Title | SearchField::Filename => (attributes::NAME_SORT, UnmappedType::Keyword),
        SearchField::Created => (attributes::CREATED, UnmappedType::Long),
        SearchField::Modified => (attributes::MODIFIED, UnmappedType::Long),
        SearchField::Filetype => (attributes::FILETYPE, UnmappedType::Keyword),
        SearchField::Filesize => (attributes::SIZE, UnmappedType::Long),
        SearchField::Fileextension => (attributes::FILE_EXTENSION_SORT, UnmappedType::Keyword),
        SearchField::Creatorid => (attributes::CREATORS_SORT, UnmappedType::Keyword),
        SearchField::Status => (attributes::STATUS, UnmappedType::Keyword),
        SearchField::Completename => (attributes::COMPLETENAME_SORT, UnmappedType::Keyword),
        _ => return None,
    };
    Some(mapped)
}

/// Sort clauses for `criteria`, in order. An empty list stays empty.
pub fn compile_sort(criteria: &[Option<SortCriterion>]) -> Vec<SortClause> {
    criteria
        .iter()
        .map(|criterion| match criterion {
            Some(c) => match sort_attribute(c.field) {
                Some((attr, unmapped)) => SortClause::new(attr, c.order, unmapped),
                None => {
                    tracing::debug!(field = %c.field, "No sort attribute, using default order");
                    SortClause::default_order()
                }
            },
            None => SortClause::default_order(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_criteria_give_no_clauses() {
        assert!(compile_sort(&[]).is_empty());
    }

    #[test]
    fn missing_criterion_gives_default() {
        assert_eq!(compile_sort(&[None]), vec![SortClause::default_order()]);
    }

    #[test]
    fn mapped_fields_keep_order() {
        let clauses = compile_sort(&[
            Some(SortCriterion::desc(SearchField::Title)),
            Some(SortCriterion::asc(SearchField::Filesize)),
        ]);
        assert_eq!(
            clauses,
            vec![
                SortClause::new("name.sort", SortOrder::Desc, UnmappedType::Keyword),
                SortClause::new("size", SortOrder::Asc, UnmappedType::Long),
            ]
        );
    }

    #[test]
    fn each_unmapped_entry_falls_back() {
        let clauses = compile_sort(&[
            Some(SortCriterion::desc(SearchField::Description)),
            Some(SortCriterion::desc(SearchField::Modified)),
            Some(SortCriterion::asc(SearchField::License)),
        ]);
        assert_eq!(
            clauses,
            vec![
                SortClause::default_order(),
                SortClause::new("modified", SortOrder::Desc, UnmappedType::Long),
                SortClause::default_order(),
            ]
        );
    }
}
