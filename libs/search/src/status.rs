//! Default visibility by status

use atrium_models::search::{SearchElement, SearchField};
use atrium_models::{Status, User};

use crate::attributes;
use crate::clause::Clause;

/// Objects visible to everyone.
pub fn released_clause() -> Clause {
    Clause::term(attributes::STATUS, Status::Released.as_str())
}

/// Visibility filter applied unless the expression decides status itself.
///
/// Anonymous users only see released objects. Signed-in users see everything
/// but withdrawn objects, unless the expression predicates on status
/// anywhere in its tree.
pub fn build_status_clause(elements: &[SearchElement], user: Option<&User>) -> Clause {
    if user.is_none() {
        return released_clause();
    }
    if has_status_predicate(elements) {
        return Clause::MatchAll;
    }
    Clause::not(Clause::term(attributes::STATUS, Status::Withdrawn.as_str()))
}

/// True if a status pair appears at any depth.
pub fn has_status_predicate(elements: &[SearchElement]) -> bool {
    elements.iter().any(|e| match e {
        SearchElement::Pair(pair) => pair.field() == Some(SearchField::Status),
        SearchElement::Group(group) => has_status_predicate(&group.elements),
        SearchElement::Relation { .. } => false,
    })
}
