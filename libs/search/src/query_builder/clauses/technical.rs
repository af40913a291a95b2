use atrium_models::search::SearchOperator;

use super::string::{build_exact_clause, build_text_clause};
use super::ClauseResult;
use crate::attributes;
use crate::clause::Clause;

/// Technical metadata lives on the content child: a named entry whose value
/// satisfies the operator. Negation applies to the value only.
pub(super) fn build_technical_clause(
    label: &str,
    op: SearchOperator,
    value: &str,
    negate: bool,
) -> ClauseResult {
    let name = build_exact_clause(attributes::CONTENT_TECHNICAL_NAME, label)?;
    let value = build_text_clause(attributes::CONTENT_TECHNICAL_VALUE, op, value)?;
    Ok(content_clause(Clause::nested(
        attributes::CONTENT_TECHNICAL,
        Clause::must([name, Clause::negate_if(value, negate)]),
    )))
}

/// Route a clause through the content child document.
pub(super) fn content_clause(clause: Clause) -> Clause {
    Clause::has_child(attributes::JOIN_CONTENT, clause)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn technical_pair_requires_label_and_value() {
        let c = build_technical_clause("Make", SearchOperator::Equals, "Canon", false).unwrap();
        assert_eq!(
            c,
            Clause::has_child(
                "content",
                Clause::nested(
                    "content.technical",
                    Clause::Must(vec![
                        Clause::term("content.technical.name", "Make"),
                        Clause::term("content.technical.value", "canon"),
                    ])
                )
            )
        );
    }

    #[test]
    fn negation_applies_to_value() {
        let c = build_technical_clause("ISO", SearchOperator::Greater, "100", true).unwrap();
        let Clause::HasChild { clause, .. } = c else {
            panic!("expected content join");
        };
        let Clause::Nested { clause, .. } = *clause else {
            panic!("expected nested clause");
        };
        let Clause::Must(children) = *clause else {
            panic!("expected conjunction");
        };
        assert!(matches!(children[1], Clause::MustNot(_)));
    }

    #[test]
    fn bad_comparison_value_is_invalid() {
        assert!(build_technical_clause("ISO", SearchOperator::Greater, "high", false).is_err());
        assert!(build_technical_clause("", SearchOperator::Equals, "x", false).is_err());
    }
}
