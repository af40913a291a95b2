use atrium_models::search::SearchOperator;

use super::number::build_comparison_clause;
use super::{invalid, ClauseResult};
use crate::clause::Clause;
use crate::string_normalization::{normalize_keyword_value, normalize_text_value};

/// Analysed text attribute: values are case and accent folded.
pub(super) fn build_text_clause(attr: &str, op: SearchOperator, value: &str) -> ClauseResult {
    match op {
        SearchOperator::Greater | SearchOperator::Lesser => build_comparison_clause(attr, op, value),
        SearchOperator::Equals | SearchOperator::Regex => {
            let v = normalize_text_value(value.trim_matches('"'));
            if v.is_empty() {
                return Err(invalid(format!("empty value for {attr}")));
            }
            if op == SearchOperator::Equals {
                Ok(Clause::term(attr, v))
            } else {
                Ok(Clause::substring(attr, v))
            }
        }
    }
}

/// Keyword attribute: values are compared verbatim.
pub(super) fn build_keyword_clause(attr: &str, op: SearchOperator, value: &str) -> ClauseResult {
    match op {
        SearchOperator::Greater | SearchOperator::Lesser => build_comparison_clause(attr, op, value),
        SearchOperator::Equals => build_exact_clause(attr, value),
        SearchOperator::Regex => {
            let v = normalize_keyword_value(value);
            if v.is_empty() {
                return Err(invalid(format!("empty value for {attr}")));
            }
            Ok(Clause::substring(attr, v))
        }
    }
}

/// Keyword equality regardless of the requested operator.
pub(super) fn build_exact_clause(attr: &str, value: &str) -> ClauseResult {
    let v = normalize_keyword_value(value);
    if v.is_empty() {
        return Err(invalid(format!("empty value for {attr}")));
    }
    Ok(Clause::term(attr, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::clauses::ClauseError;

    #[test]
    fn text_equals_is_folded_term() {
        let c = build_text_clause("name", SearchOperator::Equals, "\"Café Noir\"").unwrap();
        assert_eq!(c, Clause::term("name", "cafe noir"));
    }

    #[test]
    fn text_regex_is_substring() {
        let c = build_text_clause("name", SearchOperator::Regex, "Cat").unwrap();
        assert_eq!(c, Clause::substring("name", "cat"));
    }

    #[test]
    fn keyword_keeps_case() {
        let c = build_keyword_clause("pid", SearchOperator::Equals, " hdl:11858/ABC ").unwrap();
        assert_eq!(c, Clause::term("pid", "hdl:11858/ABC"));
    }

    #[test]
    fn comparison_on_text_needs_a_number() {
        assert!(matches!(
            build_text_clause("name", SearchOperator::Greater, "abc"),
            Err(ClauseError::Invalid(_))
        ));
        assert!(build_text_clause("name", SearchOperator::Lesser, "3").is_ok());
    }

    #[test]
    fn empty_values_are_invalid() {
        assert!(build_text_clause("name", SearchOperator::Regex, "  ").is_err());
        assert!(build_exact_clause("email", "\"\"").is_err());
    }
}
