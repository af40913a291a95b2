use rust_decimal::Decimal;
use std::str::FromStr;

use atrium_models::search::SearchOperator;

use super::bounds::{parse_range_spec, RangeSpec};
use super::{invalid, ClauseError, ClauseResult};
use crate::clause::{Clause, RangeValue};

pub(super) fn parse_number(raw: &str) -> Result<Decimal, ClauseError> {
    let s = raw.trim().trim_matches('"');
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| invalid(format!("not a number: '{raw}'")))
}

/// Numeric predicate. `GREATER`/`LESSER` are inclusive single bounds, other
/// operators read the `from X to Y` grammar; a bare number is an exact match.
pub(super) fn build_number_clause(attr: &str, op: SearchOperator, value: &str) -> ClauseResult {
    match op {
        SearchOperator::Greater | SearchOperator::Lesser => build_comparison_clause(attr, op, value),
        SearchOperator::Equals | SearchOperator::Regex => match parse_range_spec(value) {
            RangeSpec::Bare(v) => {
                let n = RangeValue::Number(parse_number(&v)?);
                Ok(Clause::range(attr, Some(n), Some(n)))
            }
            RangeSpec::Between { from, to } => {
                if from.is_none() && to.is_none() {
                    return Err(invalid(format!("empty number range: '{value}'")));
                }
                let gte = from
                    .map(|f| parse_number(&f).map(RangeValue::Number))
                    .transpose()?;
                let lte = to
                    .map(|t| parse_number(&t).map(RangeValue::Number))
                    .transpose()?;
                Ok(Clause::range(attr, gte, lte))
            }
        },
    }
}

/// `GREATER`/`LESSER` on any attribute: numeric, or nothing.
pub(super) fn build_comparison_clause(attr: &str, op: SearchOperator, value: &str) -> ClauseResult {
    let n = Some(RangeValue::Number(parse_number(value)?));
    match op {
        SearchOperator::Greater => Ok(Clause::range(attr, n, None)),
        SearchOperator::Lesser => Ok(Clause::range(attr, None, n)),
        _ => Err(invalid(format!("{op:?} is not a comparison"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Option<RangeValue> {
        Some(RangeValue::Number(Decimal::from_str(s).unwrap()))
    }

    #[test]
    fn bare_number_is_exact() {
        let c = build_number_clause("size", SearchOperator::Equals, "42").unwrap();
        assert_eq!(c, Clause::range("size", num("42"), num("42")));
    }

    #[test]
    fn from_to_grammar() {
        let c = build_number_clause("size", SearchOperator::Regex, "from 1.5 to 3").unwrap();
        assert_eq!(c, Clause::range("size", num("1.5"), num("3")));

        let c = build_number_clause("size", SearchOperator::Equals, "to -2").unwrap();
        assert_eq!(c, Clause::range("size", None, num("-2")));
    }

    #[test]
    fn comparisons_are_single_bounds() {
        let c = build_number_clause("size", SearchOperator::Greater, "10").unwrap();
        assert_eq!(c, Clause::range("size", num("10"), None));
        let c = build_number_clause("size", SearchOperator::Lesser, "10").unwrap();
        assert_eq!(c, Clause::range("size", None, num("10")));
    }

    #[test]
    fn scientific_notation_is_accepted() {
        assert_eq!(parse_number("1e3").unwrap(), Decimal::from(1000));
    }

    #[test]
    fn garbage_is_invalid() {
        for v in ["abc", "from x to 3", "from to", ""] {
            assert!(
                matches!(
                    build_number_clause("size", SearchOperator::Equals, v),
                    Err(ClauseError::Invalid(_))
                ),
                "value {v:?}"
            );
        }
        assert!(build_number_clause("size", SearchOperator::Greater, "big").is_err());
    }
}
