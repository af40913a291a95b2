//! Backend-agnostic boolean clause tree
//!
//! The compiler's only output. An adapter outside this crate maps each node
//! kind onto a concrete search engine's query language.
//!
//! The constructors on [`Clause`] normalise as they build: `MatchAll`
//! children are dropped from `Must` and absorb a whole `Should`, an empty
//! list becomes `MatchAll` and a single child is returned unwrapped.
//! `MatchNone` is never dropped.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    MatchAll,
    MatchNone,
    Must(Vec<Clause>),
    Should(Vec<Clause>),
    MustNot(Box<Clause>),
    TermEquals {
        attr: String,
        value: String,
    },
    SubstringMatch {
        attr: String,
        value: String,
    },
    Range {
        attr: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<RangeValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<RangeValue>,
    },
    GeoDistance {
        attr: String,
        lat: f64,
        lon: f64,
        radius: String,
    },
    /// Matches documents with any value for `attr`.
    Exists {
        attr: String,
    },
    Nested {
        path: String,
        clause: Box<Clause>,
    },
    HasChild {
        join: String,
        clause: Box<Clause>,
    },
    HasParent {
        join: String,
        clause: Box<Clause>,
    },
}

/// Bound of a [`Clause::Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeValue {
    Number(Decimal),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeValue::Number(n) => write!(f, "{n}"),
            RangeValue::Timestamp(t) => {
                f.write_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

impl Clause {
    /// AND of `children`.
    pub fn must(children: impl IntoIterator<Item = Clause>) -> Clause {
        Self::combine(children, Clause::Must)
    }

    /// OR of `children`. A `MatchAll` child makes the whole disjunction
    /// `MatchAll`.
    pub fn should(children: impl IntoIterator<Item = Clause>) -> Clause {
        let children: Vec<Clause> = children.into_iter().collect();
        if children.iter().any(Clause::is_match_all) {
            return Clause::MatchAll;
        }
        Self::combine(children, Clause::Should)
    }

    fn combine(
        children: impl IntoIterator<Item = Clause>,
        wrap: fn(Vec<Clause>) -> Clause,
    ) -> Clause {
        let mut kept: Vec<Clause> = children
            .into_iter()
            .filter(|c| !c.is_match_all())
            .collect();
        match kept.len() {
            0 => Clause::MatchAll,
            1 => kept.remove(0),
            _ => wrap(kept),
        }
    }

    pub fn not(clause: Clause) -> Clause {
        Clause::MustNot(Box::new(clause))
    }

    /// `clause`, or its negation when `negate` is set.
    pub fn negate_if(clause: Clause, negate: bool) -> Clause {
        if negate {
            Clause::not(clause)
        } else {
            clause
        }
    }

    pub fn term(attr: impl Into<String>, value: impl Into<String>) -> Clause {
        Clause::TermEquals {
            attr: attr.into(),
            value: value.into(),
        }
    }

    pub fn substring(attr: impl Into<String>, value: impl Into<String>) -> Clause {
        Clause::SubstringMatch {
            attr: attr.into(),
            value: value.into(),
        }
    }

    pub fn range(
        attr: impl Into<String>,
        gte: Option<RangeValue>,
        lte: Option<RangeValue>,
    ) -> Clause {
        Clause::Range {
            attr: attr.into(),
            gte,
            lte,
        }
    }

    pub fn exists(attr: impl Into<String>) -> Clause {
        Clause::Exists { attr: attr.into() }
    }

    pub fn geo_distance(
        attr: impl Into<String>,
        lat: f64,
        lon: f64,
        radius: impl Into<String>,
    ) -> Clause {
        Clause::GeoDistance {
            attr: attr.into(),
            lat,
            lon,
            radius: radius.into(),
        }
    }

    pub fn nested(path: impl Into<String>, clause: Clause) -> Clause {
        Clause::Nested {
            path: path.into(),
            clause: Box::new(clause),
        }
    }

    pub fn has_child(join: impl Into<String>, clause: Clause) -> Clause {
        Clause::HasChild {
            join: join.into(),
            clause: Box::new(clause),
        }
    }

    pub fn has_parent(join: impl Into<String>, clause: Clause) -> Clause {
        Clause::HasParent {
            join: join.into(),
            clause: Box::new(clause),
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Clause::MatchAll)
    }

    pub fn is_match_none(&self) -> bool {
        matches!(self, Clause::MatchNone)
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Clause::Must(children) | Clause::Should(children) => {
                1 + children.iter().map(Clause::size).sum::<usize>()
            }
            Clause::MustNot(inner) => 1 + inner.size(),
            Clause::Nested { clause, .. }
            | Clause::HasChild { clause, .. }
            | Clause::HasParent { clause, .. } => 1 + clause.size(),
            _ => 1,
        }
    }
}

/// Compact prefix notation, mainly for logs and test failure output.
impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, name: &str, children: &[Clause]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (i, c) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{c}")?;
            }
            f.write_str(")")
        }

        match self {
            Clause::MatchAll => f.write_str("*"),
            Clause::MatchNone => f.write_str("-"),
            Clause::Must(children) => list(f, "AND", children),
            Clause::Should(children) => list(f, "OR", children),
            Clause::MustNot(inner) => write!(f, "NOT({inner})"),
            Clause::TermEquals { attr, value } => write!(f, "{attr}=={value:?}"),
            Clause::SubstringMatch { attr, value } => write!(f, "{attr}~{value:?}"),
            Clause::Range { attr, gte, lte } => {
                let lo = gte.map(|v| v.to_string()).unwrap_or_default();
                let hi = lte.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "{attr}[{lo}..{hi}]")
            }
            Clause::GeoDistance {
                attr,
                lat,
                lon,
                radius,
            } => write!(f, "{attr}@({lat},{lon}/{radius})"),
            Clause::Exists { attr } => write!(f, "{attr}?"),
            Clause::Nested { path, clause } => write!(f, "nested:{path}({clause})"),
            Clause::HasChild { join, clause } => write!(f, "child:{join}({clause})"),
            Clause::HasParent { join, clause } => write!(f, "parent:{join}({clause})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_combinations_match_all() {
        assert_eq!(Clause::must(vec![]), Clause::MatchAll);
        assert_eq!(Clause::should(vec![]), Clause::MatchAll);
    }

    #[test]
    fn match_all_children_are_elided_from_must() {
        let c = Clause::must(vec![Clause::MatchAll, Clause::term("a", "1"), Clause::MatchAll]);
        assert_eq!(c, Clause::term("a", "1"));

        let c = Clause::must(vec![Clause::MatchAll, Clause::MatchAll]);
        assert_eq!(c, Clause::MatchAll);
    }

    #[test]
    fn match_all_disjunct_matches_all() {
        let c = Clause::should(vec![Clause::term("a", "1"), Clause::MatchAll]);
        assert_eq!(c, Clause::MatchAll);
    }

    #[test]
    fn match_none_is_preserved() {
        let c = Clause::must(vec![Clause::term("a", "1"), Clause::MatchNone]);
        assert_eq!(
            c,
            Clause::Must(vec![Clause::term("a", "1"), Clause::MatchNone])
        );
    }

    #[test]
    fn serializes_externally_tagged() {
        let c = Clause::must(vec![Clause::term("status", "RELEASED"), Clause::MatchNone]);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"must": [
                {"term_equals": {"attr": "status", "value": "RELEASED"}},
                "match_none"
            ]})
        );
    }

    #[test]
    fn display_is_compact() {
        let c = Clause::must(vec![
            Clause::substring("name", "cat"),
            Clause::not(Clause::term("status", "WITHDRAWN")),
        ]);
        assert_eq!(c.to_string(), r#"AND(name~"cat", NOT(status=="WITHDRAWN"))"#);
        assert_eq!(c.size(), 4);
    }
}
