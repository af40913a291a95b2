//! Predicates on profile-defined metadata.
//!
//! Metadata values are nested records `{index, text, number, time, ...}`.
//! A predicate must hold on one record whose `index` is the profile field.

use regex::Regex;
use std::sync::OnceLock;

use atrium_models::search::{MetadataSubfield, SearchOperator};

use super::date::build_date_clause;
use super::number::build_number_clause;
use super::string::{build_keyword_clause, build_text_clause};
use super::{invalid, ClauseContext, ClauseResult};
use crate::attributes;
use crate::clause::{Clause, RangeValue};
use crate::config::CompilerConfig;

pub(super) fn build_metadata_clause(
    ctx: &ClauseContext<'_>,
    index: &str,
    subfield: Option<MetadataSubfield>,
    op: SearchOperator,
    value: &str,
    negate: bool,
) -> ClauseResult {
    let value_clause = match subfield.unwrap_or(MetadataSubfield::Text) {
        MetadataSubfield::Exact => build_keyword_clause(attributes::METADATA_EXACT, op, value)?,
        MetadataSubfield::Text => build_text_clause(attributes::METADATA_TEXT, op, value)?,
        MetadataSubfield::Placename => build_text_clause(attributes::METADATA_NAME, op, value)?,
        MetadataSubfield::Title => build_text_clause(attributes::METADATA_TITLE, op, value)?,
        MetadataSubfield::Number => build_number_clause(attributes::METADATA_NUMBER, op, value)?,
        MetadataSubfield::Date | MetadataSubfield::Time => {
            build_date_clause(attributes::METADATA_TIME, op, value)?
        }
        MetadataSubfield::Url => build_keyword_clause(attributes::METADATA_URI, op, value)?,
        MetadataSubfield::Familyname => {
            build_text_clause(attributes::METADATA_FAMILYNAME, op, value)?
        }
        MetadataSubfield::Givenname => {
            build_text_clause(attributes::METADATA_GIVENNAME, op, value)?
        }
        MetadataSubfield::Coordinates => build_geo_clause(ctx.config, value)?,
    };

    Ok(in_metadata_record(
        index,
        Clause::negate_if(value_clause, negate),
    ))
}

fn in_metadata_record(index: &str, clause: Clause) -> Clause {
    Clause::nested(
        attributes::METADATA,
        Clause::must([clause, Clause::term(attributes::METADATA_INDEX, index)]),
    )
}

/// An `info` entry of a collection with this label whose text satisfies
/// the operator. Items reach it through their parent collection.
pub(super) fn build_collection_info_clause(
    ctx: &ClauseContext<'_>,
    label: &str,
    op: SearchOperator,
    value: &str,
    negate: bool,
) -> ClauseResult {
    let text = build_text_clause(attributes::INFO_TEXT, op, value)?;
    let entry = Clause::nested(
        attributes::INFO,
        Clause::must([
            Clause::term(attributes::INFO_LABEL_EXACT, label),
            Clause::negate_if(text, negate),
        ]),
    );
    Ok(if ctx.for_containers {
        entry
    } else {
        Clause::has_parent(attributes::JOIN_FOLDERS, entry)
    })
}

/// Any metadata record holding exactly `n`.
pub(super) fn numeric_metadata_clause(n: RangeValue) -> Clause {
    Clause::nested(
        attributes::METADATA,
        Clause::range(attributes::METADATA_NUMBER, Some(n), Some(n)),
    )
}

/// `"lat,lon[,radius]"`. A missing or zero radius means the configured
/// point radius.
fn build_geo_clause(config: &CompilerConfig, value: &str) -> ClauseResult {
    let parts: Vec<&str> = value.trim().trim_matches('"').split(',').map(str::trim).collect();
    let (lat, lon, radius) = match parts.as_slice() {
        [lat, lon] => (*lat, *lon, None),
        [lat, lon, radius] => (*lat, *lon, Some(*radius)),
        _ => return Err(invalid(format!("not a coordinate: '{value}'"))),
    };

    let lat = parse_degrees(lat, 90.0)?;
    let lon = parse_degrees(lon, 180.0)?;
    let radius = radius
        .filter(|r| !is_zero_distance(r))
        .unwrap_or(config.default_point_radius.as_str());

    Ok(Clause::geo_distance(
        attributes::METADATA_LOCATION,
        lat,
        lon,
        radius,
    ))
}

fn parse_degrees(raw: &str, limit: f64) -> Result<f64, super::ClauseError> {
    raw.parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && d.abs() <= limit)
        .ok_or_else(|| invalid(format!("not a coordinate: '{raw}'")))
}

fn is_zero_distance(radius: &str) -> bool {
    static ZERO_DISTANCE_RE: OnceLock<Regex> = OnceLock::new();
    let re = ZERO_DISTANCE_RE
        .get_or_init(|| Regex::new(r"^0+(\.0*)?[a-zA-Z]{0,2}$").expect("zero distance regex must compile"));
    radius.is_empty() || re.is_match(radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{HierarchyService, InMemoryHierarchy};
    use std::sync::Arc;

    fn with_ctx<T>(f: impl FnOnce(&ClauseContext<'_>) -> T) -> T {
        let config = CompilerConfig::default();
        let hierarchy = HierarchyService::new(Arc::new(InMemoryHierarchy::new()));
        let ctx = ClauseContext {
            config: &config,
            hierarchy: &hierarchy,
            user: None,
            for_containers: false,
        };
        f(&ctx)
    }

    fn geo(lat: f64, lon: f64, radius: &str) -> Clause {
        in_metadata_record(
            "loc",
            Clause::geo_distance(attributes::METADATA_LOCATION, lat, lon, radius),
        )
    }

    #[test]
    fn coordinates_without_radius_are_a_point() {
        let c = with_ctx(|ctx| {
            build_metadata_clause(
                ctx,
                "loc",
                Some(MetadataSubfield::Coordinates),
                SearchOperator::Equals,
                "52.5,13.4",
                false,
            )
        })
        .unwrap();
        assert_eq!(c, geo(52.5, 13.4, "1cm"));
    }

    #[test]
    fn zero_like_radius_is_a_point() {
        for radius in ["0", "000km", "0m", "0.0km"] {
            let c = with_ctx(|ctx| {
                build_metadata_clause(
                    ctx,
                    "loc",
                    Some(MetadataSubfield::Coordinates),
                    SearchOperator::Equals,
                    &format!("52.5, 13.4, {radius}"),
                    false,
                )
            })
            .unwrap();
            assert_eq!(c, geo(52.5, 13.4, "1cm"), "radius {radius:?}");
        }
    }

    #[test]
    fn explicit_radius_is_kept() {
        let c = with_ctx(|ctx| {
            build_metadata_clause(
                ctx,
                "loc",
                Some(MetadataSubfield::Coordinates),
                SearchOperator::Equals,
                "52.5,13.4,10km",
                false,
            )
        })
        .unwrap();
        assert_eq!(c, geo(52.5, 13.4, "10km"));
    }

    #[test]
    fn bad_coordinates_are_invalid() {
        for v in ["52.5", "north,east", "91,0", "1,2,3,4"] {
            let r = with_ctx(|ctx| {
                build_metadata_clause(
                    ctx,
                    "loc",
                    Some(MetadataSubfield::Coordinates),
                    SearchOperator::Equals,
                    v,
                    false,
                )
            });
            assert!(r.is_err(), "value {v:?}");
        }
    }

    #[test]
    fn missing_subfield_means_text_and_negation_stays_inside_record() {
        let c = with_ctx(|ctx| {
            build_metadata_clause(ctx, "idx1", None, SearchOperator::Regex, "Berlin", true)
        })
        .unwrap();
        assert_eq!(
            c,
            Clause::nested(
                attributes::METADATA,
                Clause::Must(vec![
                    Clause::not(Clause::substring(attributes::METADATA_TEXT, "berlin")),
                    Clause::term(attributes::METADATA_INDEX, "idx1"),
                ])
            )
        );
    }

    #[test]
    fn number_subfield_uses_range_grammar() {
        let c = with_ctx(|ctx| {
            build_metadata_clause(
                ctx,
                "n",
                Some(MetadataSubfield::Number),
                SearchOperator::Equals,
                "from 1 to 2",
                false,
            )
        })
        .unwrap();
        let Clause::Nested { clause, .. } = c else {
            panic!("expected nested clause");
        };
        let Clause::Must(children) = *clause else {
            panic!("expected conjunction");
        };
        assert!(matches!(&children[0], Clause::Range { attr, .. } if attr == attributes::METADATA_NUMBER));
    }

    #[test]
    fn collection_info_goes_through_parent_for_items() {
        let entry = |negated: bool| {
            Clause::nested(
                attributes::INFO,
                Clause::Must(vec![
                    Clause::term(attributes::INFO_LABEL_EXACT, "Project name"),
                    Clause::negate_if(Clause::substring(attributes::INFO_TEXT, "atlas"), negated),
                ]),
            )
        };

        let c = with_ctx(|ctx| {
            build_collection_info_clause(ctx, "Project name", SearchOperator::Regex, "Atlas", false)
        })
        .unwrap();
        assert_eq!(c, Clause::has_parent(attributes::JOIN_FOLDERS, entry(false)));

        let config = CompilerConfig::default();
        let hierarchy = HierarchyService::new(Arc::new(InMemoryHierarchy::new()));
        let ctx = ClauseContext {
            config: &config,
            hierarchy: &hierarchy,
            user: None,
            for_containers: true,
        };
        let c = build_collection_info_clause(&ctx, "Project name", SearchOperator::Regex, "Atlas", true)
            .unwrap();
        assert_eq!(c, entry(true));
    }
}
