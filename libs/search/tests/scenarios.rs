//! End-to-end compilation through the public API

use atrium_models::search::{
    MetadataSubfield, SearchElement, SearchField, SearchGroup, SearchOperator, SearchPair,
    SearchQuery,
};
use atrium_models::{Grant, GrantType, User};
use atrium_search::{build_security_clause, parser, Clause, SearchRequest, SearchTarget};

mod test_support;
use test_support::{col, compiler, config, global_target, hierarchy};

fn no_content() -> Clause {
    Clause::not(Clause::term("joinField", "content"))
}

fn released() -> Clause {
    Clause::term("status", "RELEASED")
}

fn not_withdrawn() -> Clause {
    Clause::not(Clause::term("status", "WITHDRAWN"))
}

#[test]
fn anonymous_empty_query_sees_released_only() {
    let query = SearchQuery::default();
    let clause = compiler().compile(&SearchRequest::new(&query)).unwrap();
    // security and status both reduce to "released" for anonymous users
    assert_eq!(clause, Clause::Must(vec![released(), released(), no_content()]));
}

#[test]
fn reader_sees_granted_tree_and_released_objects() {
    let user = User::new("u1").with_grant(Grant::new(GrantType::Read, col("42")));
    let query = SearchQuery::new(vec![
        SearchPair::new(SearchField::Title, SearchOperator::Regex, "cat").into(),
    ]);
    let request = SearchRequest::new(&query).with_user(Some(&user));

    let clause = compiler().compile(&request).unwrap();
    assert_eq!(
        clause,
        Clause::Must(vec![
            Clause::substring("name", "cat"),
            Clause::Should(vec![
                Clause::term("folder", col("42")),
                Clause::term("folder", col("43")),
                Clause::term("folder", col("44")),
                released(),
            ]),
            not_withdrawn(),
            no_content(),
        ])
    );
}

#[test]
fn status_predicate_replaces_default_exclusion() {
    let user = User::new("u1");
    let query = SearchQuery::new(vec![SearchGroup::new(vec![SearchPair::new(
        SearchField::Status,
        SearchOperator::Equals,
        "discarded",
    )
    .into()])
    .into()]);
    let request = SearchRequest::new(&query).with_user(Some(&user));

    let clause = compiler().compile(&request).unwrap();
    assert_eq!(
        clause,
        Clause::Must(vec![
            Clause::term("status", "WITHDRAWN"),
            released(),
            no_content(),
        ])
    );
}

#[test]
fn first_relation_governs_whole_group() {
    let title = |v: &str| -> SearchElement {
        SearchPair::new(SearchField::Title, SearchOperator::Regex, v).into()
    };
    let group = SearchGroup::new(vec![title("a"), SearchElement::or(), title("b"), title("c")]);
    let clause = compiler()
        .compile_elements(&[group.into()], None, SearchTarget::Items)
        .unwrap();
    assert_eq!(
        clause,
        Clause::Should(vec![
            Clause::substring("name", "a"),
            Clause::substring("name", "b"),
            Clause::substring("name", "c"),
        ])
    );
}

#[test]
fn upload_role_means_edit_grants() {
    let user = User::new("u1")
        .with_grant(Grant::new(GrantType::Read, col("7")))
        .with_grant(Grant::new(GrantType::Edit, col("43")));
    let query = SearchQuery::new(vec![
        SearchPair::new(SearchField::Role, SearchOperator::Equals, "upload").into(),
    ]);
    let clause = compiler()
        .compile_elements(&query.elements, Some(&user), SearchTarget::Items)
        .unwrap();
    assert_eq!(
        clause,
        Clause::Should(vec![
            Clause::term("folder", col("43")),
            Clause::term("folder", col("44")),
        ])
    );
}

#[test]
fn coordinates_without_radius_are_a_point() {
    let query = SearchQuery::new(vec![SearchPair::metadata(
        "place",
        Some(MetadataSubfield::Coordinates),
        SearchOperator::Equals,
        "52.5,13.4",
    )
    .into()]);
    let clause = compiler()
        .compile_elements(&query.elements, None, SearchTarget::Items)
        .unwrap();
    assert_eq!(
        clause,
        Clause::nested(
            "metadata",
            Clause::Must(vec![
                Clause::geo_distance("metadata.location", 52.5, 13.4, "1cm"),
                Clause::term("metadata.index", "place"),
            ])
        )
    );
}

#[test]
fn sysadmin_bypasses_security() {
    let user = User::new("root")
        .with_grant(Grant::new(GrantType::Admin, global_target()))
        .with_grant(Grant::new(GrantType::Read, col("7")));
    let clause = build_security_clause(&config(), &hierarchy(), Some(&user), None, false).unwrap();
    assert_eq!(clause, Clause::MatchAll);

    // a required role is still checked against real grants
    let clause =
        build_security_clause(&config(), &hierarchy(), Some(&user), Some(GrantType::Admin), false)
            .unwrap();
    assert_eq!(clause, Clause::MatchNone);
}

#[test]
fn grant_string_round_trip() {
    let s = "ADMIN,col123";
    assert_eq!(Grant::parse(s).to_string(), s);
}

#[test]
fn parsed_query_compiles_like_built_query() {
    let user = User::new("u1");
    let parsed = parser::QueryParser::new()
        .with_fulltext(false)
        .parse("title=cat AND NOT created=2020")
        .unwrap();
    let built = SearchQuery::new(vec![
        SearchPair::new(SearchField::Title, SearchOperator::Equals, "cat").into(),
        SearchElement::and(),
        SearchPair::new(SearchField::Created, SearchOperator::Equals, "2020")
            .negated()
            .into(),
    ]);
    assert_eq!(parsed, built);

    let compiler = compiler();
    let a = compiler
        .compile(&SearchRequest::new(&parsed).with_user(Some(&user)))
        .unwrap();
    let b = compiler
        .compile(&SearchRequest::new(&built).with_user(Some(&user)))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn collections_are_scoped_by_own_id() {
    let user = User::new("u1").with_grant(Grant::new(GrantType::Edit, col("44")));
    let query = SearchQuery::new(vec![
        SearchPair::new(SearchField::Title, SearchOperator::Regex, "x").into(),
    ]);
    let request = SearchRequest::new(&query)
        .with_user(Some(&user))
        .with_target(SearchTarget::Collections);
    let Clause::Must(parts) = compiler().compile(&request).unwrap() else {
        panic!("expected conjunction");
    };
    assert_eq!(
        parts[1],
        Clause::Should(vec![Clause::term("id", col("44")), released()])
    );
}

#[test]
fn status_filter_replaces_default_exclusion() {
    let user = User::new("u1").with_grant(Grant::new(GrantType::Read, col("42")));
    let query = SearchQuery::default();
    let filter = parser::parse("status=discarded").unwrap();
    let request = SearchRequest::new(&query)
        .with_user(Some(&user))
        .with_filter(Some(&filter));

    let clause = compiler().compile(&request).unwrap();
    assert_eq!(
        clause,
        Clause::Must(vec![
            Clause::Should(vec![
                Clause::term("folder", col("42")),
                Clause::term("folder", col("43")),
                Clause::term("folder", col("44")),
                released(),
            ]),
            Clause::term("status", "WITHDRAWN"),
            no_content(),
        ])
    );
}

#[test]
fn negated_group_around_malformed_date_matches_nothing() {
    let grouped = parser::parse("NOT (created=soon)").unwrap();
    let bare = parser::parse("NOT created=soon").unwrap();

    let compile = |query: &SearchQuery| compiler().compile(&SearchRequest::new(query)).unwrap();
    let expected = Clause::Must(vec![Clause::MatchNone, released(), released(), no_content()]);
    assert_eq!(compile(&grouped), expected);
    assert_eq!(compile(&bare), expected);
}

#[test]
fn collection_metadata_reaches_items_through_their_collection() {
    let query = parser::parse("collection.md.Project_name=Atlas").unwrap();
    let clause = compiler().compile(&SearchRequest::new(&query)).unwrap();
    assert_eq!(
        clause,
        Clause::Must(vec![
            Clause::has_parent(
                "folders",
                Clause::nested(
                    "info",
                    Clause::Must(vec![
                        Clause::term("info.label.exact", "Project name"),
                        Clause::term("info.text", "atlas"),
                    ]),
                ),
            ),
            released(),
            released(),
            no_content(),
        ])
    );
}
