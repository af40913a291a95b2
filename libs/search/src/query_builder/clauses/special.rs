//! Per-field dispatch and the fields with their own rules.

use atrium_models::search::{PairTarget, SearchField, SearchOperator, SearchPair};
use atrium_models::{GrantType, Status};

use super::date::build_date_clause;
use super::metadata::{
    build_collection_info_clause, build_metadata_clause, numeric_metadata_clause,
};
use super::number::{build_comparison_clause, parse_number};
use super::string::{build_exact_clause, build_keyword_clause, build_text_clause};
use super::technical::{build_technical_clause, content_clause};
use super::{invalid, ClauseContext, ClauseResult};
use crate::attributes;
use crate::clause::{Clause, RangeValue};
use crate::config::CompilerConfig;
use crate::security::build_security_clause;
use crate::string_normalization::{normalize_keyword_value, normalize_text_value};

/// Clause for one leaf predicate, negation included.
pub(crate) fn build_pair_clause(ctx: &ClauseContext<'_>, pair: &SearchPair) -> ClauseResult {
    match &pair.target {
        PairTarget::Metadata { index, subfield } => build_metadata_clause(
            ctx,
            index,
            *subfield,
            pair.operator,
            &pair.value,
            pair.negate,
        ),
        PairTarget::Technical { label } => {
            build_technical_clause(label, pair.operator, &pair.value, pair.negate)
        }
        PairTarget::CollectionMetadata { label } => {
            build_collection_info_clause(ctx, label, pair.operator, &pair.value, pair.negate)
        }
        PairTarget::Field { field } => {
            let clause = build_field_clause(ctx, *field, pair.operator, &pair.value)?;
            Ok(Clause::negate_if(clause, pair.negate))
        }
    }
}

fn build_field_clause(
    ctx: &ClauseContext<'_>,
    field: SearchField,
    op: SearchOperator,
    value: &str,
) -> ClauseResult {
    use crate::attributes as a;

    match field {
        SearchField::All => build_all_clause(op, value),
        SearchField::Fulltext => Ok(content_clause(build_text_clause(
            a::CONTENT_FULLTEXT,
            op,
            value,
        )?)),
        SearchField::Checksum => Ok(content_clause(build_exact_clause(
            a::CONTENT_CHECKSUM,
            value,
        )?)),
        SearchField::Col => build_exact_clause(a::FOLDER, value),
        SearchField::Collection | SearchField::CollectionId => {
            build_collection_clause(ctx.config, value)
        }
        SearchField::Title | SearchField::Filename => build_text_clause(a::NAME, op, value),
        SearchField::Description => build_text_clause(a::DESCRIPTION, op, value),
        SearchField::AuthorFamilyname => build_text_clause(a::AUTHOR_FAMILYNAME, op, value),
        SearchField::AuthorGivenname => build_text_clause(a::AUTHOR_GIVENNAME, op, value),
        SearchField::Author => build_text_clause(a::AUTHOR_COMPLETENAME, op, value),
        SearchField::AuthorOrganization => build_text_clause(a::AUTHOR_ORGANIZATION, op, value),
        SearchField::CollectionTitle => Ok(Clause::has_parent(
            a::JOIN_FOLDERS,
            build_text_clause(a::NAME, op, value)?,
        )),
        SearchField::CollectionDescription => Ok(Clause::has_parent(
            a::JOIN_FOLDERS,
            build_text_clause(a::DESCRIPTION, op, value)?,
        )),
        SearchField::CollectionAuthor => build_text_clause(a::AUTHORS_OF_COLLECTION, op, value),
        SearchField::CollectionAuthorOrganisation => {
            build_text_clause(a::ORGANIZATIONS_OF_COLLECTION, op, value)
        }
        SearchField::Family => build_text_clause(a::FAMILYNAME, op, value),
        SearchField::Given => build_text_clause(a::GIVENNAME, op, value),
        SearchField::Organization => build_text_clause(a::ORGANIZATION, op, value),
        SearchField::Created => build_date_clause(a::CREATED, op, value),
        SearchField::Modified => build_date_clause(a::MODIFIED, op, value),
        SearchField::Creator => build_keyword_clause(a::CREATOR, op, value),
        SearchField::Collaborator => build_collaborator_clause(value),
        SearchField::Read => build_exact_clause(a::READ, value),
        SearchField::Filetype => build_filetype_clause(ctx.config, value),
        SearchField::Role => build_role_clause(ctx, value),
        SearchField::License => build_license_clause(ctx.config, value),
        SearchField::Status => build_status_value_clause(value),
        SearchField::Pid => build_keyword_clause(a::PID, op, value),
        SearchField::InfoLabel => build_text_clause(a::INFO_LABEL, op, value),
        SearchField::InfoText => build_text_clause(a::INFO_TEXT, op, value),
        SearchField::InfoUrl => build_keyword_clause(a::INFO_URL, op, value),
        SearchField::Email => build_exact_clause(a::EMAIL, value),
        SearchField::Index => Ok(Clause::nested(
            a::METADATA,
            build_exact_clause(a::METADATA_INDEX, value)?,
        )),
        SearchField::Id => build_exact_clause(a::ID_STRING, value),
        SearchField::Completename
        | SearchField::Creatorid
        | SearchField::Editor
        | SearchField::Filesize
        | SearchField::Fileextension
        | SearchField::Md
        | SearchField::Technical => Err(invalid(format!("field '{field}' is not searchable"))),
    }
}

/// Free text: the catch-all attribute, file names, and numeric metadata
/// when the value is a number.
fn build_all_clause(op: SearchOperator, value: &str) -> ClauseResult {
    if matches!(op, SearchOperator::Greater | SearchOperator::Lesser) {
        let range = build_comparison_clause(attributes::METADATA_NUMBER, op, value)?;
        return Ok(Clause::nested(attributes::METADATA, range));
    }

    let text = normalize_text_value(value.trim_matches('"'));
    if text.is_empty() {
        return Err(invalid("empty free-text value"));
    }
    let leaf = |attr: &str| {
        if op == SearchOperator::Equals {
            Clause::term(attr, text.clone())
        } else {
            Clause::substring(attr, text.clone())
        }
    };

    let mut clauses = vec![leaf(attributes::ALL), leaf(attributes::NAME_SUGGEST)];
    if let Ok(n) = parse_number(value) {
        clauses.push(numeric_metadata_clause(RangeValue::Number(n)));
    }
    Ok(Clause::should(clauses))
}

fn build_collection_clause(config: &CompilerConfig, value: &str) -> ClauseResult {
    let id = normalize_keyword_value(value);
    if id.is_empty() {
        return Err(invalid("empty collection id"));
    }
    Ok(Clause::term(attributes::FOLDER, config.container_id(&id)))
}

/// Users who were given read access, without the creator.
fn build_collaborator_clause(value: &str) -> ClauseResult {
    let user = normalize_keyword_value(value);
    if user.is_empty() {
        return Err(invalid("empty collaborator"));
    }
    Ok(Clause::must([
        Clause::term(attributes::READ, user.clone()),
        Clause::not(Clause::term(attributes::CREATOR, user)),
    ]))
}

fn parse_role(value: &str) -> Option<GrantType> {
    let role = normalize_keyword_value(value);
    if role.eq_ignore_ascii_case("upload") {
        return Some(GrantType::Edit);
    }
    role.to_ascii_uppercase().parse().ok()
}

fn build_role_clause(ctx: &ClauseContext<'_>, value: &str) -> ClauseResult {
    let role = parse_role(value).ok_or_else(|| invalid(format!("unknown role '{value}'")))?;
    Ok(build_security_clause(
        ctx.config,
        ctx.hierarchy,
        ctx.user,
        Some(role),
        ctx.for_containers,
    )?)
}

/// Split `a OR b` and `a,b` lists.
fn alternatives(value: &str) -> Vec<String> {
    value
        .split(" OR ")
        .flat_map(|part| part.split(','))
        .map(normalize_keyword_value)
        .filter(|v| !v.is_empty())
        .collect()
}

/// `*` stands for any license but the no-license sentinel.
fn build_license_clause(config: &CompilerConfig, value: &str) -> ClauseResult {
    let licenses = alternatives(value);
    if licenses.is_empty() {
        return Err(invalid("empty license value"));
    }
    Ok(Clause::should(licenses.into_iter().map(|license| {
        if license == "*" {
            Clause::must([
                Clause::exists(attributes::LICENSE),
                Clause::not(Clause::term(attributes::LICENSE, config.no_license.clone())),
            ])
        } else {
            Clause::term(attributes::LICENSE, license)
        }
    })))
}

fn build_filetype_clause(config: &CompilerConfig, value: &str) -> ClauseResult {
    let mut clauses = Vec::new();
    for name in alternatives(value) {
        match config.extensions_for(&name) {
            Some(extensions) => clauses.extend(extensions.iter().map(|ext| {
                Clause::substring(attributes::NAME_SUGGEST, format!("*.{}", ext.to_lowercase()))
            })),
            None => tracing::debug!(file_type = %name, "Unknown file type"),
        }
    }
    if clauses.is_empty() {
        return Err(invalid(format!("no known file type in '{value}'")));
    }
    Ok(Clause::should(clauses))
}

fn build_status_value_clause(value: &str) -> ClauseResult {
    let status: Status = normalize_keyword_value(value)
        .parse()
        .map_err(|_| invalid(format!("unknown status '{value}'")))?;
    Ok(Clause::term(attributes::STATUS, status.as_str()))
}
