//! Searchable fields and metadata subfields
//!
//! Field names are the index names used in query strings (`title=cat`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A fixed domain field a predicate can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    All,
    Fulltext,
    Checksum,
    Col,
    Collection,
    #[serde(rename = "collectionid")]
    CollectionId,
    Title,
    Filename,
    Description,
    AuthorFamilyname,
    AuthorGivenname,
    Author,
    AuthorOrganization,
    CollectionTitle,
    CollectionDescription,
    CollectionAuthor,
    CollectionAuthorOrganisation,
    Family,
    Given,
    Organization,
    Created,
    Modified,
    Creator,
    Collaborator,
    Read,
    Filetype,
    Role,
    License,
    Status,
    Pid,
    InfoLabel,
    InfoText,
    InfoUrl,
    Email,
    Index,
    Id,
    // Reserved: accepted in expressions, never matched.
    Completename,
    Creatorid,
    Editor,
    Filesize,
    Fileextension,
    Md,
    Technical,
}

impl SearchField {
    pub const ALL: [SearchField; 43] = [
        SearchField::All,
        SearchField::Fulltext,
        SearchField::Checksum,
        SearchField::Col,
        SearchField::Collection,
        SearchField::CollectionId,
        SearchField::Title,
        SearchField::Filename,
        SearchField::Description,
        SearchField::AuthorFamilyname,
        SearchField::AuthorGivenname,
        SearchField::Author,
        SearchField::AuthorOrganization,
        SearchField::CollectionTitle,
        SearchField::CollectionDescription,
        SearchField::CollectionAuthor,
        SearchField::CollectionAuthorOrganisation,
        SearchField::Family,
        SearchField::Given,
        SearchField::Organization,
        SearchField::Created,
        SearchField::Modified,
        SearchField::Creator,
        SearchField::Collaborator,
        SearchField::Read,
        SearchField::Filetype,
        SearchField::Role,
        SearchField::License,
        SearchField::Status,
        SearchField::Pid,
        SearchField::InfoLabel,
        SearchField::InfoText,
        SearchField::InfoUrl,
        SearchField::Email,
        SearchField::Index,
        SearchField::Id,
        SearchField::Completename,
        SearchField::Creatorid,
        SearchField::Editor,
        SearchField::Filesize,
        SearchField::Fileextension,
        SearchField::Md,
        SearchField::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::All => "all",
            SearchField::Fulltext => "fulltext",
            SearchField::Checksum => "checksum",
            SearchField::Col => "col",
            SearchField::Collection => "collection",
            SearchField::CollectionId => "collectionid",
            SearchField::Title => "title",
            SearchField::Filename => "filename",
            SearchField::Description => "description",
            SearchField::AuthorFamilyname => "author_familyname",
            SearchField::AuthorGivenname => "author_givenname",
            SearchField::Author => "author",
            SearchField::AuthorOrganization => "author_organization",
            SearchField::CollectionTitle => "collection_title",
            SearchField::CollectionDescription => "collection_description",
            SearchField::CollectionAuthor => "collection_author",
            SearchField::CollectionAuthorOrganisation => "collection_author_organisation",
            SearchField::Family => "family",
            SearchField::Given => "given",
            SearchField::Organization => "organization",
            SearchField::Created => "created",
            SearchField::Modified => "modified",
            SearchField::Creator => "creator",
            SearchField::Collaborator => "collaborator",
            SearchField::Read => "read",
            SearchField::Filetype => "filetype",
            SearchField::Role => "role",
            SearchField::License => "license",
            SearchField::Status => "status",
            SearchField::Pid => "pid",
            SearchField::InfoLabel => "info_label",
            SearchField::InfoText => "info_text",
            SearchField::InfoUrl => "info_url",
            SearchField::Email => "email",
            SearchField::Index => "index",
            SearchField::Id => "id",
            SearchField::Completename => "completename",
            SearchField::Creatorid => "creatorid",
            SearchField::Editor => "editor",
            SearchField::Filesize => "filesize",
            SearchField::Fileextension => "fileextension",
            SearchField::Md => "md",
            SearchField::Technical => "technical",
        }
    }

    /// Fields that exist for sorting or for parametrized predicates only.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            SearchField::Completename
                | SearchField::Creatorid
                | SearchField::Editor
                | SearchField::Filesize
                | SearchField::Fileextension
                | SearchField::Md
                | SearchField::Technical
        )
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// Encoding of a profile-defined metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSubfield {
    Exact,
    Text,
    Placename,
    Title,
    Number,
    Date,
    Time,
    Url,
    Familyname,
    Givenname,
    Coordinates,
}

impl MetadataSubfield {
    pub const ALL: [MetadataSubfield; 11] = [
        MetadataSubfield::Exact,
        MetadataSubfield::Text,
        MetadataSubfield::Placename,
        MetadataSubfield::Title,
        MetadataSubfield::Number,
        MetadataSubfield::Date,
        MetadataSubfield::Time,
        MetadataSubfield::Url,
        MetadataSubfield::Familyname,
        MetadataSubfield::Givenname,
        MetadataSubfield::Coordinates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataSubfield::Exact => "exact",
            MetadataSubfield::Text => "text",
            MetadataSubfield::Placename => "placename",
            MetadataSubfield::Title => "title",
            MetadataSubfield::Number => "number",
            MetadataSubfield::Date => "date",
            MetadataSubfield::Time => "time",
            MetadataSubfield::Url => "url",
            MetadataSubfield::Familyname => "familyname",
            MetadataSubfield::Givenname => "givenname",
            MetadataSubfield::Coordinates => "coordinates",
        }
    }
}

impl fmt::Display for MetadataSubfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataSubfield {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetadataSubfield::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::UnknownSubfield(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_parses_from_its_index_name() {
        for field in SearchField::ALL {
            assert_eq!(field.as_str().parse::<SearchField>().unwrap(), field);
        }
    }

    #[test]
    fn serde_names_match_index_names() {
        for field in SearchField::ALL {
            let json = serde_json::to_value(field).unwrap();
            assert_eq!(json, serde_json::Value::String(field.as_str().into()));
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            "colour".parse::<SearchField>(),
            Err(Error::UnknownField(f)) if f == "colour"
        ));
    }

    #[test]
    fn subfields_parse() {
        for sub in MetadataSubfield::ALL {
            assert_eq!(sub.as_str().parse::<MetadataSubfield>().unwrap(), sub);
        }
        assert!("geo".parse::<MetadataSubfield>().is_err());
    }
}
