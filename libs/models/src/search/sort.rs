//! Sort criteria

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

use super::fields::SearchField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort by one field. Any field may be named; fields without a sort
/// attribute fall back to the default order when compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: SearchField,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortCriterion {
    pub fn new(field: SearchField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn asc(field: SearchField) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: SearchField) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// `<field>[:asc|:desc]`, e.g. `created:desc`.
impl FromStr for SortCriterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = match s.trim().split_once(':') {
            Some((field, order)) => (field, Some(order)),
            None => (s.trim(), None),
        };
        let field: SearchField = field
            .parse()
            .map_err(|_| Error::UnknownSortField(field.to_string()))?;
        let order = match order.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(_) => return Err(Error::UnknownSortField(s.to_string())),
        };
        Ok(Self::new(field, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sort_criteria() {
        assert_eq!(
            "created:desc".parse::<SortCriterion>().unwrap(),
            SortCriterion::desc(SearchField::Created)
        );
        assert_eq!(
            "title".parse::<SortCriterion>().unwrap(),
            SortCriterion::asc(SearchField::Title)
        );
        assert!("shoe_size:asc".parse::<SortCriterion>().is_err());
        assert!("title:sideways".parse::<SortCriterion>().is_err());
    }
}
