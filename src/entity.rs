//! Entity kinds and entity codes found in seed files.
//!
//! An entity code is a short `<LETTERS>-<digits>` token such as `A-1`, `P-16`
//! or `R-7`. Seed files carry them in comment lines (`-- A-1: Water`) and,
//! once annotated, as the leading `code` column of INSERT statements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regex fragment matching a bare entity code.
pub const CODE_PATTERN: &str = r"[A-Z]+-\d+";

/// The three kinds of rows that carry entity codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Preparation,
    Recipe,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Product,
        EntityKind::Preparation,
        EntityKind::Recipe,
    ];

    /// Table the kind is inserted into
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Preparation => "preparations",
            EntityKind::Recipe => "recipes",
        }
    }

    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.table() == table)
    }

    /// Plural label used in console summaries
    pub fn label(&self) -> &'static str {
        self.table()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Product => write!(f, "product"),
            EntityKind::Preparation => write!(f, "preparation"),
            EntityKind::Recipe => write!(f, "recipe"),
        }
    }
}

/// A parsed entity code (`prefix-number`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityCode {
    prefix: String,
    raw: String,
}

impl EntityCode {
    /// The code exactly as written in the source text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Kind implied by the prefix family: `P` preparations, `R` recipes,
    /// everything else products.
    pub fn kind(&self) -> EntityKind {
        match self.prefix.as_str() {
            "P" => EntityKind::Preparation,
            "R" => EntityKind::Recipe,
            _ => EntityKind::Product,
        }
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Error returned when a token is not an entity code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCode(pub String);

impl fmt::Display for InvalidCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not an entity code: '{}'", self.0)
    }
}

impl std::error::Error for InvalidCode {}

impl FromStr for EntityCode {
    type Err = InvalidCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidCode(s.to_string());
        let (prefix, digits) = s.split_once('-').ok_or_else(invalid)?;

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid());
        }
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(EntityCode {
            prefix: prefix.to_string(),
            raw: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_code() {
        let code: EntityCode = "V-25".parse().unwrap();
        assert_eq!(code.kind(), EntityKind::Product);
        assert_eq!(code.to_string(), "V-25");
    }

    #[test]
    fn test_prefix_families() {
        assert_eq!("P-16".parse::<EntityCode>().unwrap().kind(), EntityKind::Preparation);
        assert_eq!("R-7".parse::<EntityCode>().unwrap().kind(), EntityKind::Recipe);
        assert_eq!("PR-2".parse::<EntityCode>().unwrap().kind(), EntityKind::Product);
    }

    #[test]
    fn test_leading_zeros_keep_raw_text() {
        let code: EntityCode = "R-07".parse().unwrap();
        assert_eq!(code.as_str(), "R-07");
    }

    #[test]
    fn test_digit_run_has_no_width_limit() {
        let code: EntityCode = "A-99999999999999999999".parse().unwrap();
        assert_eq!(code.as_str(), "A-99999999999999999999");
        assert_eq!(code.kind(), EntityKind::Product);
    }

    #[test]
    fn test_rejects_malformed_codes() {
        for bad in ["", "A1", "a-1", "A-", "-1", "A-1x", "R-seven"] {
            assert!(bad.parse::<EntityCode>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_kind_tables() {
        assert_eq!(EntityKind::from_table("recipes"), Some(EntityKind::Recipe));
        assert_eq!(EntityKind::from_table("recipe_components"), None);
        assert_eq!(EntityKind::Preparation.table(), "preparations");
    }
}
