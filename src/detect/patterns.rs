//! Compiled patterns for the query and declaration matchers.
//!
//! The table alternation is built from the registry, so the patterns are
//! compiled once per registry rather than held as statics.

use lazy_static::lazy_static;
use regex::Regex;

use crate::registry::Registry;

lazy_static! {
    /// Separators between entries of a SELECT list
    pub static ref SELECT_LIST_SEPARATOR: Regex = Regex::new(r"[,\s]+").unwrap();
}

/// Pre-compiled patterns for one registry.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// `SELECT <select_part> FROM <table>`, lazy up to the first watched table
    pub statement_head: Regex,
    /// Statement-start keyword, bounds the remainder of a statement
    pub select_keyword: Regex,
    /// `TABLE-FIELD`
    pub qualified: Regex,
    /// `TYPE|LIKE TABLE-FIELD`
    pub declaration_qualified: Regex,
    /// `TYPE|LIKE IDENTIFIER`
    pub declaration_element: Regex,
}

impl Patterns {
    /// Compile the patterns for the tables of `registry`.
    pub fn compile(registry: &Registry) -> Result<Self, regex::Error> {
        let tables = registry
            .tables()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            statement_head: Regex::new(&format!(
                r"(?is)\bSELECT\b(?P<select_part>.*?)\bFROM\b\s+(?P<table>{})\b",
                tables
            ))?,
            select_keyword: Regex::new(r"(?i)\bSELECT\b")?,
            qualified: Regex::new(&format!(
                r"(?i)\b(?P<table>{})-(?P<field>[A-Z0-9_]+)\b",
                tables
            ))?,
            declaration_qualified: Regex::new(&format!(
                r"(?i)\b(?:TYPE|LIKE)\b\s+(?P<table>{})-(?P<field>[A-Z0-9_]+)",
                tables
            ))?,
            declaration_element: Regex::new(r"(?i)\b(?:TYPE|LIKE)\b\s+(?P<name>[A-Z0-9_]+)\b")?,
        })
    }
}
