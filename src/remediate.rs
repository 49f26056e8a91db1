//! Remediation output for batches of input units.
//!
//! A unit is one block of ABAP source with caller-defined identity fields.
//! Remediating a unit scans its code and attaches the findings as `selects`,
//! leaving every other field as it came in.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::detect::{Finding, Scanner};

/// Comment suggested for a `TABLE-FIELD` usage.
pub fn todo_comment(note: &str, table: &str, field: &str) -> String {
    format!(
        "* TODO: {}-{} is obsolete in S/4HANA ({}). \
         The related functionality is no longer available; remove or replace usage.",
        table.to_uppercase(),
        field.to_uppercase(),
        note
    )
}

/// Comment suggested for a data element named like an obsolete field.
pub fn todo_comment_data_element(note: &str, field: &str) -> String {
    format!(
        "* TODO: Data element {} relates to obsolete field in S/4HANA ({}). \
         Remove or replace usage.",
        field.to_uppercase(),
        note
    )
}

/// One block of source to scan.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Unit {
    pub pgm_name: String,
    pub inc_name: String,
    #[serde(rename = "type")]
    pub unit_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_line: Option<i64>,
    #[serde(default)]
    pub end_line: Option<i64>,
    #[serde(default = "empty_code")]
    pub code: Option<String>,
}

fn empty_code() -> Option<String> {
    Some(String::new())
}

impl Unit {
    /// Source text, empty when the unit carries none.
    pub fn source(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }
}

/// Caller-facing record for one finding.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectMetadata {
    pub table: Option<String>,
    pub field: String,
    pub target_type: Option<String>,
    pub target_name: Option<String>,
    pub start_char_in_unit: usize,
    pub end_char_in_unit: usize,
    pub used_fields: Vec<String>,
    pub ambiguous: bool,
    pub suggested_fields: Option<Vec<String>>,
    pub suggested_statement: String,
}

impl From<&Finding> for SelectMetadata {
    fn from(finding: &Finding) -> Self {
        // No resolution step fills target_*, suggested_fields or ambiguous.
        Self {
            table: finding.table.clone(),
            field: finding.field.clone(),
            target_type: None,
            target_name: None,
            start_char_in_unit: finding.span.start,
            end_char_in_unit: finding.span.end,
            used_fields: vec![finding.qualified_name()],
            ambiguous: false,
            suggested_fields: None,
            suggested_statement: finding.suggested_statement.clone(),
        }
    }
}

/// A unit with its findings attached.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemediatedUnit {
    #[serde(flatten)]
    pub unit: Unit,
    pub selects: Vec<SelectMetadata>,
}

/// Scan one unit: query findings first, then declaration findings.
pub fn remediate_unit(scanner: &Scanner, unit: Unit) -> RemediatedUnit {
    let source = unit.source();
    let selects = scanner
        .scan_queries(source)
        .iter()
        .chain(scanner.scan_declarations(source).iter())
        .map(SelectMetadata::from)
        .collect();

    RemediatedUnit { unit, selects }
}

/// Remediate a batch of units. Output order matches input order.
pub fn remediate_units(scanner: &Scanner, units: Vec<Unit>) -> Vec<RemediatedUnit> {
    units
        .into_par_iter()
        .map(|unit| remediate_unit(scanner, unit))
        .collect()
}
