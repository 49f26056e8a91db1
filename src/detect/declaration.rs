//! Obsolete field usage in `TYPE` / `LIKE` declarations.
//!
//! Two independent passes over the text: `TYPE marc-megru` style references
//! with an explicit table, then `TYPE megru` style data elements matched
//! against every watched table's fields. Both passes may report the same
//! location; results are not deduplicated.

use super::patterns::Patterns;
use super::{CharIndex, Finding, FindingSource};
use crate::registry::Registry;
use crate::remediate::{todo_comment, todo_comment_data_element};

/// Scan `text` for declarations referencing obsolete fields.
pub fn scan_declarations(text: &str, registry: &Registry, patterns: &Patterns) -> Vec<Finding> {
    let index = CharIndex::new(text);
    let mut findings = scan_qualified_declarations(text, &index, registry, patterns);
    findings.extend(scan_data_elements(text, &index, registry, patterns));
    findings
}

fn scan_qualified_declarations(
    text: &str,
    index: &CharIndex,
    registry: &Registry,
    patterns: &Patterns,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for caps in patterns.declaration_qualified.captures_iter(text) {
        let (Some(table_match), Some(field_match)) = (caps.name("table"), caps.name("field"))
        else {
            continue;
        };
        let table = table_match.as_str().to_uppercase();
        let field = field_match.as_str().to_uppercase();

        if registry.is_obsolete(&table, &field) {
            findings.push(Finding {
                suggested_statement: todo_comment(registry.note(), &table, &field),
                table: Some(table),
                field,
                span: index.span(table_match.start(), field_match.end()),
                source: FindingSource::Declaration,
            });
        }
    }

    findings
}

/// Data-element findings span the whole `TYPE|LIKE name` match.
fn scan_data_elements(
    text: &str,
    index: &CharIndex,
    registry: &Registry,
    patterns: &Patterns,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for caps in patterns.declaration_element.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
            continue;
        };
        let field = name.as_str().to_uppercase();

        if registry.is_obsolete_field_name(&field) {
            findings.push(Finding {
                table: None,
                suggested_statement: todo_comment_data_element(registry.note(), &field),
                field,
                span: index.span(whole.start(), whole.end()),
                source: FindingSource::DataElement,
            });
        }
    }

    findings
}
