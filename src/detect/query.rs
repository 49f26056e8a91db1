//! Obsolete field usage in SELECT statements.
//!
//! Each statement is split into three zones: the SELECT list, the source
//! table, and the remainder up to the next `SELECT` or end of text. The
//! SELECT list is checked for `TABLE-FIELD` references and for bare field
//! names of the source table; the remainder only for `TABLE-FIELD`.

use regex::Captures;

use super::patterns::{Patterns, SELECT_LIST_SEPARATOR};
use super::{CharIndex, Finding, FindingSource};
use crate::registry::Registry;
use crate::remediate::todo_comment;

/// Byte ranges of one matched statement.
struct Statement {
    start: usize,
    end: usize,
    select_list: (usize, usize),
    table: String,
    remainder: (usize, usize),
}

/// Scan `text` for SELECT statements touching obsolete fields.
pub fn scan_queries(text: &str, registry: &Registry, patterns: &Patterns) -> Vec<Finding> {
    let mut findings = Vec::new();
    let index = CharIndex::new(text);

    for stmt in statements(text, patterns) {
        let (list_start, list_end) = stmt.select_list;
        scan_qualified(
            text,
            &index,
            list_start,
            list_end,
            FindingSource::SelectList,
            registry,
            patterns,
            &mut findings,
        );

        for token in SELECT_LIST_SEPARATOR.split(text[list_start..list_end].trim()) {
            let field = token.trim_end_matches('.').to_uppercase();
            if field.is_empty() || !registry.is_obsolete(&stmt.table, &field) {
                continue;
            }
            findings.push(Finding {
                table: Some(stmt.table.clone()),
                suggested_statement: todo_comment(registry.note(), &stmt.table, &field),
                field,
                span: index.span(stmt.start, stmt.end),
                source: FindingSource::SelectListUnqualified,
            });
        }

        let (rest_start, rest_end) = stmt.remainder;
        scan_qualified(
            text,
            &index,
            rest_start,
            rest_end,
            FindingSource::QueryClause,
            registry,
            patterns,
            &mut findings,
        );
    }

    findings
}

/// Collect `TABLE-FIELD` references within `text[start..end]`.
fn scan_qualified(
    text: &str,
    index: &CharIndex,
    start: usize,
    end: usize,
    source: FindingSource,
    registry: &Registry,
    patterns: &Patterns,
    findings: &mut Vec<Finding>,
) {
    for caps in patterns.qualified.captures_iter(&text[start..end]) {
        let Some((table, field, m_start, m_end)) = qualified_parts(&caps) else {
            continue;
        };
        if registry.is_obsolete(&table, &field) {
            findings.push(Finding {
                suggested_statement: todo_comment(registry.note(), &table, &field),
                table: Some(table),
                field,
                span: index.span(start + m_start, start + m_end),
                source,
            });
        }
    }
}

fn qualified_parts(caps: &Captures<'_>) -> Option<(String, String, usize, usize)> {
    let whole = caps.get(0)?;
    let table = caps.name("table")?.as_str().to_uppercase();
    let field = caps.name("field")?.as_str().to_uppercase();
    Some((table, field, whole.start(), whole.end()))
}

/// Iterate the statements of `text` that read from a watched table.
fn statements<'a>(text: &'a str, patterns: &'a Patterns) -> impl Iterator<Item = Statement> + 'a {
    let mut pos = 0;

    std::iter::from_fn(move || loop {
        let caps = patterns.statement_head.captures_at(text, pos)?;
        let head = caps.get(0)?;
        let select_list = caps.name("select_part")?;
        let table = caps.name("table")?;

        // The SELECT list must not run into another statement.
        let keyword_end = patterns
            .select_keyword
            .find_at(text, head.start())
            .map_or(head.start(), |m| m.end());
        if let Some(inner) = patterns.select_keyword.find_at(text, keyword_end) {
            if inner.start() < select_list.end() {
                pos = inner.start();
                continue;
            }
        }

        let end = statement_end(text, head.end(), patterns);
        pos = end;

        return Some(Statement {
            start: head.start(),
            end,
            select_list: (select_list.start(), select_list.end()),
            table: table.as_str().to_uppercase(),
            remainder: (head.end(), end),
        });
    })
}

/// End of the statement whose head ends at `from`: the next `SELECT`, or the
/// end of text not counting a single trailing newline.
fn statement_end(text: &str, from: usize, patterns: &Patterns) -> usize {
    let eof = match text.strip_suffix('\n') {
        Some(stripped) if stripped.len() >= from => stripped.len(),
        _ => text.len(),
    };

    match patterns.select_keyword.find_at(text, from) {
        Some(next) if next.start() < eof => next.start(),
        _ => eof,
    }
}
