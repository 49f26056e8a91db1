//! Core types for scan results.

use serde::{Deserialize, Serialize};

/// Half-open character offset range into the scanned text.
///
/// Offsets count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Converts byte offsets of one text into character offsets.
///
/// Only multi-byte characters are recorded.
pub struct CharIndex {
    /// Byte offset of each multi-byte char and the continuation bytes seen
    /// up to and including it
    wide: Vec<(usize, usize)>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let mut extra = 0;
        let wide = text
            .char_indices()
            .filter_map(|(i, ch)| {
                let width = ch.len_utf8();
                (width > 1).then(|| {
                    extra += width - 1;
                    (i, extra)
                })
            })
            .collect();
        Self { wide }
    }

    /// Character offset of a byte offset on a char boundary.
    pub fn char_offset(&self, byte: usize) -> usize {
        match self.wide.partition_point(|&(i, _)| i < byte) {
            0 => byte,
            n => byte - self.wide[n - 1].1,
        }
    }

    /// Character span of a byte range.
    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.char_offset(start), self.char_offset(end))
    }
}

/// Which matcher produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingSource {
    /// `TABLE-FIELD` in a SELECT list
    #[serde(rename = "select_list")]
    SelectList,
    /// Bare field name in a SELECT list, anchored at the statement
    #[serde(rename = "select_list_unqualified")]
    SelectListUnqualified,
    /// `TABLE-FIELD` in WHERE/JOIN/other clauses of a SELECT
    #[serde(rename = "query_clause")]
    QueryClause,
    /// `TYPE|LIKE TABLE-FIELD`
    #[serde(rename = "declaration")]
    Declaration,
    /// `TYPE|LIKE FIELD` data element
    #[serde(rename = "data_element")]
    DataElement,
}

impl FindingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSource::SelectList => "select_list",
            FindingSource::SelectListUnqualified => "select_list_unqualified",
            FindingSource::QueryClause => "query_clause",
            FindingSource::Declaration => "declaration",
            FindingSource::DataElement => "data_element",
        }
    }
}

impl std::fmt::Display for FindingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One occurrence of an obsolete field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Table, absent for data-element matches
    pub table: Option<String>,
    pub field: String,
    pub span: Span,
    pub suggested_statement: String,
    pub source: FindingSource,
}

impl Finding {
    /// `TABLE-FIELD` when the table is known, `FIELD` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}-{}", table, self.field),
            None => self.field.clone(),
        }
    }
}

/// Maps character offsets to 1-based line and column numbers.
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Line and column of a character offset.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

/// Findings for one scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFindings {
    pub file: String,
    pub findings: Vec<LocatedFinding>,
}

/// A finding with its line and column in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedFinding {
    #[serde(flatten)]
    pub finding: Finding,
    pub line: usize,
    pub column: usize,
}

/// Results of scanning a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub files: Vec<FileFindings>,
    /// Number of files scanned
    pub scanned: usize,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of findings across files.
    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    pub fn has_findings(&self) -> bool {
        self.files.iter().any(|f| !f.findings.is_empty())
    }
}
