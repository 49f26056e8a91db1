//! Output formatting for file scans.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{FileFindings, FindingSource, LocatedFinding, ScanReport};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub config: String,
    pub files_scanned: usize,
    pub finding_count: usize,
    pub findings: Vec<JsonFinding>,
}

/// One finding with its file location.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFinding {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub source: FindingSource,
    pub table: Option<String>,
    pub field: String,
    pub start_char: usize,
    pub end_char: usize,
    pub suggested_statement: String,
}

/// Build the JSON report for a scan.
pub fn json_report(path: &str, config: &str, report: &ScanReport) -> JsonReport {
    let findings = report
        .files
        .iter()
        .flat_map(|f| f.findings.iter().map(move |lf| finding_to_json(&f.file, lf)))
        .collect::<Vec<_>>();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config.to_string(),
        files_scanned: report.scanned,
        finding_count: findings.len(),
        findings,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, config: &str, report: &ScanReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, config, report))?;
    println!("{}", json);
    Ok(())
}

fn finding_to_json(file: &str, lf: &LocatedFinding) -> JsonFinding {
    JsonFinding {
        file: file.to_string(),
        line: lf.line,
        column: lf.column,
        source: lf.finding.source,
        table: lf.finding.table.clone(),
        field: lf.finding.field.clone(),
        start_char: lf.finding.span.start,
        end_char: lf.finding.span.end,
        suggested_statement: lf.finding.suggested_statement.clone(),
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config: &str, report: &ScanReport) {
    println!();
    print!("  ");
    print!("{}", "fieldscan".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Fields:   ".dimmed());
    println!("{}", config);
    println!();

    for file in report.files.iter().filter(|f| !f.findings.is_empty()) {
        write_file_findings(file);
        println!();
    }

    write_summary(report);
    println!();
}

fn write_file_findings(file: &FileFindings) {
    println!("  {} ({}):", file.file.blue().bold(), file.findings.len());
    println!();

    for lf in &file.findings {
        print!("    {} ", "OBSOLETE".yellow());
        print!("{:<26}", lf.finding.qualified_name().bold());
        print!("{:<26}", lf.finding.source.as_str().dimmed());
        println!("{}", format!("{}:{}", lf.line, lf.column).dimmed());
        println!("            {}", lf.finding.suggested_statement);
    }
}

fn write_summary(report: &ScanReport) {
    let count = report.finding_count();
    let affected = report.files.iter().filter(|f| !f.findings.is_empty()).count();

    if count == 0 {
        print!("  {}", "✓ CLEAN".green());
    } else {
        print!("  {}", "✗ OBSOLETE FIELDS".red());
    }

    println!(
        "  {} finding{} in {} of {} file{}",
        count,
        plural(count),
        affected,
        report.scanned,
        plural(report.scanned)
    );
}

fn plural(n: usize) -> &'static str {
    if n != 1 {
        "s"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Finding, Span};

    fn sample_report() -> ScanReport {
        ScanReport {
            files: vec![
                FileFindings {
                    file: "src/zprog.abap".to_string(),
                    findings: vec![LocatedFinding {
                        finding: Finding {
                            table: Some("MARC".to_string()),
                            field: "MEGRU".to_string(),
                            span: Span::new(7, 17),
                            suggested_statement: "* TODO".to_string(),
                            source: FindingSource::SelectList,
                        },
                        line: 1,
                        column: 8,
                    }],
                },
                FileFindings {
                    file: "src/zclean.abap".to_string(),
                    findings: vec![],
                },
            ],
            scanned: 2,
        }
    }

    #[test]
    fn test_json_report() {
        let report = json_report("src", "built-in", &sample_report());

        assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.finding_count, 1);
        assert_eq!(report.findings[0].file, "src/zprog.abap");
        assert_eq!(report.findings[0].start_char, 7);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["findings"][0]["source"], "select_list");
        assert_eq!(value["findings"][0]["table"], "MARC");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(0), "s");
        assert_eq!(plural(1), "");
        assert_eq!(plural(2), "s");
    }
}
