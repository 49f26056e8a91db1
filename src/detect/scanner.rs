//! Scanner that runs the query and declaration matchers.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, RegistryConfig};
use crate::registry::Registry;

use super::patterns::Patterns;
use super::{
    scan_declarations, scan_queries, FileFindings, Finding, LineIndex, LocatedFinding, ScanReport,
};

static DEFAULT_SCANNER: Lazy<Scanner> = Lazy::new(|| {
    Scanner::new(Registry::builtin().clone()).expect("built-in patterns must compile")
});

/// The scanner for the built-in registry.
pub fn default_scanner() -> &'static Scanner {
    &DEFAULT_SCANNER
}

/// Immutable registry plus its compiled patterns.
///
/// Holds no mutable state, so one instance can serve concurrent scans.
#[derive(Debug, Clone)]
pub struct Scanner {
    registry: Registry,
    patterns: Patterns,
}

impl Scanner {
    /// Create a scanner for the given registry.
    pub fn new(registry: Registry) -> Result<Self, ConfigError> {
        let patterns = Patterns::compile(&registry)?;
        Ok(Self { registry, patterns })
    }

    /// Create a scanner from a configuration.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        Self::new(Registry::from_config(config)?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Findings from SELECT statements, in statement order.
    pub fn scan_queries(&self, text: &str) -> Vec<Finding> {
        scan_queries(text, &self.registry, &self.patterns)
    }

    /// Findings from declarations, qualified ones first.
    pub fn scan_declarations(&self, text: &str) -> Vec<Finding> {
        scan_declarations(text, &self.registry, &self.patterns)
    }

    /// All findings: query findings followed by declaration findings.
    pub fn scan(&self, text: &str) -> Vec<Finding> {
        let mut findings = self.scan_queries(text);
        findings.extend(self.scan_declarations(text));
        findings
    }

    /// Scan a single file, attaching line and column to each finding.
    pub fn scan_file(&self, path: &Path) -> anyhow::Result<FileFindings> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let index = LineIndex::new(&text);

        let findings = self
            .scan(&text)
            .into_iter()
            .map(|finding| {
                let (line, column) = index.locate(finding.span.start);
                LocatedFinding {
                    finding,
                    line,
                    column,
                }
            })
            .collect();

        Ok(FileFindings {
            file: path.to_string_lossy().to_string(),
            findings,
        })
    }

    /// Scan files in parallel. The report keeps the order of `files`.
    pub fn scan_files(&self, files: &[PathBuf]) -> anyhow::Result<ScanReport> {
        let files = files
            .par_iter()
            .map(|file| self.scan_file(file))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ScanReport {
            scanned: files.len(),
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::FindingSource;
    use tempfile::TempDir;

    #[test]
    fn test_scan_orders_queries_before_declarations() {
        let text = "DATA lv TYPE mard-diskz.\nSELECT megru FROM marc.\nDATA lv2 TYPE fhori.";
        let sources: Vec<_> = default_scanner()
            .scan(text)
            .into_iter()
            .map(|f| f.source)
            .collect();

        assert_eq!(
            sources,
            vec![
                FindingSource::SelectListUnqualified,
                FindingSource::Declaration,
                FindingSource::DataElement,
            ]
        );
    }

    #[test]
    fn test_scan_is_deterministic() {
        let text = "SELECT marc-megru usequ FROM marc WHERE marc-altsl = 1.\nDATA x TYPE lminb.";
        let scanner = default_scanner();
        assert_eq!(scanner.scan(text), scanner.scan(text));
    }

    #[test]
    fn test_custom_registry() {
        let config = RegistryConfig::parse_str(
            "note: Note 42\ntables:\n  - name: mara\n    fields: [zzold]\n",
        )
        .unwrap();
        let scanner = Scanner::from_config(&config).unwrap();

        let findings = scanner.scan("SELECT zzold FROM mara.\nSELECT megru FROM marc.");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].qualified_name(), "MARA-ZZOLD");
        assert!(findings[0].suggested_statement.contains("(Note 42)"));
    }

    #[test]
    fn test_scan_files_locates_findings() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("zreport.abap");
        let second = temp.path().join("zclean.abap");
        std::fs::write(
            &first,
            "REPORT zreport.\n\nDATA: lv_flag TYPE marc-megru.\n",
        )
        .unwrap();
        std::fs::write(&second, "REPORT zclean.\nWRITE 'hello'.\n").unwrap();

        let report = default_scanner()
            .scan_files(&[first.clone(), second])
            .unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.finding_count(), 1);
        assert_eq!(report.files[0].file, first.to_string_lossy());
        let located = &report.files[0].findings[0];
        assert_eq!((located.line, located.column), (3, 20));
        assert!(report.files[1].findings.is_empty());
    }
}
