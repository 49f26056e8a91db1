//! Fieldscan - obsolete MARC/MARD field detection for ABAP.
//!
//! Finds uses of the material-master fields that SAP Note 2267246 retires
//! in S/4HANA and suggests a TODO comment for each one. Matching is lexical:
//! ABAP text is scanned with regular expressions, no syntax tree is built.
//!
//! # Architecture
//!
//! - `registry`: watched tables and their obsolete fields
//! - `detect`: query and declaration matchers, `Scanner`
//! - `remediate`: caller-facing finding records and batch remediation
//! - `config`: YAML registry configuration
//! - `report`: file scan output (pretty, JSON)
//! - `server`: HTTP remediation endpoint
//! - `cli`: command-line entry points
//!
//! # Example
//!
//! ```
//! let findings = fieldscan::scan("SELECT marc-megru FROM marc.");
//! assert_eq!(findings[0].field, "MEGRU");
//! assert_eq!((findings[0].span.start, findings[0].span.end), (7, 17));
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod registry;
pub mod remediate;
pub mod report;
pub mod server;

pub use config::{ConfigError, RegistryConfig};
pub use detect::{default_scanner, Finding, FindingSource, Scanner, Span};
pub use registry::Registry;
pub use remediate::{remediate_units, RemediatedUnit, SelectMetadata, Unit};

/// Scan text with the built-in registry.
///
/// Query findings come first in statement order, then qualified
/// declarations, then data-element declarations.
pub fn scan(text: &str) -> Vec<Finding> {
    default_scanner().scan(text)
}
