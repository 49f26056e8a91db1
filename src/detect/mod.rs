//! Detection of obsolete field usage in ABAP source.

mod declaration;
mod patterns;
mod query;
mod scanner;
mod types;

pub use declaration::scan_declarations;
pub use patterns::Patterns;
pub use query::scan_queries;
pub use scanner::{default_scanner, Scanner};
pub use types::{
    CharIndex, FileFindings, Finding, FindingSource, LineIndex, LocatedFinding, ScanReport, Span,
};
