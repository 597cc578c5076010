//! Parsing of cppcheck's one-line MISRA warnings into issues with
//! severities derived from the rule's obligation tier.

mod line;
mod report;
mod severity;

pub use line::ReportLine;
pub use report::{resolve, tag_report_type, Issue, ReportParser};
pub use severity::{Level, Obligation, SeverityMapping};

/// Output template passed to the tool so every finding lands on one line.
pub const TEMPLATE: &str =
    "{file}:{line}:{column}: warning: [{severity}][MISRA {id}] {message}";
