use std::path::Path;

use misra_report::{Issue, Level};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

pub(crate) const SOURCE: &str = "cppcheck-misra";

pub(crate) fn severity(level: Level) -> DiagnosticSeverity {
    match level {
        Level::Error => DiagnosticSeverity::ERROR,
        Level::Warning => DiagnosticSeverity::WARNING,
        Level::Information => DiagnosticSeverity::INFORMATION,
        Level::Hint => DiagnosticSeverity::HINT,
    }
}

pub(crate) fn diagnostic(issue: Issue) -> Diagnostic {
    let range = Range::new(
        Position::new(issue.line, issue.column),
        Position::new(issue.line, issue.column.saturating_add(1)),
    );
    Diagnostic::new(
        range,
        Some(severity(issue.level)),
        None,
        Some(SOURCE.into()),
        issue.message,
        None,
        None,
    )
}

/// Compiler-style line, positions back to 1-based.
pub(crate) fn plain(path: &Path, diagnostic: &Diagnostic) -> String {
    let level = match diagnostic.severity {
        Some(DiagnosticSeverity::ERROR) => Level::Error,
        Some(DiagnosticSeverity::INFORMATION) => Level::Information,
        Some(DiagnosticSeverity::HINT) => Level::Hint,
        _ => Level::Warning,
    };
    format!(
        "{}:{}:{}: {}: {}",
        path.display(),
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        level,
        diagnostic.message
    )
}
