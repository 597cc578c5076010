use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

// `{file}:{line}:{column}: warning: {message}`
static RE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?):([0-9]+):([0-9]+):[ \t]+warning:[ \t]+(.*)$").unwrap()
});

/// One warning line as printed by the tool, positions still 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportLine {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ReportLine {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = RE_LINE.captures(text)?;
        let line = caps[2].parse().ok()?;
        let column = caps[3].parse().ok()?;
        Some(Self {
            file: PathBuf::from(&caps[1]),
            line,
            column,
            message: caps[4].to_owned(),
        })
    }

    /// Zero-based `(line, column)`.
    pub fn position(&self) -> (u32, u32) {
        (self.line.saturating_sub(1), self.column.saturating_sub(1))
    }
}
