use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    line::ReportLine,
    severity::{Level, SeverityMapping},
};

// `[severity][report type][MISRA id]`
static RE_REPORT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\]]*\]\[([^\]]+)\]\[MISRA[ \t]+[^\]]+\]").unwrap()
});

/// A finding in the analyzed file, positions 0-based.
///
/// The range it covers is the single character at `column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Issue {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub level: Level,
}

/// Turns captured tool output into issues for one analyzed file.
#[derive(Debug, Clone)]
pub struct ReportParser {
    cwd: PathBuf,
    target: PathBuf,
    report_type: String,
    mapping: SeverityMapping,
}

impl ReportParser {
    /// `cwd` is the directory the tool ran in; relative paths in its output
    /// are resolved against it, as is `target`.
    pub fn new(
        cwd: impl Into<PathBuf>,
        target: &Path,
        report_type: impl Into<String>,
        mapping: SeverityMapping,
    ) -> Self {
        let cwd = cwd.into();
        let target = resolve(&cwd, target);
        Self { cwd, target, report_type: report_type.into(), mapping }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn parse<'a>(
        &'a self,
        output: &'a str,
    ) -> impl Iterator<Item = Issue> + 'a {
        output.lines().filter_map(|line| self.parse_line(line))
    }

    pub fn parse_line(&self, text: &str) -> Option<Issue> {
        let line = ReportLine::parse(text)?;
        let file = resolve(&self.cwd, &line.file);
        if file != self.target {
            return None;
        }
        let (row, column) = line.position();
        let level = self.mapping.severity(&line.message);
        Some(Issue {
            file,
            line: row,
            column,
            message: tag_report_type(&line.message, &self.report_type),
            level,
        })
    }
}

/// Inserts `[report_type]` before `[MISRA ...]` unless the message already
/// names one.
pub fn tag_report_type(message: &str, report_type: &str) -> String {
    if RE_REPORT_TYPE.is_match(message) {
        return message.to_owned();
    }
    message.replacen("][MISRA ", &format!("][{}][MISRA ", report_type), 1)
}

/// Absolute form of `path`, with `.` and `..` folded without touching the
/// filesystem.
pub fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = cwd.join(path);
        &joined
    };

    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                resolved.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => match resolved.components().next_back() {
                Some(Component::Normal(_)) => {
                    resolved.pop();
                }
                Some(Component::Prefix(_) | Component::RootDir) => {}
                _ => resolved.push(".."),
            },
            Component::Normal(part) => resolved.push(part),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ReportParser {
        ReportParser::new(
            "/work",
            Path::new("/work/src/main.c"),
            "misra-c-2012",
            SeverityMapping::default(),
        )
    }

    #[test]
    fn mandatory_issue() {
        let issue = parser()
            .parse_line(
                "/work/src/main.c:3:7: warning: [Mandatory][MISRA 9.1] uninit",
            )
            .unwrap();
        assert_eq!(issue.level, Level::Error);
        assert_eq!((issue.line, issue.column), (2, 6));
    }

    #[test]
    fn required_issue() {
        let parser = ReportParser::new(
            "/work",
            Path::new("src/main.c"),
            "misra-c-2012",
            SeverityMapping::from_names("error", "hint", "hint"),
        );
        let issue = parser
            .parse_line("src/main.c:10:5: warning: [Required][MISRA 1.2] msg")
            .unwrap();
        assert_eq!(issue.file, PathBuf::from("/work/src/main.c"));
        assert_eq!((issue.line, issue.column), (9, 4));
        assert_eq!(issue.level, Level::Hint);
        assert_eq!(issue.message, "[Required][misra-c-2012][MISRA 1.2] msg");
    }

    #[test]
    fn other_files_are_dropped() {
        let parser = parser();
        assert!(parser
            .parse_line("/work/src/util.h:1:1: warning: [Required] x")
            .is_none());
        assert!(parser
            .parse_line("/other/src/main.c:1:1: warning: [Required] x")
            .is_none());
        assert!(parser
            .parse_line("./src/../src/main.c:1:1: warning: [Required] x")
            .is_some());
    }

    #[test]
    fn unmarked_messages() {
        let parser = ReportParser::new(
            "/work",
            Path::new("/work/a.c"),
            "misra-c-2012",
            SeverityMapping::from_names("hint", "hint", "hint"),
        );
        let issue = parser
            .parse_line("a.c:1:1: warning: [style][MISRA 2.7] unused param")
            .unwrap();
        assert_eq!(issue.level, Level::Warning);
    }

    #[test]
    fn whole_output() {
        let output = "Checking /work/src/main.c ...\r\n\
            /work/src/main.c:1:1: warning: [Advisory][MISRA 2.5] a\r\n\
            /work/src/main.c:2:1: error: not a warning line\r\n\
            /work/inc/main.h:4:2: warning: [Required][MISRA 8.4] b\r\n\
            main.c:5:3: warning: [Required][MISRA 8.4] c\n\
            src/main.c:6:3: warning: [Required][MISRA 10.1] d\n";
        let issues: Vec<_> = parser().parse(output).collect();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].level, Level::Information);
        assert_eq!(issues[0].message, "[Advisory][misra-c-2012][MISRA 2.5] a");
        assert_eq!((issues[1].line, issues[1].column), (5, 2));
    }

    #[test]
    fn empty_output() {
        assert_eq!(parser().parse("").count(), 0);
    }

    #[test]
    fn existing_report_type_kept() {
        let message = "[style][misra-cpp-2023][MISRA 0.1.2] x";
        assert_eq!(tag_report_type(message, "misra-c-2012"), message);
        assert_eq!(
            tag_report_type("[style][MISRA 0.1.2] x [a][MISRA b]", "t"),
            "[style][t][MISRA 0.1.2] x [a][MISRA b]"
        );
        assert_eq!(tag_report_type("no tags", "t"), "no tags");
    }

    #[test]
    fn resolve_paths() {
        let cwd = Path::new("/work/proj");
        assert_eq!(resolve(cwd, Path::new("a.c")), Path::new("/work/proj/a.c"));
        assert_eq!(resolve(cwd, Path::new("../b/./c.c")), Path::new("/work/b/c.c"));
        assert_eq!(resolve(cwd, Path::new("/x/y/../z.c")), Path::new("/x/z.c"));
        assert_eq!(resolve(cwd, Path::new("/../../a.c")), Path::new("/a.c"));
    }
}
