use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
};

use crate::{config::Settings, helper::Language};

/// A fully assembled tool invocation. Option values are passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Invocation {
    pub(crate) program: String,
    pub(crate) args: Vec<OsString>,
    pub(crate) cwd: PathBuf,
    pub(crate) report_type: String,
}

impl Invocation {
    pub(crate) fn build(
        file: &Path,
        language: Language,
        settings: &Settings,
        cwd: PathBuf,
    ) -> Self {
        let report_type = settings.report_type(language).to_owned();

        let mut args: Vec<OsString> = vec![
            format!("--std={}", settings.std(language)).into(),
            format!("--platform={}", settings.platform).into(),
            format!("--enable={}", settings.enable).into(),
            "--inconclusive".into(),
        ];
        if settings.force {
            args.push("--force".into());
        }
        if settings.safety {
            args.push("--safety".into());
        }
        args.push(format!("--check-level={}", settings.check_level).into());
        args.push(format!("--max-configs={}", settings.max_configs).into());
        args.push("-j".into());
        args.push(settings.jobs.to_string().into());
        args.push(format!("--report-type={}", report_type).into());
        if settings.suppress_missing_include_system {
            args.push("--suppress=missingIncludeSystem".into());
        }
        args.push(format!("--template={}", misra_report::TEMPLATE).into());
        args.push(file.as_os_str().to_owned());

        Self { program: settings.cppcheck_path.clone(), args, cwd, report_type }
    }
}

/// Shell-like rendering for the output log.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"')
    {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_owned()
    }
}
