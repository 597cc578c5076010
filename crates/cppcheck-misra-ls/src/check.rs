//! One-shot analysis from the command line.

use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{Diagnostic, Url};

use crate::{
    analysis::{Analyzer, Outcome, Surface, Target},
    cli::CliError,
    config::Configuration,
    helper::{file_path, Language},
    runner::ProcessRunner,
    view,
};

/// Diagnostics to stdout, everything else to stderr.
struct Console {
    verbose: bool,
}

#[tower_lsp::async_trait]
impl Surface for Console {
    async fn log(&self, message: String) {
        if self.verbose {
            eprintln!("{}", message.trim_end());
        }
    }

    async fn status(&self, message: String) {
        eprintln!("{}", message);
    }

    async fn warning(&self, message: String) {
        eprintln!("warning: {}", message);
    }

    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        let path = file_path(&uri).unwrap_or_else(|| PathBuf::from(uri.path()));
        for diagnostic in &diagnostics {
            println!("{}", view::plain(&path, diagnostic));
        }
    }
}

pub(crate) fn load_configuration(
    path: Option<&Path>,
) -> Result<Configuration, CliError> {
    let path = match path {
        Some(path) => path,
        None => return Ok(Configuration::default()),
    };
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the number of issues found.
pub(crate) async fn run(
    file: &Path,
    settings: Option<&Path>,
    language: Option<Language>,
    verbose: bool,
) -> Result<usize, CliError> {
    let configuration = load_configuration(settings)?;
    let cwd = std::env::current_dir()?;
    let path = misra_report::resolve(&cwd, file);
    let uri = Url::from_file_path(&path)
        .map_err(|_| CliError::NotAFile(path.clone()))?;
    let language = language
        .or_else(|| Language::from_path(&path))
        .ok_or_else(|| CliError::UnknownLanguage(path.clone()))?;

    let analyzer = Analyzer::new(ProcessRunner, Console { verbose });
    let target = Target { uri, path, language };
    let outcome = analyzer
        .analyze(target, &configuration.cppcheck_misra, &[cwd])
        .await;
    Ok(match outcome {
        Outcome::Published(count) => count,
        Outcome::Superseded => 0,
    })
}
