use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use misra_report::ReportParser;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::{Diagnostic, MessageType, Url};
use tracing::{debug, warn};

use crate::{
    command::Invocation,
    config::Settings,
    helper::{document_language, file_path, working_dir, Language},
    runner::Runner,
    view,
};

/// Where results and progress go.
#[tower_lsp::async_trait]
pub(crate) trait Surface: Send + Sync + 'static {
    /// Raw output log.
    async fn log(&self, message: String);
    /// Transient summary.
    async fn status(&self, message: String);
    async fn warning(&self, message: String);
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>);
}

#[tower_lsp::async_trait]
impl Surface for tower_lsp::Client {
    async fn log(&self, message: String) {
        self.log_message(MessageType::INFO, message).await;
    }

    async fn status(&self, message: String) {
        self.show_message(MessageType::INFO, message).await;
    }

    async fn warning(&self, message: String) {
        self.show_message(MessageType::WARNING, message).await;
    }

    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        self.publish_diagnostics(uri, diagnostics, None).await;
    }
}

/// A C or C++ file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Target {
    pub(crate) uri: Url,
    pub(crate) path: PathBuf,
    pub(crate) language: Language,
}

impl Target {
    /// `None` for anything that is not a C/C++ file with a filesystem path.
    pub(crate) fn new(uri: Url, language_id: Option<&str>) -> Option<Self> {
        let path = file_path(&uri)?;
        let language = document_language(language_id, &path)?;
        Some(Self { uri, path, language })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Published(usize),
    /// A newer run for the same file started before this one finished.
    Superseded,
}

pub(crate) struct Analyzer<R, S> {
    runner: R,
    surface: S,
    diagnostics: DashMap<Url, Vec<Diagnostic>>,
    in_flight: DashMap<Url, u64>,
    next_token: AtomicU64,
    // token check, store update and publish happen under this lock
    publishing: Mutex<()>,
}

impl<R: Runner, S: Surface> Analyzer<R, S> {
    pub(crate) fn new(runner: R, surface: S) -> Self {
        Self {
            runner,
            surface,
            diagnostics: DashMap::new(),
            in_flight: DashMap::new(),
            next_token: AtomicU64::new(0),
            publishing: Mutex::new(()),
        }
    }

    pub(crate) fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    /// Last published non-empty set for `uri`.
    pub(crate) fn diagnostics(&self, uri: &Url) -> Option<Vec<Diagnostic>> {
        self.diagnostics.get(uri).map(|r| r.value().clone())
    }

    /// Save hook. Returns `None` when nothing was run.
    pub(crate) async fn on_save(
        &self,
        uri: Url,
        language_id: Option<&str>,
        settings: &Settings,
        roots: &[PathBuf],
    ) -> Option<Outcome> {
        if !settings.enable_on_save {
            return None;
        }
        let target = Target::new(uri, language_id)?;
        Some(self.analyze(target, settings, roots).await)
    }

    pub(crate) async fn analyze(
        &self,
        target: Target,
        settings: &Settings,
        roots: &[PathBuf],
    ) -> Outcome {
        let token = self.begin(&target.uri);
        let cwd = working_dir(roots, &target.path);
        let invocation =
            Invocation::build(&target.path, target.language, settings, cwd);

        debug!(uri = %target.uri, token, "running {}", invocation);
        self.surface.log(format!("Running: {}", invocation)).await;

        let stderr = match self.runner.run(&invocation).await {
            Ok(captured) => {
                if !captured.success() {
                    warn!(
                        uri = %target.uri,
                        code = ?captured.code,
                        "cppcheck exited unsuccessfully"
                    );
                }
                captured.stderr
            }
            Err(err) => {
                warn!(uri = %target.uri, "{}", err);
                err.to_string()
            }
        };
        self.surface.log(stderr.clone()).await;

        let parser = ReportParser::new(
            &invocation.cwd,
            &target.path,
            invocation.report_type,
            settings.severity_mapping(),
        );
        let diagnostics: Vec<Diagnostic> =
            parser.parse(&stderr).map(view::diagnostic).collect();
        let count = diagnostics.len();

        let _publishing = self.publishing.lock().await;
        if !self.is_current(&target.uri, token) {
            debug!(uri = %target.uri, token, "discarding superseded run");
            return Outcome::Superseded;
        }
        if diagnostics.is_empty() {
            self.diagnostics.remove(&target.uri);
        } else {
            self.diagnostics.insert(target.uri.clone(), diagnostics.clone());
        }
        self.surface.publish(target.uri.clone(), diagnostics).await;
        self.in_flight.remove_if(&target.uri, |_, t| *t == token);
        self.surface
            .status(format!("Cppcheck MISRA: {} issue(s)", count))
            .await;
        Outcome::Published(count)
    }

    fn is_current(&self, uri: &Url, token: u64) -> bool {
        self.in_flight.get(uri).map_or(false, |r| *r.value() == token)
    }

    fn begin(&self, uri: &Url) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        self.in_flight.insert(uri.clone(), token);
        token
    }
}
