mod analysis;
mod check;
mod cli;
mod command;
mod config;
mod helper;
mod runner;
#[cfg(test)]
mod testing;
mod view;

use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, PoisonError, RwLock},
};

use analysis::{Analyzer, Outcome, Surface, Target};
use clap::Parser;
use dashmap::DashMap;
use helper::file_path;
use runner::{ProcessRunner, Runner};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task::JoinHandle,
};
use tower_lsp::{
    jsonrpc::{Error, Result},
    lsp_types::*,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const RUN_COMMAND: &str = "cppcheck-misra.run";

struct Backend<R, S> {
    config: Arc<RwLock<config::Configuration>>,
    analyzer: Arc<Analyzer<R, S>>,
    // languageId of every open document
    language_ids: DashMap<Url, String>,
    roots: RwLock<Vec<PathBuf>>,
}

impl<R: Runner, S: Surface> Backend<R, S> {
    fn new(runner: R, surface: S) -> Self {
        Self {
            analyzer: Arc::new(Analyzer::new(runner, surface)),
            config: Arc::new(RwLock::new(config::Configuration::default())),
            language_ids: DashMap::new(),
            roots: RwLock::new(Vec::new()),
        }
    }

    fn settings(&self) -> config::Settings {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cppcheck_misra
            .clone()
    }

    fn roots(&self) -> Vec<PathBuf> {
        self.roots.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn language_id(&self, uri: &Url) -> Option<String> {
        self.language_ids.get(uri).map(|r| r.value().clone())
    }

    fn update_config(&self, settings: serde_json::Value) {
        match <config::Configuration as serde::Deserialize>::deserialize(
            settings,
        ) {
            Ok(config) => {
                debug!(?config, "configuration updated");
                *self.config.write().unwrap_or_else(PoisonError::into_inner) =
                    config;
            }
            Err(err) => warn!("ignoring invalid configuration: {}", err),
        }
    }

    fn spawn_save(&self, uri: Url) -> JoinHandle<Option<Outcome>> {
        let language_id = self.language_id(&uri);
        let settings = self.settings();
        let roots = self.roots();
        let analyzer = self.analyzer.clone();

        tokio::spawn(async move {
            let outcome = analyzer
                .on_save(uri.clone(), language_id.as_deref(), &settings, &roots)
                .await;
            debug!(%uri, ?outcome, "save analysis finished");
            outcome
        })
    }
}

#[tower_lsp::async_trait]
impl<R: Runner, S: Surface> tower_lsp::LanguageServer for Backend<R, S> {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        let mut roots: Vec<PathBuf> = params
            .workspace_folders
            .unwrap_or_default()
            .iter()
            .filter_map(|folder| file_path(&folder.uri))
            .collect();
        if roots.is_empty() {
            roots.extend(params.root_uri.as_ref().and_then(file_path));
        }
        *self.roots.write().unwrap_or_else(PoisonError::into_inner) = roots;

        if let Some(options) = params.initialization_options {
            self.update_config(options);
        }

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::NONE),
                        save: Some(TextDocumentSyncSaveOptions::Supported(
                            true,
                        )),
                        ..Default::default()
                    },
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![RUN_COMMAND.into()],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.analyzer.surface().log("initialized!".into()).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(%uri, language = %params.text_document.language_id, "opened");
        self.language_ids
            .insert(uri.clone(), params.text_document.language_id);

        // Clients drop diagnostics on close; bring back the last run's.
        if let Some(diagnostics) = self.analyzer.diagnostics(&uri) {
            self.analyzer.surface().publish(uri, diagnostics).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.language_ids.remove(&params.text_document.uri);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.spawn_save(params.text_document.uri);
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        self.update_config(params.settings);
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        if params.command != RUN_COMMAND {
            return Err(Error::invalid_params(format!(
                "Unknown command `{}`",
                params.command
            )));
        }
        let uri = match params.arguments.into_iter().next() {
            Some(argument) => serde_json::from_value::<Url>(argument)
                .map_err(|_| Error::invalid_params("Expected a document URI"))?,
            None => {
                self.analyzer
                    .surface()
                    .warning("Cppcheck MISRA: No active editor".into())
                    .await;
                return Ok(None);
            }
        };

        let language_id = self.language_id(&uri);
        let target = match Target::new(uri, language_id.as_deref()) {
            Some(target) => target,
            None => return Ok(None),
        };
        let settings = self.settings();
        match self.analyzer.analyze(target, &settings, &self.roots()).await {
            Outcome::Published(count) => Ok(Some(count.into())),
            Outcome::Superseded => Ok(None),
        }
    }
}

async fn serve<I, O>(input: I, output: O)
where
    I: AsyncRead + Unpin,
    O: AsyncWrite,
{
    let (service, socket) = tower_lsp::LspService::build(|client| {
        Backend::new(ProcessRunner, client)
    })
    .finish();
    tower_lsp::Server::new(input, output, socket).serve(service).await;
}

async fn run(
    cmd: Option<cli::Command>,
) -> std::result::Result<(), cli::CliError> {
    match cmd {
        None | Some(cli::Command::Lsp { cmd: cli::LspCommand::Stdio }) => {
            serve(tokio::io::stdin(), tokio::io::stdout()).await;
        }
        Some(cli::Command::Lsp { cmd: cli::LspCommand::Tcp { address } }) => {
            let listener = tokio::net::TcpListener::bind(&address).await?;
            info!("listening on {}", listener.local_addr()?);
            let (stream, peer) = listener.accept().await?;
            info!("accepted {}", peer);
            let (read, write) = tokio::io::split(stream);
            serve(read, write).await;
        }
        Some(cli::Command::Check { file, settings, language, verbose }) => {
            check::run(&file, settings.as_deref(), language, verbose).await?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let res = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(cli::CliError::from)
        .and_then(|runtime| runtime.block_on(run(cli.cmd)));
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
