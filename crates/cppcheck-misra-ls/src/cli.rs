use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};

use crate::helper::Language;

#[derive(Parser, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(bin_name = env!("CARGO_PKG_NAME"))]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Command {
    /// Run the language server.
    Lsp {
        #[clap(subcommand)]
        cmd: LspCommand,
    },
    /// Analyze one file and print its diagnostics.
    Check {
        /// The C or C++ file to analyze.
        file: PathBuf,
        /// JSON file with a `cppcheck-misra` settings object.
        #[clap(long)]
        settings: Option<PathBuf>,
        /// Override the language guessed from the file extension.
        #[clap(long)]
        language: Option<Language>,
        /// Also print the command line and the raw tool output.
        #[clap(long, short)]
        verbose: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum LspCommand {
    /// Listen on a TCP address.
    Tcp {
        /// The address and port to listen on.
        #[clap(long)]
        address: String,
    },
    /// Attach to standard input and output.
    Stdio,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} cannot be addressed as a file URI")]
    NotAFile(PathBuf),
    #[error("{0} is not a C or C++ file, pass --language")]
    UnknownLanguage(PathBuf),
}
