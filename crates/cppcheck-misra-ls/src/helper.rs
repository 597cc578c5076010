use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use tower_lsp::lsp_types::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Language {
    C,
    Cpp,
}

impl Language {
    pub(crate) fn from_language_id(id: &str) -> Option<Self> {
        match id {
            "c" => Some(Self::C),
            "cpp" => Some(Self::Cpp),
            _ => None,
        }
    }

    /// Guess for documents the client never opened.
    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "c" | "h" => Some(Self::C),
            "cc" | "cpp" | "cxx" | "c++" | "hh" | "hpp" | "hxx" | "h++" => {
                Some(Self::Cpp)
            }
            _ => None,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_language_id(s)
            .ok_or_else(|| format!("unknown language `{}`, expected c or cpp", s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::C => "c",
            Self::Cpp => "cpp",
        })
    }
}

/// An opened document's language id wins over its file extension.
pub(crate) fn document_language(
    language_id: Option<&str>,
    path: &Path,
) -> Option<Language> {
    match language_id {
        Some(id) => Language::from_language_id(id),
        None => Language::from_path(path),
    }
}

pub(crate) fn file_path(uri: &Url) -> Option<PathBuf> {
    if uri.scheme() != "file" {
        return None;
    }
    uri.to_file_path().ok()
}

/// The first workspace root, or the file's own directory.
pub(crate) fn working_dir(roots: &[PathBuf], file: &Path) -> PathBuf {
    roots
        .first()
        .cloned()
        .or_else(|| file.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
