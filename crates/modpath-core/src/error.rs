use std::path::PathBuf;
use thiserror::Error;

/// Core error type for modpath operations.
///
/// The public resolve entry points never return this: every failure collapses
/// into `ResolveResult::NotFound` or "document absent". It is used by the
/// fallible helpers underneath (document loading, `extends` chains, option files).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    DocumentParse { path: PathBuf, message: String },

    #[error("Circular extends chain detected at {path}")]
    ExtendsCycle { path: PathBuf },

    #[error("Cannot resolve extends '{extends}' from {from}")]
    ExtendsNotFound { extends: String, from: PathBuf },

    #[error("Invalid resolver options: {0}")]
    InvalidOptions(String),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::DocumentParse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
