use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Outcome of resolving one specifier.
///
/// Serializes as `{"found": true, "path": "/abs/file.ts"}`,
/// `{"found": true, "path": null}` for built-ins, or `{"found": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolveResult {
    /// `path` is `None` for platform built-ins.
    Found { path: Option<PathBuf> },
    NotFound,
}

impl ResolveResult {
    #[must_use]
    pub fn found(path: impl Into<PathBuf>) -> Self {
        Self::Found {
            path: Some(path.into()),
        }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::Found { path: None }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Found { path: None })
    }

    /// Resolved file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found { path } => path.as_deref(),
            Self::NotFound => None,
        }
    }
}

impl From<Option<PathBuf>> for ResolveResult {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::NotFound, Self::found)
    }
}

impl Serialize for ResolveResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found { path } => {
                let mut state = serializer.serialize_struct("ResolveResult", 2)?;
                state.serialize_field("found", &true)?;
                state.serialize_field("path", path)?;
                state.end()
            }
            Self::NotFound => {
                let mut state = serializer.serialize_struct("ResolveResult", 1)?;
                state.serialize_field("found", &false)?;
                state.end()
            }
        }
    }
}
