//! Loader chain, intercepting loader and chain rewrite protocol.

pub mod annotations;
pub mod chain;
pub mod intercepting;
pub mod rewriter;

use crate::weaver::WeaverError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub type LoadResult<T> = Result<T, LoadError>;

/// Errors surfaced while loading one class.
///
/// Not finding a class is never an error; the chain simply continues. Only
/// rewrite and include failures propagate.
#[derive(Debug)]
pub enum LoadError {
    Weaver(WeaverError),
    Include { path: PathBuf, source: io::Error },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weaver(err) => write!(f, "{err}"),
            Self::Include { path, source } => {
                write!(f, "failed to include `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Weaver(err) => Some(err),
            Self::Include { source, .. } => Some(source),
        }
    }
}

impl From<WeaverError> for LoadError {
    fn from(value: WeaverError) -> Self {
        Self::Weaver(value)
    }
}

/// Host boundary that executes one resolved file as a class definition.
pub trait SourceIncluder: Send + Sync {
    fn include(&self, path: &Path) -> LoadResult<()>;
}
