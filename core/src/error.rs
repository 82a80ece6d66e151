use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while building, persisting or loading an index.
///
/// None of these are expected once a server is running: queries only read
/// an index that was validated when it was loaded.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode index {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("cannot encode index: {0}")]
    Encode(String),

    #[error("document path {0:?} was given more than once")]
    DuplicatePath(String),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
