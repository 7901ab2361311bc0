use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the host-side plumbing around the terrain stage.
///
/// The stage itself is a total function; everything here is about getting
/// data into or out of it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load OBJ '{path}': {message}")]
    Obj { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("layout mismatch for {what}: expected {expected} bytes, got {actual}")]
    Layout {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
