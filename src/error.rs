use std::io;

use ledger_parser::error::ParseError;
use ledger_render::RenderError;
use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

/// Failures of the storage layer behind a [`Vault`](crate::Vault).
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("path is not inside the vault: {0}")]
    InvalidPath(String),
    #[error("io error on {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl VaultError {
    pub(crate) fn from_io(path: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => VaultError::NotFound(path.to_string()),
            io::ErrorKind::AlreadyExists => VaultError::AlreadyExists(path.to_string()),
            _ => VaultError::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] VaultError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The span recorded for a transaction no longer describes the text in the ledger file.
    #[error("lines {first_line}..={last_line} do not match the current ledger ({line_count} lines); reload the ledger before editing it")]
    StaleSpan {
        first_line: usize,
        last_line: usize,
        line_count: usize,
    },
    #[error("invalid settings")]
    Config(#[from] toml::de::Error),
    #[error("could not read settings from {path}")]
    ConfigIo {
        path: String,
        #[source]
        source: io::Error,
    },
}
