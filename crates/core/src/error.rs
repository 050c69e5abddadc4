use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger file locked: {0:?}")]
    FileLocked(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown worksheet: {0}")]
    UnknownSheet(String),
    #[error("invalid ledger state: {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Stable code carried on structured results handed back to the
    /// conversational layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileLocked(_) => "file_locked",
            _ => "write_failed",
        }
    }

    pub(crate) fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::FileLocked(path.to_path_buf())
        } else {
            Self::Io(err)
        }
    }
}
