use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open input directory {}: {source}", path.display())]
    InputUnreadable { path: PathBuf, source: io::Error },

    #[error("access denied on input directory {}: {source}", path.display())]
    RootAccessDenied { path: PathBuf, source: io::Error },

    #[error("pattern {index} is not valid base64: {source}")]
    InvalidPatternEncoding {
        index: usize,
        source: base64::DecodeError,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit code for fatal errors. Findings are never fatal; a scan
    /// that completes reports exit 0 regardless of how much it found.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputUnreadable { .. } => 1,
            Error::RootAccessDenied { .. } => 3,
            Error::InvalidPatternEncoding { .. } | Error::Io(_) => 2,
        }
    }
}
