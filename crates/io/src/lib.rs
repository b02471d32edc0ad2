// File I/O operations

pub mod report;
pub mod sheet;
pub mod tsv;

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened or read.
    Read { path: PathBuf, message: String },
    /// File could not be created or written.
    Write { path: PathBuf, message: String },
    /// Content does not have the expected shape.
    Format(String),
}

impl IoError {
    pub(crate) fn read(path: &Path, err: impl fmt::Display) -> Self {
        Self::Read { path: path.to_path_buf(), message: err.to_string() }
    }

    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::Write { path: path.to_path_buf(), message: err.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
            Self::Format(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for IoError {}
