use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors from the matching pipeline.  All of them are fatal.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Argument error: {0}")]
    Argument(String),

    #[error("Malformed input in {}: {msg}", .path.display())]
    MalformedInput { path: PathBuf, msg: String },

    #[error("Join error: no run metadata found for sample {sample_id}")]
    Join { sample_id: String },

    #[error("Copy error: spectrum directory {} for sample {sample_id} {msg}", .path.display())]
    Copy {
        sample_id: String,
        path: PathBuf,
        msg: &'static str,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MatchError {
    pub fn malformed<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::MalformedInput {
            path: path.as_ref().to_owned(),
            msg: msg.into(),
        }
    }

    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_owned(),
            source,
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
