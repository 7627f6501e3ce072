#![forbid(unsafe_code)]

use std::path::PathBuf;

use pipeboard_core::{BoardError, ConfigError};
use thiserror::Error;

use crate::memory_store::StoreInitError;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    #[error("invalid store setup: {0}")]
    Store(#[from] StoreInitError),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("invalid trace at line {line}: {message}")]
    InvalidTrace { line: usize, message: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingPath { .. } => 66,
            Self::Config(_) => 78,
            Self::Board(_) | Self::Store(_) | Self::InvalidTrace { .. } | Self::Json(_) => 65,
            Self::Io(_) => 74,
        }
    }

    #[must_use]
    pub fn invalid_trace(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidTrace {
            line,
            message: message.into(),
        }
    }
}
