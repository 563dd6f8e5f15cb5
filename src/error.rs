use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DescError>;

/// Errors surfaced at the crate's boundaries (store, config, CLI, scripts).
///
/// Parsing and gesture handling never produce these; they degrade to
/// "nothing changed" instead.
#[derive(Debug, Error)]
pub enum DescError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("no item with id '{id}'")]
    UnknownItem { id: String },

    #[error("index {index} out of range (list has {len} elements)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("script step {step}: {message}")]
    Script { step: usize, message: String },
}

impl DescError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_item(id: impl Into<String>) -> Self {
        Self::UnknownItem { id: id.into() }
    }
}
