use std::path::PathBuf;

use thiserror::Error;

/// Failure to load one of the pretrained artifacts. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("unsupported artifact {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },
}

impl ArtifactError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single prediction. Signals an artifact mismatch, never retried.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("vectorization failed: {0}")]
    Vectorization(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("no label for class index {index} (decoder knows {classes} classes)")]
    Decode { index: usize, classes: usize },
}
