//! Crate error type

use thiserror::Error;

/// Errors surfaced by corpus loading, training and persistence.
///
/// Classification itself never fails: an untrained or empty model degrades
/// to the default result instead of returning an error.
#[derive(Debug, Error)]
pub enum Error {
    /// No patterns could be produced and a caller required a ready model.
    #[error("pattern corpus is empty")]
    EmptyCorpus,

    /// A corpus source failed as a whole (individual rows are skipped, not raised).
    #[error("corpus source error: {0}")]
    Corpus(String),

    /// Saving or loading a trained model failed.
    #[error("model persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
