//! Error types for loading and running games.

use std::path::PathBuf;

use txtad_core::EngineError;

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

/// Errors raised while loading content or running a turn.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A game file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A game file is not valid JSON for its kind.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Content is structurally wrong.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// A context id does not exist.
    #[error("unknown context: {0}")]
    UnknownContext(String),

    /// The rule engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
