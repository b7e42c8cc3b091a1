//! Error types for ContextKeys.
//!
//! Library crates use [`ContextKeysError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ContextKeys operations.
#[derive(Debug, thiserror::Error)]
pub enum ContextKeysError {
    /// The document has no recognizable `---` delimited header.
    #[error("document has no frontmatter")]
    NoFrontmatter,

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the generation backend.
    #[error("network error: {0}")]
    Network(String),

    /// The generation backend rejected the request or sent an unreadable reply.
    #[error("generation error: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContextKeysError>;

impl ContextKeysError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the document was skipped for lacking a header.
    pub fn is_no_frontmatter(&self) -> bool {
        matches!(self, Self::NoFrontmatter)
    }
}
