use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised on the load path.
///
/// The library keeps these structured so embedders can match on the kind;
/// the CLI wraps them in `anyhow` for context chains.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A read-mode open named a path with no resource behind it. Raised
    /// before any real I/O is attempted.
    #[error("no resource at {path}")]
    NotFound { path: PathBuf },

    /// The real primitive failed to open the resource for a reason other
    /// than non-existence.
    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A metadata query failed and quiet mode did not suppress it.
    #[error("failed to stat {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The access named a scheme no handler governs.
    #[error("no handler registered for scheme {scheme:?}")]
    UnknownScheme { scheme: String },

    /// The open mode string is not a valid fopen-style mode.
    #[error("invalid open mode {mode:?}")]
    InvalidMode { mode: String },

    /// A substitution rule failed to parse.
    #[error("invalid substitution rule {rule:?}")]
    InvalidRule {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
