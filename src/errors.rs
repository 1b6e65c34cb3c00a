//! Application-level errors (wraps network errors)

use std::path::Path;

use thiserror::Error;

use crate::network::NetworkError;

/// Application errors wrap composition errors and add configuration and I/O
/// context.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("no network file given and none configured")]
    NoNetworkFile,

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Create an I/O error with path context.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("{}: {}", action, path.display()),
            source,
        }
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
