//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::errors::AppError;
use crate::network::NetworkError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<NetworkError> for CliError {
    fn from(e: NetworkError) -> Self {
        CliError::App(AppError::Network(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::App(e) => match e {
                AppError::Config { .. } => crate::exitcode::CONFIG,
                AppError::NoNetworkFile => crate::exitcode::USAGE,
                AppError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                AppError::Io { .. } => crate::exitcode::IOERR,
                AppError::Network(NetworkError::Node(_)) => crate::exitcode::SOFTWARE,
                AppError::Network(_) => crate::exitcode::DATAERR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Key;

    #[test]
    fn given_malformed_network_when_mapping_then_dataerr() {
        let err = CliError::from(NetworkError::DuplicateKey(Key::new(3)));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_file_when_mapping_then_noinput() {
        let err = CliError::App(AppError::io(
            "read network",
            std::path::Path::new("missing.toml"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }
}
