//! Setup-time error types
//!
//! Errors raised while loading configuration, wiring registries or binding
//! the server. Request-time failures are [`ActionError`](crate::handlers::ActionError)s.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Setup and runtime error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Registry wiring error (missing presenter, duplicate operation)
    #[error("Registry error: {0}")]
    Registry(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
