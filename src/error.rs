//! Error handling and custom error types
//!
//! Provides unified error handling across the handlers using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid storage URL format: {0}")]
    InvalidLocatorFormat(String),

    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    #[error("Response parse error: {0}")]
    ResponseParse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] used when reporting failures to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidLocatorFormat,
    ModelInvocation,
    ResponseParse,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::InvalidLocatorFormat(_) => ErrorKind::InvalidLocatorFormat,
            // A transport failure talking to the model host is still a failed invocation.
            Error::ModelInvocation(_) | Error::Http(_) => ErrorKind::ModelInvocation,
            Error::ResponseParse(_) => ErrorKind::ResponseParse,
            Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether the failure was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::InvalidLocatorFormat
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::Configuration("x".to_string()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            Error::ResponseParse("x".to_string()).kind(),
            ErrorKind::ResponseParse
        );
        let io = Error::from(std::io::Error::other("disk"));
        assert_eq!(io.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_only_locator_errors_are_client_errors() {
        assert!(Error::InvalidLocatorFormat("x".to_string()).is_client_error());
        assert!(!Error::ModelInvocation("x".to_string()).is_client_error());
        assert!(!Error::Configuration("x".to_string()).is_client_error());
    }
}
