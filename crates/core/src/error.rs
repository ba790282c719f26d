//! Error types for binv-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for binv-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for binv-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication or permission failure reported by the backend
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Bucket not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend unreachable, throttled or otherwise unavailable
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidUrl(_) | Error::TomlParse(_) => 2, // UsageError
            Error::Network(_) => 3,                                            // NetworkError
            Error::Auth(_) => 4,                                               // AuthError
            Error::NotFound(_) => 5,                                           // NotFound
            Error::Io(_) => 1,                                                 // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(
            Error::Io(std::io::Error::other("test")).exit_code(),
            1
        );
    }

    #[test]
    fn test_invalid_url_is_usage_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("photos".into());
        assert_eq!(err.to_string(), "Not found: photos");

        let err = Error::Auth("AccessDenied".into());
        assert_eq!(err.to_string(), "Authentication failed: AccessDenied");
    }
}
