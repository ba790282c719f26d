//! Exit code definitions for the binv CLI
//!
//! Scripts rely on these values; changing one is a breaking change.

use binv_core::Error;

/// Exit codes for the binv CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different error scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments or configuration
    UsageError = 2,

    /// Retryable network error: timeout, connection reset, throttling, etc.
    NetworkError = 3,

    /// Authentication or permission failure
    AuthError = 4,

    /// Resource not found: bucket does not exist
    NotFound = 5,

    /// The report was produced but some buckets could not be listed
    PartialFailure = 8,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            8 => Some(Self::PartialFailure),
            _ => None,
        }
    }

    /// Exit code for a core error
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::NetworkError => "Network error (retryable)",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Resource not found",
            Self::PartialFailure => "Some buckets could not be inventoried",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::NetworkError.as_i32(), 3);
        assert_eq!(ExitCode::AuthError.as_i32(), 4);
        assert_eq!(ExitCode::NotFound.as_i32(), 5);
        assert_eq!(ExitCode::PartialFailure.as_i32(), 8);
    }

    #[test]
    fn test_exit_code_from_i32() {
        assert_eq!(ExitCode::from_i32(0), Some(ExitCode::Success));
        assert_eq!(ExitCode::from_i32(3), Some(ExitCode::NetworkError));
        assert_eq!(ExitCode::from_i32(8), Some(ExitCode::PartialFailure));
        assert_eq!(ExitCode::from_i32(6), None);
        assert_eq!(ExitCode::from_i32(99), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::Network("reset".into())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Auth("denied".into())),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Config("bad".into())),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from_error(&Error::Io(std::io::Error::other("boom"))),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::PartialFailure);
        assert!(display.contains("8"));
        assert!(display.contains("buckets"));
    }
}
