//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The run finished with failing tests
    #[error("{failed} of {total} tests failed")]
    TestsFailed {
        /// Failed tests
        failed: usize,
        /// Tests run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Playprobe library error
    #[error("Playprobe error: {0}")]
    Playprobe(#[from] playprobe::PlayprobeError),

    /// Report generation error
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }

    /// Process exit code: 1 for failing tests, 2 when the run could not be set up
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::TestsFailed { .. } => 1,
            _ => 2,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::report_generation(e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_tests_failed() {
        let err = CliError::TestsFailed {
            failed: 2,
            total: 5,
        };
        assert_eq!(err.to_string(), "2 of 5 tests failed");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_library_error_is_setup_error() {
        let err: CliError = playprobe::PlayprobeError::BrowserLaunch {
            message: "no chromium".to_string(),
        }
        .into();
        assert!(err.to_string().contains("no chromium"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
