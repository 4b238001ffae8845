//! Result and error types for Playprobe.

use thiserror::Error;

/// Result type for Playprobe operations
pub type PlayprobeResult<T> = Result<T, PlayprobeError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum PlayprobeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page or browser-context error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// In-page script evaluation failed
    #[error("Script evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Clipboard access error
    #[error("Clipboard access failed: {message}")]
    Clipboard {
        /// Error message
        message: String,
    },

    /// A bounded wait ran out of time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// An element had no bounding box (detached or hidden)
    #[error("No bounding box for {selector}: element is detached or hidden")]
    MissingGeometry {
        /// Selector of the element
        selector: String,
    },

    /// No element matched the selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PlayprobeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a missing-geometry error for a selector
    #[must_use]
    pub fn missing_geometry(selector: impl Into<String>) -> Self {
        Self::MissingGeometry {
            selector: selector.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(ms: u64, waited_for: impl Into<String>) -> Self {
        Self::Timeout {
            ms,
            waited_for: waited_for.into(),
        }
    }

    /// Whether this error came from a failed post-condition rather than the runtime
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
