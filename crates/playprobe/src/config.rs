//! Suite configuration.
//!
//! Resolution order is defaults, then an optional YAML file, then the
//! `resource1` / `resource2` environment variables, then whatever the caller
//! (usually the CLI) applies through the `with_*` builders.

use crate::result::{PlayprobeError, PlayprobeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable overriding the playground base URL
pub const PLAYGROUND_ENV: &str = "resource1";

/// Environment variable overriding the demo QA base URL
pub const DEMOQA_ENV: &str = "resource2";

/// Upper bound on retries accepted by [`SuiteConfig::validate`]
pub const MAX_RETRIES: u32 = 100;

/// Default UI testing playground base URL
pub const DEFAULT_PLAYGROUND_URL: &str = "http://uitestingplayground.com/";

/// Default demo QA base URL
pub const DEFAULT_DEMOQA_URL: &str = "https://demoqa.com";

/// Browser permission granted to every test context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// `navigator.clipboard.readText()`
    ClipboardRead,
    /// `navigator.clipboard.writeText()`
    ClipboardWrite,
}

impl Permission {
    /// Permission name as written in configuration
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClipboardRead => "clipboard-read",
            Self::ClipboardWrite => "clipboard-write",
        }
    }
}

impl FromStr for Permission {
    type Err = PlayprobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "clipboard-read" => Ok(Self::ClipboardRead),
            "clipboard-write" => Ok(Self::ClipboardWrite),
            other => Err(PlayprobeError::Config {
                message: format!("unknown permission '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL of the UI testing playground
    pub playground_url: String,
    /// Base URL of the demo QA site
    pub demoqa_url: String,
    /// Per-test timeout in milliseconds
    pub timeout_ms: u64,
    /// Extra attempts after a failed one
    pub retries: u32,
    /// Tests run concurrently, each in its own browser context
    pub workers: usize,
    /// Run the browser without a window
    pub headless: bool,
    /// Auto-retrying assertion timeout in milliseconds
    pub expect_timeout_ms: u64,
    /// Timeout for the client-side delay scenario's waits
    pub client_wait_timeout_ms: u64,
    /// Permissions granted to every browser context
    pub permissions: Vec<Permission>,
    /// Extra chromium command line flags
    pub launch_args: Vec<String>,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            playground_url: DEFAULT_PLAYGROUND_URL.to_string(),
            demoqa_url: DEFAULT_DEMOQA_URL.to_string(),
            timeout_ms: 30_000,
            retries: 1,
            workers: 1,
            headless: false,
            expect_timeout_ms: 5_000,
            client_wait_timeout_ms: 20_000,
            permissions: vec![Permission::ClipboardRead, Permission::ClipboardWrite],
            launch_args: vec![
                "--disable-web-security".to_string(),
                "--enable-features=Clipboard".to_string(),
            ],
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl SuiteConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> PlayprobeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PlayprobeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> PlayprobeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `resource1` / `resource2` from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply base URL overrides from an arbitrary lookup
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(PLAYGROUND_ENV).filter(|v| !v.trim().is_empty()) {
            self.playground_url = url;
        }
        if let Some(url) = lookup(DEMOQA_ENV).filter(|v| !v.trim().is_empty()) {
            self.demoqa_url = url;
        }
        self
    }

    /// Set the playground base URL
    #[must_use]
    pub fn with_playground_url(mut self, url: impl Into<String>) -> Self {
        self.playground_url = url.into();
        self
    }

    /// Set the demo QA base URL
    #[must_use]
    pub fn with_demoqa_url(mut self, url: impl Into<String>) -> Self {
        self.demoqa_url = url.into();
        self
    }

    /// Set the per-test timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the retry count
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the worker count
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the assertion timeout
    #[must_use]
    pub const fn with_expect_timeout_ms(mut self, ms: u64) -> Self {
        self.expect_timeout_ms = ms;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Per-test timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Assertion timeout
    #[must_use]
    pub const fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.expect_timeout_ms)
    }

    /// Client-side delay wait timeout
    #[must_use]
    pub const fn client_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.client_wait_timeout_ms)
    }

    /// Total attempts per test
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// URL of a page on the playground
    #[must_use]
    pub fn playground_page(&self, path: &str) -> String {
        join_url(&self.playground_url, path)
    }

    /// URL of a page on the demo QA site
    #[must_use]
    pub fn demoqa_page(&self, path: &str) -> String {
        join_url(&self.demoqa_url, path)
    }

    /// Reject values no run could work with
    pub fn validate(&self) -> PlayprobeResult<()> {
        for (name, url) in [
            ("playground_url", &self.playground_url),
            ("demoqa_url", &self.demoqa_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PlayprobeError::Config {
                    message: format!("{name} must be an http(s) URL, got '{url}'"),
                });
            }
        }
        if self.timeout_ms == 0 {
            return Err(PlayprobeError::Config {
                message: "timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.retries > MAX_RETRIES {
            return Err(PlayprobeError::Config {
                message: format!("retries must be at most {MAX_RETRIES}, got {}", self.retries),
            });
        }
        if self.workers == 0 {
            return Err(PlayprobeError::Config {
                message: "workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Join a base URL and a path with exactly one slash between them
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}
