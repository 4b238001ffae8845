//! Wait Mechanisms
//!
//! Two styles of synchronization:
//!
//! - **Condition-wait**: the driver subscribes to a state change (in the CDP
//!   driver a `MutationObserver` promise) and [`with_deadline`] bounds it.
//!   Preferred wherever the runtime offers an event.
//! - **Fixed-interval polling**: [`poll_until`] re-checks a predicate every
//!   `poll_interval` until it holds or the timeout elapses. Used for
//!   auto-retrying assertions, where no event primitive exists.

use crate::result::{PlayprobeError, PlayprobeResult};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Element states a locator can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// Present in the DOM
    Attached,
    /// Absent from the DOM
    Detached,
    /// Attached, rendered with a non-empty box, not `visibility: hidden`
    Visible,
    /// Detached or not visible
    Hidden,
}

impl ElementState {
    /// Name used in logs and error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }

    /// Whether an element with the given presence and visibility satisfies this state
    #[must_use]
    pub const fn is_satisfied(&self, attached: bool, visible: bool) -> bool {
        match self {
            Self::Attached => attached,
            Self::Detached => !attached,
            Self::Visible => attached && visible,
            Self::Hidden => !attached || !visible,
        }
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl From<Duration> for WaitOptions {
    fn from(timeout: Duration) -> Self {
        Self::default().with_timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the predicate was evaluated
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Poll `check` at a fixed interval until it returns `true`.
///
/// The predicate is always evaluated at least once, so a zero timeout still
/// observes the current state. Errors from `check` abort the wait immediately.
pub async fn poll_until<F, Fut>(
    description: &str,
    options: WaitOptions,
    mut check: F,
) -> PlayprobeResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PlayprobeResult<bool>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut attempts = 0;

    loop {
        attempts += 1;
        if check().await? {
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                attempts,
                waited_for: description.to_string(),
            });
        }
        if start.elapsed() >= timeout {
            tracing::debug!(waited_for = description, attempts, "poll timed out");
            return Err(PlayprobeError::timeout(options.timeout_ms, description));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// One timeout budget shared by the consecutive phases of a wait
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start the clock now
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Budget left, zero once expired
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the budget is spent
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// The whole budget in milliseconds, for error reports
    #[must_use]
    pub fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Bound a condition-wait future by `timeout`; dropping it on expiry cancels the wait.
pub async fn with_deadline<T, Fut>(
    description: &str,
    timeout: Duration,
    wait: Fut,
) -> PlayprobeResult<T>
where
    Fut: Future<Output = PlayprobeResult<T>>,
{
    match tokio::time::timeout(timeout, wait).await {
        Ok(result) => result,
        Err(_) => Err(PlayprobeError::timeout(
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            description,
        )),
    }
}
