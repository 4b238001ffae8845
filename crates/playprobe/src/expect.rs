//! Auto-retrying assertions.
//!
//! ```ignore
//! expect(&Locator::new("#droppable"))
//!     .to_contain_text("Dropped!")
//!     .verify(page)
//!     .await?;
//! ```
//!
//! An assertion re-reads the page every `poll_interval` until it holds or
//! `timeout` passes, then fails with the last value it saw.

use std::fmt;
use std::time::{Duration, Instant};

use crate::driver::PageDriver;
use crate::locator::{BoundingBox, Locator};
use crate::result::{PlayprobeError, PlayprobeResult};

/// Default assertion timeout (5 seconds)
pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5000;

/// Default assertion poll interval (100ms)
pub const DEFAULT_EXPECT_POLL_MS: u64 = 100;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total timeout duration
    pub timeout: Duration,
    /// Interval between attempts
    pub poll_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_EXPECT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_EXPECT_POLL_MS),
        }
    }
}

/// What an assertion checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Text content contains the string
    ContainsText(String),
    /// Text content does not contain the string
    NotContainsText(String),
    /// Text content equals the string after trimming
    HasText(String),
    /// Element is visible
    Visible,
    /// Element is detached or hidden
    Hidden,
    /// Attribute equals the value
    HasAttribute {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainsText(t) => write!(f, "to contain text {t:?}"),
            Self::NotContainsText(t) => write!(f, "not to contain text {t:?}"),
            Self::HasText(t) => write!(f, "to have text {t:?}"),
            Self::Visible => f.write_str("to be visible"),
            Self::Hidden => f.write_str("to be hidden"),
            Self::HasAttribute { name, value } => write!(f, "to have {name}={value:?}"),
        }
    }
}

/// A single reading of the page, as far as a [`Check`] needs it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observed {
    /// Text content (`None` when detached)
    pub text: Option<String>,
    /// Visibility
    pub visible: bool,
    /// Attribute value, for attribute checks
    pub attribute: Option<String>,
}

impl Check {
    /// Judge one reading; `Err` carries the observed value for the failure message
    pub fn validate(&self, observed: &Observed) -> Result<(), String> {
        let text = observed.text.as_deref();
        let describe_text = || match text {
            Some(t) => format!("text {t:?}"),
            None => "no element".to_string(),
        };
        let ok = match self {
            Self::ContainsText(expected) => text.is_some_and(|t| t.contains(expected.as_str())),
            Self::NotContainsText(unexpected) => {
                !text.is_some_and(|t| t.contains(unexpected.as_str()))
            }
            Self::HasText(expected) => text.is_some_and(|t| t.trim() == expected.as_str()),
            Self::Visible => observed.visible,
            Self::Hidden => !observed.visible,
            Self::HasAttribute { value, .. } => observed.attribute.as_deref() == Some(value.as_str()),
        };
        if ok {
            return Ok(());
        }
        Err(match self {
            Self::Visible | Self::Hidden => format!("visible = {}", observed.visible),
            Self::HasAttribute { name, .. } => match &observed.attribute {
                Some(v) => format!("{name}={v:?}"),
                None => format!("no {name} attribute"),
            },
            _ => describe_text(),
        })
    }
}

/// Entry point for assertions on a locator
#[derive(Debug, Clone)]
pub struct Expect {
    locator: Locator,
    config: RetryConfig,
}

/// Create an expectation for a locator
#[must_use]
pub fn expect(locator: &Locator) -> Expect {
    Expect {
        locator: locator.clone(),
        config: RetryConfig::default(),
    }
}

impl Expect {
    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    fn assertion(self, check: Check) -> ExpectAssertion {
        ExpectAssertion {
            locator: self.locator,
            config: self.config,
            check,
        }
    }

    /// Assert the element's text contains `text`
    #[must_use]
    pub fn to_contain_text(self, text: impl Into<String>) -> ExpectAssertion {
        self.assertion(Check::ContainsText(text.into()))
    }

    /// Assert the element's text does not contain `text`
    #[must_use]
    pub fn not_to_contain_text(self, text: impl Into<String>) -> ExpectAssertion {
        self.assertion(Check::NotContainsText(text.into()))
    }

    /// Assert the element's trimmed text is exactly `text`
    #[must_use]
    pub fn to_have_text(self, text: impl Into<String>) -> ExpectAssertion {
        self.assertion(Check::HasText(text.into()))
    }

    /// Assert the element is visible
    #[must_use]
    pub fn to_be_visible(self) -> ExpectAssertion {
        self.assertion(Check::Visible)
    }

    /// Assert the element is hidden or detached
    #[must_use]
    pub fn to_be_hidden(self) -> ExpectAssertion {
        self.assertion(Check::Hidden)
    }

    /// Assert an attribute has exactly `value`
    #[must_use]
    pub fn to_have_attribute(
        self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ExpectAssertion {
        self.assertion(Check::HasAttribute {
            name: name.into(),
            value: value.into(),
        })
    }
}

/// A pending assertion; nothing is read until [`ExpectAssertion::verify`]
#[derive(Debug, Clone)]
pub struct ExpectAssertion {
    locator: Locator,
    config: RetryConfig,
    check: Check,
}

impl ExpectAssertion {
    /// The check being made
    #[must_use]
    pub const fn check(&self) -> &Check {
        &self.check
    }

    async fn observe(&self, page: &dyn PageDriver) -> PlayprobeResult<Observed> {
        let mut observed = Observed::default();
        match &self.check {
            Check::ContainsText(_) | Check::NotContainsText(_) | Check::HasText(_) => {
                observed.text = self.locator.text_content(page).await?;
            }
            Check::Visible | Check::Hidden => {
                observed.visible = self.locator.is_visible(page).await?;
            }
            Check::HasAttribute { name, .. } => {
                observed.attribute = self.locator.get_attribute(page, name).await?;
            }
        }
        Ok(observed)
    }

    /// Re-read the page until the check holds or the timeout passes
    pub async fn verify(&self, page: &dyn PageDriver) -> PlayprobeResult<()> {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let observed = self.observe(page).await?;
            let last = match self.check.validate(&observed) {
                Ok(()) => return Ok(()),
                Err(last) => last,
            };
            if start.elapsed() >= self.config.timeout {
                return Err(PlayprobeError::assertion(format!(
                    "expected {} {} within {}ms, last saw {last} ({attempts} attempts)",
                    self.locator,
                    self.check,
                    self.config.timeout.as_millis()
                )));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// Assert two boxes are the same within `tolerance` pixels
pub fn assert_same_position(
    what: &str,
    expected: &BoundingBox,
    actual: &BoundingBox,
    tolerance: f64,
) -> PlayprobeResult<()> {
    if expected.approx_eq(actual, tolerance) {
        Ok(())
    } else {
        Err(PlayprobeError::assertion(format!(
            "{what}: expected {expected}, got {actual}"
        )))
    }
}

/// Assert a box moved by more than `tolerance` pixels
pub fn assert_moved(
    what: &str,
    before: &BoundingBox,
    after: &BoundingBox,
    tolerance: f64,
) -> PlayprobeResult<()> {
    if before.approx_eq(after, tolerance) {
        Err(PlayprobeError::assertion(format!(
            "{what}: still at {after}"
        )))
    } else {
        Ok(())
    }
}

/// Assert two values are equal
pub fn assert_eq_value<T>(what: &str, expected: &T, actual: &T) -> PlayprobeResult<()>
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if expected == actual {
        Ok(())
    } else {
        Err(PlayprobeError::assertion(format!(
            "{what}: expected {expected:?}, got {actual:?}"
        )))
    }
}
