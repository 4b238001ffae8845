//! Playprobe: end-to-end UI scenarios for two public demo sites, driven
//! over the Chrome DevTools Protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PLAYPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Test       │    │ PageDriver │            │
//! │   │ (Rust)     │◄───│ Harness    │───►│ CDP / mock │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                                   ▲                   │
//! │         └── Locator · pointer · expect ─────┘                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scenarios only see [`PageDriver`]; the same code runs against
//! [`MockPage`] in unit tests and against Chromium with the `browser`
//! feature.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod browser;
mod config;
#[allow(clippy::missing_errors_doc)]
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod expect;
#[allow(clippy::missing_errors_doc)]
mod harness;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
mod locator;
mod result;

/// In-memory page for unit testing scenarios without a browser
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod mock;

/// Pointer gestures: manual drags and the high-level drag-to
#[allow(clippy::missing_errors_doc)]
pub mod pointer;

/// The scripted scenarios and their registry
#[allow(clippy::missing_errors_doc)]
pub mod scenario;

/// Condition waits with bounded timeouts
#[allow(clippy::missing_errors_doc)]
pub mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{BrowserSession, CdpPage};
pub use config::{
    join_url, Permission, SuiteConfig, DEFAULT_DEMOQA_URL, DEFAULT_PLAYGROUND_URL, DEMOQA_ENV,
    MAX_RETRIES, PLAYGROUND_ENV,
};
pub use driver::{FnPageFactory, PageDriver, PageFactory};
pub use expect::{
    assert_eq_value, assert_moved, assert_same_position, expect, Check, Expect, ExpectAssertion,
    Observed, RetryConfig,
};
pub use harness::{SuiteResults, TestCase, TestHarness, TestOutcome, TestResult};
pub use locator::{BoundingBox, Locator, LocatorOptions, Point, Selector};
pub use mock::{MockElement, MockPage};
pub use pointer::{DragOptions, DropExpectation, Gesture};
pub use result::{PlayprobeError, PlayprobeResult};
pub use scenario::{Scenario, Suite};
pub use wait::{ElementState, WaitOptions, WaitResult};

/// Everything a scenario author needs
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::browser::{BrowserSession, CdpPage};
    pub use super::browser::BrowserConfig;
    pub use super::config::{Permission, SuiteConfig};
    pub use super::driver::{PageDriver, PageFactory};
    pub use super::expect::{assert_eq_value, assert_moved, assert_same_position, expect};
    pub use super::harness::{SuiteResults, TestHarness, TestOutcome, TestResult};
    pub use super::locator::{BoundingBox, Locator, Point, Selector};
    pub use super::pointer::{DragOptions, DropExpectation};
    pub use super::result::{PlayprobeError, PlayprobeResult};
    pub use super::scenario::{Scenario, Suite};
    pub use super::wait::ElementState;
}
