//! Scripted end-to-end scenarios.
//!
//! Each scenario is a single async flow against one page: navigate, locate,
//! act, wait, assert. Scenarios never share a page; the harness opens a fresh
//! one per attempt.

pub mod droppable;
pub mod playground;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::result::PlayprobeResult;

pub use droppable::Droppable;
pub use playground::{ClientSideDelay, DynamicIdButton, ProgressBar, ShadowDomGuid};

/// Which site a scenario runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Suite {
    /// The UI testing playground (`resource1`)
    Playground,
    /// The demo QA site (`resource2`)
    DemoQa,
}

impl Suite {
    /// Human-readable suite title
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Playground => "UI testing playground",
            Self::DemoQa => "Demo QA",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A runnable end-to-end scenario
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Test name
    fn name(&self) -> &'static str;

    /// Site the scenario targets
    fn suite(&self) -> Suite;

    /// Drive `page` through the scenario; any error fails the attempt
    async fn run(&self, page: &dyn PageDriver, config: &SuiteConfig) -> PlayprobeResult<()>;
}

impl fmt::Debug for dyn Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name())
            .field("suite", &self.suite())
            .finish()
    }
}

/// Every scenario, in declaration order
#[must_use]
pub fn all() -> Vec<Arc<dyn Scenario>> {
    vec![
        Arc::new(DynamicIdButton),
        Arc::new(ClientSideDelay),
        Arc::new(ProgressBar::default()),
        Arc::new(ShadowDomGuid),
        Arc::new(Droppable::default()),
    ]
}
