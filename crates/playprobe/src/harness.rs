//! Test harness for running scenario suites.
//!
//! Every attempt gets a fresh page from the [`PageFactory`], runs under the
//! per-test timeout, and closes its page afterwards whatever the outcome.
//! A failed attempt is retried up to `retries` times; a pass on a later
//! attempt is reported as [`TestOutcome::Flaky`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::config::SuiteConfig;
use crate::driver::PageFactory;
use crate::result::{PlayprobeError, PlayprobeResult};
use crate::scenario::{Scenario, Suite};

/// A single test case
#[derive(Debug, Clone)]
pub struct TestCase {
    scenario: Arc<dyn Scenario>,
}

impl TestCase {
    /// Wrap a scenario
    #[must_use]
    pub fn new(scenario: Arc<dyn Scenario>) -> Self {
        Self { scenario }
    }

    /// Test name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.scenario.name()
    }

    /// Suite the test belongs to
    #[must_use]
    pub fn suite(&self) -> Suite {
        self.scenario.suite()
    }
}

/// Final verdict for one test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    /// Passed on the first attempt
    Passed,
    /// Passed after at least one failed attempt
    Flaky,
    /// Every attempt failed
    Failed,
}

impl TestOutcome {
    /// Whether the test counts as a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed | Self::Flaky)
    }
}

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Suite the test belongs to
    pub suite: Suite,
    /// Verdict
    pub outcome: TestOutcome,
    /// Attempts made
    pub attempts: u32,
    /// Error from the last failed attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time across all attempts
    pub duration_ms: u64,
}

impl TestResult {
    /// Wall time across all attempts
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Results from running a suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Unique id of this run
    pub run_id: String,
    /// Individual test results, in declaration order
    pub results: Vec<TestResult>,
    /// Total duration
    pub duration_ms: u64,
}

impl SuiteResults {
    /// No test failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_pass())
    }

    /// Tests that passed on the first attempt
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestOutcome::Passed)
    }

    /// Tests that passed on a retry
    #[must_use]
    pub fn flaky_count(&self) -> usize {
        self.count(TestOutcome::Flaky)
    }

    /// Tests that never passed
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestOutcome::Failed)
    }

    /// Get total test count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed tests
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == TestOutcome::Failed)
            .collect()
    }

    /// Total duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    fn count(&self, outcome: TestOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Runs test cases against pages from a [`PageFactory`]
#[derive(Debug, Clone, Default)]
pub struct TestHarness {
    config: SuiteConfig,
    filter: Option<String>,
}

impl TestHarness {
    /// Harness using `config` for timeouts, retries and workers
    #[must_use]
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            filter: None,
        }
    }

    /// Only run tests whose name contains `filter` (case-insensitive)
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Configuration handed to every scenario
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Scenarios that pass the name filter, as test cases
    #[must_use]
    pub fn select(&self, scenarios: &[Arc<dyn Scenario>]) -> Vec<TestCase> {
        let filter = self.filter.as_deref().map(str::to_lowercase);
        scenarios
            .iter()
            .filter(|s| {
                filter
                    .as_deref()
                    .is_none_or(|f| s.name().to_lowercase().contains(f))
            })
            .cloned()
            .map(TestCase::new)
            .collect()
    }

    /// Run `cases`
    pub async fn run(&self, factory: &dyn PageFactory, cases: Vec<TestCase>) -> SuiteResults {
        self.run_with(factory, cases, |_| {}).await
    }

    /// Run `cases`, calling `on_result` as each test finishes
    pub async fn run_with<F>(
        &self,
        factory: &dyn PageFactory,
        cases: Vec<TestCase>,
        mut on_result: F,
    ) -> SuiteResults
    where
        F: FnMut(&TestResult),
    {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let workers = self.config.workers.max(1);
        tracing::info!(run_id = %run_id, tests = cases.len(), workers, "starting run");

        let mut finished = stream::iter(cases.into_iter().enumerate())
            .map(|(index, case)| async move { (index, self.run_case(factory, &case).await) })
            .buffer_unordered(workers);

        let mut results = Vec::new();
        while let Some((index, result)) = finished.next().await {
            on_result(&result);
            results.push((index, result));
        }
        results.sort_by_key(|(index, _)| *index);

        SuiteResults {
            run_id,
            results: results.into_iter().map(|(_, r)| r).collect(),
            duration_ms: millis(start.elapsed()),
        }
    }

    /// Run one case with retries
    pub async fn run_case(&self, factory: &dyn PageFactory, case: &TestCase) -> TestResult {
        let start = Instant::now();
        let max_attempts = self.config.attempts();
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            attempts += 1;
            match self.attempt(factory, case).await {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(e) => {
                    if attempts < max_attempts {
                        tracing::warn!(test = case.name(), attempt = attempts, error = %e, "retrying");
                    }
                    last_error = Some(e.to_string());
                }
            }
        }

        let outcome = match (&last_error, attempts) {
            (Some(_), _) | (None, 0) => TestOutcome::Failed,
            (None, 1) => TestOutcome::Passed,
            (None, _) => TestOutcome::Flaky,
        };
        tracing::info!(test = case.name(), ?outcome, attempts, "test finished");

        TestResult {
            name: case.name().to_string(),
            suite: case.suite(),
            outcome,
            attempts,
            error: last_error,
            duration_ms: millis(start.elapsed()),
        }
    }

    async fn attempt(&self, factory: &dyn PageFactory, case: &TestCase) -> PlayprobeResult<()> {
        let page = factory.open_page().await?;
        let timeout = self.config.timeout();
        let outcome = tokio::time::timeout(timeout, case.scenario.run(page.as_ref(), &self.config))
            .await
            .unwrap_or_else(|_| {
                Err(PlayprobeError::timeout(
                    self.config.timeout_ms,
                    format!("test {:?}", case.name()),
                ))
            });

        if let Err(e) = page.close().await {
            tracing::debug!(test = case.name(), error = %e, "page close failed");
        }
        outcome
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
