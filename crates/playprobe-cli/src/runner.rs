//! Test runner implementation

use playprobe::{scenario, PageFactory, SuiteConfig, SuiteResults, TestCase, TestHarness};

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;

/// Runs the registered scenarios and reports as they finish
#[derive(Debug)]
pub struct TestRunner {
    suite: SuiteConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new test runner
    #[must_use]
    pub fn new(config: CliConfig, suite: SuiteConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { suite, reporter }
    }

    /// Harness for this run, narrowed by `filter`
    #[must_use]
    pub fn harness(&self, filter: Option<&str>) -> TestHarness {
        let harness = TestHarness::new(self.suite.clone());
        match filter {
            Some(f) => harness.with_filter(f),
            None => harness,
        }
    }

    /// Run every scenario matching `filter` in Chromium
    ///
    /// Returns `None` when nothing matched; no browser is launched then.
    pub async fn run(&mut self, filter: Option<&str>) -> CliResult<Option<SuiteResults>> {
        let harness = self.harness(filter);
        let cases = harness.select(&scenario::all());
        if cases.is_empty() {
            self.reporter.warning(&format!(
                "No tests match filter '{}'",
                filter.unwrap_or_default()
            ));
            return Ok(None);
        }

        self.reporter.header("Running Tests");
        self.reporter.start(cases.len());
        let results = self.execute(&harness, cases).await;
        self.reporter.finish();
        let results = results?;

        self.reporter.summary(&results);
        Ok(Some(results))
    }

    /// Run `cases` on pages from `factory`
    pub async fn run_cases(
        &self,
        harness: &TestHarness,
        factory: &dyn PageFactory,
        cases: Vec<TestCase>,
    ) -> SuiteResults {
        harness
            .run_with(factory, cases, |result| self.reporter.result(result))
            .await
    }

    #[cfg(feature = "browser")]
    async fn execute(&self, harness: &TestHarness, cases: Vec<TestCase>) -> CliResult<SuiteResults> {
        use playprobe::{BrowserConfig, BrowserSession};

        let session = BrowserSession::launch(BrowserConfig::from(harness.config())).await?;
        let results = self.run_cases(harness, &session, cases).await;
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "browser did not shut down cleanly");
        }
        Ok(results)
    }

    #[cfg(not(feature = "browser"))]
    #[allow(clippy::unused_async)]
    async fn execute(&self, _harness: &TestHarness, _cases: Vec<TestCase>) -> CliResult<SuiteResults> {
        Err(crate::error::CliError::config(
            "playprobe-cli was built without the `browser` feature",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use playprobe::{FnPageFactory, MockPage, PageDriver, TestOutcome};

    use crate::config::{ColorChoice, Verbosity};

    fn quiet_runner(suite: SuiteConfig) -> TestRunner {
        TestRunner::new(
            CliConfig::new()
                .with_verbosity(Verbosity::Quiet)
                .with_color(ColorChoice::Never),
            suite,
        )
    }

    #[tokio::test]
    async fn test_unmatched_filter_skips_browser() {
        let mut runner = quiet_runner(SuiteConfig::default());
        assert!(runner.run(Some("no such scenario")).await.unwrap().is_none());
    }

    #[test]
    fn test_filter_selects_subset() {
        let runner = quiet_runner(SuiteConfig::default());
        let cases = runner.harness(Some("shadow")).select(&scenario::all());
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name(), "Shadow DOM GUID Generator");
    }

    #[tokio::test]
    async fn test_run_cases_on_blank_pages_reports_failures() {
        let suite = SuiteConfig::default()
            .with_retries(0)
            .with_expect_timeout_ms(20);
        let runner = quiet_runner(suite);
        let harness = runner.harness(Some("dynamic"));
        let factory = FnPageFactory::new(|| Ok(Box::new(MockPage::new()) as Box<dyn PageDriver>));

        let cases = harness.select(&scenario::all());
        let results = runner.run_cases(&harness, &factory, cases).await;
        assert_eq!(results.total(), 1);
        assert_eq!(results.results[0].outcome, TestOutcome::Failed);
    }
}
