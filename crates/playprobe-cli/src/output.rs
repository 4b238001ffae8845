//! Output formatting and progress reporting

use std::fmt::Write as _;
use std::time::Duration;

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use playprobe::{Scenario, SuiteResults, TestOutcome, TestResult};
use serde::{Deserialize, Serialize};

use crate::error::CliResult;

/// Output format for test results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

/// Progress reporter for test execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while `total` tests run
    pub fn start(&mut self, total: usize) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("running {total} tests"));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    /// Stop the spinner
    pub fn finish(&self) {
        if let Some(ref spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }

    /// Print one finished test
    pub fn result(&self, result: &TestResult) {
        let line = result_line(result, self.use_color);
        if result.outcome == TestOutcome::Failed {
            // Always print failures, even in quiet mode
            self.write(&line);
        } else if !self.quiet {
            self.write(&line);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        self.write(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        self.write("");
        self.write(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, results: &SuiteResults) {
        if self.quiet && results.all_passed() {
            return;
        }
        self.write("");
        self.write(&summary_line(results, self.use_color));
    }

    fn write(&self, line: &str) {
        match self.spinner {
            Some(ref spinner) if !spinner.is_finished() => spinner.println(line),
            _ => {
                let _ = self.term.write_line(line);
            }
        }
    }
}

/// One line per finished test
#[must_use]
pub fn result_line(result: &TestResult, use_color: bool) -> String {
    let secs = result.duration().as_secs_f64();
    let (mark, plain) = match result.outcome {
        TestOutcome::Passed => (style("✓").green().bold(), "PASS"),
        TestOutcome::Flaky => (style("~").yellow().bold(), "FLAKY"),
        TestOutcome::Failed => (style("✗").red().bold(), "FAIL"),
    };
    let prefix = if use_color {
        mark.to_string()
    } else {
        plain.to_string()
    };

    let mut line = format!("{prefix} [{}] {} ({secs:.2}s)", result.suite, result.name);
    if result.attempts > 1 {
        let _ = write!(line, " after {} attempts", result.attempts);
    }
    if let (TestOutcome::Failed, Some(error)) = (result.outcome, &result.error) {
        let _ = write!(line, "\n    {error}");
    }
    line
}

/// `PASSED 5 tests in 12.30s (4 passed, 1 flaky, 0 failed)`
#[must_use]
pub fn summary_line(results: &SuiteResults, use_color: bool) -> String {
    let passed = results.passed_count();
    let flaky = results.flaky_count();
    let failed = results.failed_count();
    let total = results.total();
    let secs = results.duration().as_secs_f64();

    if use_color {
        let passed_style = Style::new().green().bold();
        let flaky_style = Style::new().yellow();
        let failed_style = Style::new().red().bold();
        let status = if failed > 0 {
            failed_style.apply_to("FAILED")
        } else {
            passed_style.apply_to("PASSED")
        };
        format!(
            "{status} {total} tests in {secs:.2}s ({} passed, {} flaky, {} failed)",
            passed_style.apply_to(passed),
            flaky_style.apply_to(flaky),
            if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            },
        )
    } else {
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        format!(
            "{status} {total} tests in {secs:.2}s ({passed} passed, {flaky} flaky, {failed} failed)"
        )
    }
}

/// Pretty JSON for a finished run
pub fn render_json(results: &SuiteResults) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Scenario listing grouped by suite, in registry order
#[must_use]
pub fn render_list(scenarios: &[std::sync::Arc<dyn Scenario>]) -> String {
    let mut out = String::new();
    let mut current = None;
    for scenario in scenarios {
        let suite = scenario.suite();
        if current != Some(suite) {
            let _ = writeln!(out, "{suite}:");
            current = Some(suite);
        }
        let _ = writeln!(out, "  {}", scenario.name());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use playprobe::Suite;

    fn result(name: &str, outcome: TestOutcome, attempts: u32, error: Option<&str>) -> TestResult {
        TestResult {
            name: name.to_string(),
            suite: Suite::Playground,
            outcome,
            attempts,
            error: error.map(str::to_string),
            duration_ms: 1500,
        }
    }

    fn suite_results(results: Vec<TestResult>) -> SuiteResults {
        SuiteResults {
            run_id: "run".to_string(),
            results,
            duration_ms: 12_300,
        }
    }

    mod line_tests {
        use super::*;

        #[test]
        fn test_pass_line() {
            let line = result_line(&result("Progress bar", TestOutcome::Passed, 1, None), false);
            assert_eq!(line, "PASS [UI testing playground] Progress bar (1.50s)");
        }

        #[test]
        fn test_flaky_line_mentions_attempts() {
            let line = result_line(&result("Progress bar", TestOutcome::Flaky, 2, None), false);
            assert!(line.starts_with("FLAKY"));
            assert!(line.ends_with("after 2 attempts"));
        }

        #[test]
        fn test_failed_line_includes_error() {
            let line = result_line(
                &result("Droppable test", TestOutcome::Failed, 2, Some("Assertion failed: x")),
                false,
            );
            assert!(line.starts_with("FAIL"));
            assert!(line.contains("\n    Assertion failed: x"));
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn test_plain_summary() {
            let results = suite_results(vec![
                result("a", TestOutcome::Passed, 1, None),
                result("b", TestOutcome::Flaky, 2, None),
            ]);
            assert_eq!(
                summary_line(&results, false),
                "PASSED 2 tests in 12.30s (1 passed, 1 flaky, 0 failed)"
            );
        }

        #[test]
        fn test_failed_summary() {
            let results = suite_results(vec![result("a", TestOutcome::Failed, 2, Some("boom"))]);
            assert!(summary_line(&results, false).starts_with("FAILED 1 tests"));
        }

        #[test]
        fn test_json_round_trips() {
            let results = suite_results(vec![result("a", TestOutcome::Passed, 1, None)]);
            let json = render_json(&results).unwrap();
            let back: SuiteResults = serde_json::from_str(&json).unwrap();
            assert_eq!(back, results);
        }
    }

    #[test]
    fn test_list_groups_by_suite() {
        let listing = render_list(&playprobe::scenario::all());
        assert!(listing.starts_with("UI testing playground:\n  Press dynamic ID button\n"));
        assert!(listing.contains("Demo QA:\n  Droppable test\n"));
    }
}
