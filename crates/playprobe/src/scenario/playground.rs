//! Scenarios against the UI testing playground.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{Scenario, Suite};
use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::expect::{assert_eq_value, expect};
use crate::locator::Locator;
use crate::result::{PlayprobeError, PlayprobeResult};
use crate::wait::{self, ElementState, WaitOptions};

/// Pause between the first start and stop on the progress bar page
pub const DEFAULT_PROGRESS_WARMUP: Duration = Duration::from_secs(2);

/// Progress value the bar is stopped at
pub const PROGRESS_TARGET: &str = "75";

/// A button whose `id` changes on every load is still found by its text
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicIdButton;

#[async_trait]
impl Scenario for DynamicIdButton {
    fn name(&self) -> &'static str {
        "Press dynamic ID button"
    }

    fn suite(&self) -> Suite {
        Suite::Playground
    }

    async fn run(&self, page: &dyn PageDriver, config: &SuiteConfig) -> PlayprobeResult<()> {
        page.goto(&config.playground_page("dynamicid")).await?;

        let button = Locator::new("button")
            .with_text("Button with Dynamic ID")
            .with_timeout(config.expect_timeout());
        button.wait_for(page, ElementState::Attached).await?;

        let id = button.get_attribute(page, "id").await?.unwrap_or_default();
        if id.trim().is_empty() {
            return Err(PlayprobeError::assertion(format!(
                "{button} has no id attribute"
            )));
        }
        tracing::info!(button_id = %id, "found button");

        expect(&button)
            .with_timeout(config.expect_timeout())
            .to_be_visible()
            .verify(page)
            .await?;
        button.click(page).await?;
        tracing::info!("button was tapped");
        Ok(())
    }
}

/// Time how long the page takes to compute data client side
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientSideDelay;

#[async_trait]
impl Scenario for ClientSideDelay {
    fn name(&self) -> &'static str {
        "Calculate delay time for client-side action"
    }

    fn suite(&self) -> Suite {
        Suite::Playground
    }

    async fn run(&self, page: &dyn PageDriver, config: &SuiteConfig) -> PlayprobeResult<()> {
        page.goto(&config.playground_page("clientdelay")).await?;

        let trigger = Locator::new("button")
            .with_text("Button Triggering Client Side Logic")
            .with_timeout(config.expect_timeout());
        let loading = Locator::new("#loadingIndicator").with_timeout(config.client_wait_timeout());
        let message = Locator::text("Data calculated on the client side.")
            .with_timeout(config.client_wait_timeout());

        let started = Instant::now();
        trigger.click(page).await?;

        loading.wait_for(page, ElementState::Hidden).await?;
        message.wait_for(page, ElementState::Visible).await?;

        let delay = started.elapsed();
        tracing::info!(delay_secs = delay.as_secs_f64(), "client side logic finished");

        expect(&message)
            .with_timeout(config.expect_timeout())
            .to_be_visible()
            .verify(page)
            .await
    }
}

/// Stop the progress bar exactly at 75%
#[derive(Debug, Clone, Copy)]
pub struct ProgressBar {
    warmup: Duration,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_PROGRESS_WARMUP,
        }
    }
}

impl ProgressBar {
    /// Set the pause between the first start and stop
    #[must_use]
    pub const fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }
}

#[async_trait]
impl Scenario for ProgressBar {
    fn name(&self) -> &'static str {
        "Progress Bar get information"
    }

    fn suite(&self) -> Suite {
        Suite::Playground
    }

    async fn run(&self, page: &dyn PageDriver, config: &SuiteConfig) -> PlayprobeResult<()> {
        page.goto(&config.playground_page("progressbar")).await?;

        let start = Locator::new("#startButton").with_timeout(config.expect_timeout());
        let stop = Locator::new("#stopButton").with_timeout(config.expect_timeout());
        let progress = Locator::new("#progressBar").with_timeout(config.timeout());
        let result = Locator::new("#result");

        let previous = result.text_content(page).await?.unwrap_or_default();
        tracing::info!(result = %previous.trim(), "previous result");

        start.click(page).await?;
        tokio::time::sleep(self.warmup).await;
        stop.click(page).await?;

        page.reload().await?;

        start.click(page).await?;
        progress
            .wait_for_attribute(page, "aria-valuenow", PROGRESS_TARGET)
            .await?;
        stop.click(page).await?;

        let value = progress.get_attribute(page, "aria-valuenow").await?;
        assert_eq_value("aria-valuenow", &Some(PROGRESS_TARGET), &value.as_deref())
    }
}

/// Generate a GUID inside a shadow root and round-trip it through the clipboard
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowDomGuid;

#[async_trait]
impl Scenario for ShadowDomGuid {
    fn name(&self) -> &'static str {
        "Shadow DOM GUID Generator"
    }

    fn suite(&self) -> Suite {
        Suite::Playground
    }

    async fn run(&self, page: &dyn PageDriver, config: &SuiteConfig) -> PlayprobeResult<()> {
        page.goto(&config.playground_page("shadowdom")).await?;

        let generate = Locator::new("#buttonGenerate").with_timeout(config.expect_timeout());
        let copy = Locator::new("#buttonCopy").with_timeout(config.expect_timeout());
        let field = Locator::new("#editField");

        generate.click(page).await?;
        let edit = &field;
        wait::poll_until(
            "#editField to hold a GUID",
            WaitOptions::from(config.expect_timeout()),
            move || async move {
                Ok(edit
                    .input_value(page)
                    .await?
                    .is_some_and(|v| !v.trim().is_empty()))
            },
        )
        .await?;

        copy.click(page).await?;

        let clipboard = page.read_clipboard().await?;
        let generated = field.input_value(page).await?.unwrap_or_default();
        tracing::info!(guid = %generated, "generated GUID");
        assert_eq_value("clipboard", generated.as_str(), clipboard.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::BoundingBox;
    use crate::mock::{MockElement, MockPage};

    fn config() -> SuiteConfig {
        SuiteConfig::default()
            .with_expect_timeout_ms(200)
            .with_timeout_ms(2_000)
    }

    fn at(y: f64) -> BoundingBox {
        BoundingBox::new(10.0, y, 120.0, 30.0)
    }

    mod dynamic_id_tests {
        use super::*;

        fn page(id: &str) -> MockPage {
            let page = MockPage::new();
            page.insert("button", MockElement::new(at(0.0)).with_text("Other"));
            page.insert(
                "button",
                MockElement::new(at(50.0))
                    .with_text("Button with Dynamic ID")
                    .with_attr("id", id),
            );
            page
        }

        #[tokio::test]
        async fn test_clicks_button_with_generated_id() {
            let page = page("1f3a9c02-77e4");
            DynamicIdButton.run(&page, &config()).await.unwrap();
            assert_eq!(
                page.current_url().await.unwrap(),
                "http://uitestingplayground.com/dynamicid"
            );
            assert!(page.was_called("click:button:has-text(\"Button with Dynamic ID\")"));
        }

        #[tokio::test]
        async fn test_empty_id_fails() {
            let page = page("");
            let err = DynamicIdButton.run(&page, &config()).await.unwrap_err();
            assert!(err.is_assertion());
            assert!(!page.was_called("click:"));
        }

        #[tokio::test]
        async fn test_missing_button_times_out() {
            let page = MockPage::new();
            let err = DynamicIdButton.run(&page, &config()).await.unwrap_err();
            assert!(matches!(err, PlayprobeError::Timeout { .. }));
        }
    }

    mod client_delay_tests {
        use super::*;

        fn page(delay: Duration) -> MockPage {
            let page = MockPage::new();
            page.insert(
                "#loadingIndicator",
                MockElement::new(at(100.0)).with_text("Loading...").hidden(),
            );
            let trigger = page.insert(
                "button",
                MockElement::new(at(0.0)).with_text("Button Triggering Client Side Logic"),
            );
            page.on_click(trigger, move |dom| {
                dom.set_visible("#loadingIndicator", true);
                dom.defer(delay, |dom| {
                    dom.set_visible("#loadingIndicator", false);
                    dom.insert(
                        "p.bg-success",
                        MockElement::new(at(150.0)).with_text("Data calculated on the client side."),
                    );
                });
            });
            page
        }

        #[tokio::test]
        async fn test_waits_for_client_side_data() {
            let page = page(Duration::from_millis(40));
            ClientSideDelay.run(&page, &config()).await.unwrap();
        }

        #[tokio::test]
        async fn test_slow_client_exceeds_wait_timeout() {
            let page = page(Duration::from_secs(5));
            let config = SuiteConfig {
                client_wait_timeout_ms: 50,
                ..config()
            };
            let err = ClientSideDelay.run(&page, &config).await.unwrap_err();
            assert!(matches!(err, PlayprobeError::Timeout { .. }));
        }
    }

    mod progress_bar_tests {
        use super::*;

        const STEPS: &[&str] = &["0", "5", "25", "50", "70", "75", "80", "100"];

        fn page(stop_works: bool) -> MockPage {
            let page = MockPage::new();
            let start = page.insert("#startButton", MockElement::new(at(0.0)).with_text("Start"));
            let stop = page.insert("#stopButton", MockElement::new(at(40.0)).with_text("Stop"));
            page.insert(
                "#progressBar",
                MockElement::new(at(80.0)).with_attr("aria-valuenow", "0"),
            );
            page.insert("#result", MockElement::new(at(120.0)).with_text("Result: n/a"));
            page.on_click(start, |dom| {
                dom.set_attr_sequence("#progressBar", "aria-valuenow", STEPS);
            });
            page.on_click(stop, move |dom| {
                if stop_works {
                    dom.freeze_attr("#progressBar", "aria-valuenow");
                }
            });
            page.on_reload(|dom| dom.set_attr("#progressBar", "aria-valuenow", "0"));
            page
        }

        #[tokio::test]
        async fn test_stops_at_75() {
            let page = page(true);
            ProgressBar::default()
                .with_warmup(Duration::from_millis(5))
                .run(&page, &config())
                .await
                .unwrap();
            assert!(page.was_called("reload"));
            assert_eq!(
                page.history()
                    .iter()
                    .filter(|c| c.as_str() == "click:#startButton")
                    .count(),
                2
            );
        }

        #[tokio::test]
        async fn test_bar_that_keeps_running_fails() {
            let page = page(false);
            let err = ProgressBar::default()
                .with_warmup(Duration::from_millis(5))
                .run(&page, &config())
                .await
                .unwrap_err();
            assert!(err.is_assertion());
        }
    }

    mod shadow_dom_tests {
        use super::*;

        const GUID: &str = "5c0a3e4e-8f1b-4d2a-9b7e-0c6d5a4f3e21";

        fn page(copy_works: bool) -> MockPage {
            let page = MockPage::new();
            let generate = page.insert("#buttonGenerate", MockElement::new(at(0.0)));
            let copy = page.insert("#buttonCopy", MockElement::new(at(40.0)));
            page.insert("#editField", MockElement::new(at(80.0)).with_value(""));
            page.on_click(generate, |dom| dom.set_value("#editField", GUID));
            page.on_click(copy, move |dom| {
                let value = dom
                    .get("#editField")
                    .and_then(MockElement::value)
                    .unwrap_or_default()
                    .to_string();
                dom.set_clipboard(if copy_works { value } else { String::new() });
            });
            page
        }

        #[tokio::test]
        async fn test_clipboard_matches_field() {
            let page = page(true);
            ShadowDomGuid.run(&page, &config()).await.unwrap();
            assert_eq!(
                page.current_url().await.unwrap(),
                "http://uitestingplayground.com/shadowdom"
            );
        }

        #[tokio::test]
        async fn test_uses_playground_base_url() {
            let page = page(true);
            let config = config().with_playground_url("http://localhost:8080/");
            ShadowDomGuid.run(&page, &config).await.unwrap();
            assert!(page.was_called("goto:http://localhost:8080/shadowdom"));
        }

        #[tokio::test]
        async fn test_clipboard_mismatch_fails() {
            let page = page(false);
            let err = ShadowDomGuid.run(&page, &config()).await.unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains(GUID));
        }

        #[tokio::test]
        async fn test_denied_clipboard_fails() {
            let page = page(true);
            page.deny_clipboard();
            let err = ShadowDomGuid.run(&page, &config()).await.unwrap_err();
            assert!(matches!(err, PlayprobeError::Clipboard { .. }));
        }
    }
}
