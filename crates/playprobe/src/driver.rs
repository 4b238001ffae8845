//! PageDriver - the browser automation surface scenarios are written against.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Scenario / Locator / Pointer / Expect                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  PageDriver (async trait, object safe)                           │
//! ├──────────────────────────────┬───────────────────────────────────┤
//! │  CdpPage                     │  MockPage                         │
//! │  chromiumoxide, `browser`    │  in-memory DOM for unit tests     │
//! └──────────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! Pointer state (position, held button) belongs to the page, not to a single
//! call. Callers pair `mouse_down` with `mouse_up` through
//! [`crate::pointer::press_and_release`].

use crate::locator::{BoundingBox, Point, Selector};
use crate::result::PlayprobeResult;
use crate::wait::ElementState;
use async_trait::async_trait;
use std::time::Duration;

/// Abstract page driver for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load event
    async fn goto(&self, url: &str) -> PlayprobeResult<()>;

    /// Reload the current page
    async fn reload(&self) -> PlayprobeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> PlayprobeResult<String>;

    /// Activate the page's tab
    async fn bring_to_front(&self) -> PlayprobeResult<()>;

    /// Bounding box of the first match, `None` if detached or not rendered
    async fn bounding_box(&self, selector: &Selector) -> PlayprobeResult<Option<BoundingBox>>;

    /// Text content of the first match
    async fn text_content(&self, selector: &Selector) -> PlayprobeResult<Option<String>>;

    /// `value` property of the first match
    async fn input_value(&self, selector: &Selector) -> PlayprobeResult<Option<String>>;

    /// Attribute of the first match
    async fn attribute(&self, selector: &Selector, name: &str) -> PlayprobeResult<Option<String>>;

    /// Whether the first match is visible
    async fn is_visible(&self, selector: &Selector) -> PlayprobeResult<bool>;

    /// Number of matches
    async fn count(&self, selector: &Selector) -> PlayprobeResult<usize>;

    /// Scroll the first match into view if needed
    async fn scroll_into_view(&self, selector: &Selector) -> PlayprobeResult<()>;

    /// Click the centre of the first match
    async fn click(&self, selector: &Selector) -> PlayprobeResult<()>;

    /// Move the pointer
    async fn mouse_move(&self, point: Point) -> PlayprobeResult<()>;

    /// Press the left button at the current pointer position
    async fn mouse_down(&self) -> PlayprobeResult<()>;

    /// Release the left button at the current pointer position
    async fn mouse_up(&self) -> PlayprobeResult<()>;

    /// Whether the left button is currently held
    fn button_held(&self) -> bool;

    /// Wait until the first match reaches `state`
    async fn wait_for_state(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> PlayprobeResult<()>;

    /// Wait until an attribute of the first match equals `value`
    async fn wait_for_attribute(
        &self,
        selector: &Selector,
        name: &str,
        value: &str,
        timeout: Duration,
    ) -> PlayprobeResult<()>;

    /// Read text from the system clipboard
    async fn read_clipboard(&self) -> PlayprobeResult<String>;

    /// Close the page
    async fn close(&self) -> PlayprobeResult<()>;
}

/// Source of fresh, isolated pages; the harness opens one per attempt
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Open a new page in its own browser context
    async fn open_page(&self) -> PlayprobeResult<Box<dyn PageDriver>>;
}

/// A [`PageFactory`] backed by a closure
pub struct FnPageFactory<F>
where
    F: Fn() -> PlayprobeResult<Box<dyn PageDriver>> + Send + Sync,
{
    make: F,
}

impl<F> FnPageFactory<F>
where
    F: Fn() -> PlayprobeResult<Box<dyn PageDriver>> + Send + Sync,
{
    /// Wrap a closure producing pages
    pub const fn new(make: F) -> Self {
        Self { make }
    }
}

impl<F> std::fmt::Debug for FnPageFactory<F>
where
    F: Fn() -> PlayprobeResult<Box<dyn PageDriver>> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPageFactory").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> PageFactory for FnPageFactory<F>
where
    F: Fn() -> PlayprobeResult<Box<dyn PageDriver>> + Send + Sync,
{
    async fn open_page(&self) -> PlayprobeResult<Box<dyn PageDriver>> {
        (self.make)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPage;

    #[tokio::test]
    async fn test_fn_factory_opens_independent_pages() {
        let factory = FnPageFactory::new(|| Ok(Box::new(MockPage::new()) as Box<dyn PageDriver>));
        let first = factory.open_page().await.unwrap();
        let second = factory.open_page().await.unwrap();

        first.goto("https://demoqa.com/droppable").await.unwrap();
        assert_eq!(
            first.current_url().await.unwrap(),
            "https://demoqa.com/droppable"
        );
        assert_eq!(second.current_url().await.unwrap(), "about:blank");
    }

    #[tokio::test]
    async fn test_trait_object_pointer_state() {
        let page: Box<dyn PageDriver> = Box::new(MockPage::new());
        assert!(!page.button_held());
        page.mouse_move(Point::new(5.0, 5.0)).await.unwrap();
        page.mouse_down().await.unwrap();
        assert!(page.button_held());
        page.mouse_up().await.unwrap();
        assert!(!page.button_held());
    }
}
