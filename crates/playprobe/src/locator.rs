//! Locator abstraction for element selection and interaction.
//!
//! A [`Locator`] is a selector plus auto-wait options. It is re-resolved on
//! every call, so geometry read through it is always current; a
//! [`BoundingBox`] value, by contrast, is a snapshot and goes stale as soon as
//! the element moves.
//!
//! Selectors compile to in-page JavaScript that walks open shadow roots, so
//! `#editField` finds the input inside `<guid-generator>` on the shadow DOM page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::driver::PageDriver;
use crate::pointer::{self, DragOptions};
use crate::result::{PlayprobeError, PlayprobeResult};
use crate::wait::ElementState;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Collects every element matching a selector, descending into open shadow roots.
const DEEP_QUERY_JS: &str = "(function deepAll(root, sel) { \
const out = Array.from(root.querySelectorAll(sel)); \
for (const el of root.querySelectorAll('*')) { \
if (el.shadowRoot) { out.push(...deepAll(el.shadowRoot, sel)); } } \
return out; })";

/// A point in viewport coordinates (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Bounding box for an element at the moment it was queried
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Top-left corner
    #[must_use]
    pub const fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Horizontally centred point `offset` pixels below the top edge
    #[must_use]
    pub fn top_center(&self, offset: f64) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + offset)
    }

    /// Check if a point is inside this bounding box
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Area in square pixels
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Same position and size within `tolerance` pixels on every edge
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }

    /// Copy moved by `(dx, dy)`
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x: {:.1}, y: {:.1}, width: {:.1}, height: {:.1}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "#droppable")
    Css(String),
    /// Innermost element whose text contains the string (`text=...`)
    Text(String),
    /// Matches of `base` whose text content contains `text`
    WithText {
        /// Selector being filtered
        base: Box<Selector>,
        /// Text content to match
        text: String,
    },
    /// The `index`-th match of `base`
    Nth {
        /// Selector being indexed
        base: Box<Selector>,
        /// Zero-based index
        index: usize,
    },
}

/// Quote a string as a JavaScript literal
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Keep only matches whose text contains `text`
    #[must_use]
    pub fn filter_text(self, text: impl Into<String>) -> Self {
        Self::WithText {
            base: Box::new(self),
            text: text.into(),
        }
    }

    /// Keep only the `index`-th match
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self::Nth {
            base: Box::new(self),
            index,
        }
    }

    /// JavaScript expression evaluating to the array of matching elements
    #[must_use]
    pub fn to_elements_query(&self) -> String {
        match self {
            Self::Css(css) => format!("{DEEP_QUERY_JS}(document, {})", js_str(css)),
            Self::Text(text) => {
                let t = js_str(text);
                format!(
                    "{DEEP_QUERY_JS}(document, '*').filter(el => !['SCRIPT','STYLE','HEAD','HTML','BODY'].includes(el.tagName) \
&& (el.textContent || '').includes({t}) \
&& !Array.from(el.children).some(c => (c.textContent || '').includes({t})))"
                )
            }
            Self::WithText { base, text } => format!(
                "({}).filter(el => (el.textContent || '').includes({}))",
                base.to_elements_query(),
                js_str(text)
            ),
            Self::Nth { base, index } => format!(
                "({}).slice({index}, {})",
                base.to_elements_query(),
                index + 1
            ),
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("(({})[0] || null)", self.to_elements_query())
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_elements_query())
    }

    /// Body of an arrow function over the first match: `el` is bound, `null` if absent
    #[must_use]
    pub fn with_element(&self, body: &str) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) {{ return null; }} {body} }})()",
            self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::Text(text) => write!(f, "text={text}"),
            Self::WithText { base, text } => match base.as_ref() {
                Self::Css(css) => write!(f, "{css}:has-text({text:?})"),
                other => write!(f, "{other} >> has-text={text:?}"),
            },
            Self::Nth { base, index } => write!(f, "{base} >> nth={index}"),
        }
    }
}

/// Locator options for customizing behavior
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone)]
pub struct Locator {
    /// The selector for finding elements
    selector: Selector,
    /// Options for locator behavior
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Create a `text=...` locator
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text(text.into()))
    }

    /// Filter by text content
    ///
    /// `Locator::new("button").with_text("Button with Dynamic ID")`
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            selector: self.selector.filter_text(text),
            options: self.options,
        }
    }

    /// The `index`-th element this locator matches
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self {
            selector: self.selector.clone().nth(index),
            options: self.options.clone(),
        }
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Current bounding box, `None` when detached or not rendered
    pub async fn bounding_box(&self, page: &dyn PageDriver) -> PlayprobeResult<Option<BoundingBox>> {
        page.bounding_box(&self.selector).await
    }

    /// Current bounding box, or [`PlayprobeError::MissingGeometry`]
    pub async fn require_box(&self, page: &dyn PageDriver) -> PlayprobeResult<BoundingBox> {
        self.bounding_box(page)
            .await?
            .ok_or_else(|| PlayprobeError::missing_geometry(self.selector.to_string()))
    }

    /// Text content of the first match
    pub async fn text_content(&self, page: &dyn PageDriver) -> PlayprobeResult<Option<String>> {
        page.text_content(&self.selector).await
    }

    /// `value` of the first match (inputs)
    pub async fn input_value(&self, page: &dyn PageDriver) -> PlayprobeResult<Option<String>> {
        page.input_value(&self.selector).await
    }

    /// Attribute of the first match
    pub async fn get_attribute(
        &self,
        page: &dyn PageDriver,
        name: &str,
    ) -> PlayprobeResult<Option<String>> {
        page.attribute(&self.selector, name).await
    }

    /// Check if the element is visible
    pub async fn is_visible(&self, page: &dyn PageDriver) -> PlayprobeResult<bool> {
        page.is_visible(&self.selector).await
    }

    /// Number of matching elements
    pub async fn count(&self, page: &dyn PageDriver) -> PlayprobeResult<usize> {
        page.count(&self.selector).await
    }

    /// Wait for the element to reach a state within the locator timeout
    pub async fn wait_for(&self, page: &dyn PageDriver, state: ElementState) -> PlayprobeResult<()> {
        page.wait_for_state(&self.selector, state, self.options.timeout)
            .await
    }

    /// Wait for an attribute to hold exactly `value`
    pub async fn wait_for_attribute(
        &self,
        page: &dyn PageDriver,
        name: &str,
        value: &str,
    ) -> PlayprobeResult<()> {
        page.wait_for_attribute(&self.selector, name, value, self.options.timeout)
            .await
    }

    /// Click after waiting for the element to become visible
    pub async fn click(&self, page: &dyn PageDriver) -> PlayprobeResult<()> {
        self.wait_for(page, ElementState::Visible).await?;
        page.click(&self.selector).await
    }

    /// Scroll the element into view
    pub async fn scroll_into_view(&self, page: &dyn PageDriver) -> PlayprobeResult<()> {
        page.scroll_into_view(&self.selector).await
    }

    /// High-level drag-and-drop onto `target`
    pub async fn drag_to(
        &self,
        page: &dyn PageDriver,
        target: &Self,
        options: DragOptions,
    ) -> PlayprobeResult<()> {
        pointer::drag_and_drop(page, self, target, options).await
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}
