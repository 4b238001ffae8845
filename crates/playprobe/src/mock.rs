//! In-memory page for unit testing.
//!
//! [`MockPage`] keeps a flat list of elements, each registered under the
//! selector string scenarios use to find it. Widgets are reproduced with
//! scripted handlers: click handlers mutate the DOM, drop handlers receive a
//! [`DragEvent`] when the button is released over their element, and deferred
//! mutations land after a real-time delay.
//!
//! Pointer behaviour follows the demo sites: on release, a `draggable`
//! element moves by the drag delta unless it `reverts`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::driver::PageDriver;
use crate::locator::{BoundingBox, Point, Selector};
use crate::result::{PlayprobeError, PlayprobeResult};
use crate::wait::{self, ElementState, WaitOptions};

const MOCK_POLL_INTERVAL_MS: u64 = 5;

/// Handle to an element inserted into a [`MockDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// Attribute value, optionally a sequence that advances on every read
#[derive(Debug, Clone, Default)]
struct AttrValue {
    values: Vec<String>,
    cursor: usize,
    started: bool,
    frozen: bool,
}

impl AttrValue {
    fn fixed(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
            cursor: 0,
            started: false,
            frozen: true,
        }
    }

    /// Advance (unless frozen) and return the value now shown
    fn read(&mut self) -> Option<String> {
        if self.started && !self.frozen && self.cursor + 1 < self.values.len() {
            self.cursor += 1;
        }
        self.started = true;
        self.values.get(self.cursor).cloned()
    }
}

/// One element of the mock DOM
#[derive(Debug, Clone)]
pub struct MockElement {
    bbox: Option<BoundingBox>,
    text: String,
    value: Option<String>,
    attrs: HashMap<String, AttrValue>,
    visible: bool,
    attached: bool,
    draggable: bool,
    reverts: bool,
}

impl MockElement {
    /// Visible, attached element with the given box
    #[must_use]
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox: Some(bbox),
            text: String::new(),
            value: None,
            attrs: HashMap::new(),
            visible: true,
            attached: true,
            draggable: false,
            reverts: false,
        }
    }

    /// Attached element that is not rendered
    #[must_use]
    pub fn unrendered() -> Self {
        Self {
            bbox: None,
            ..Self::new(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the `value` property
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), AttrValue::fixed(value));
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Follows the pointer while the button is held
    #[must_use]
    pub const fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    /// Draggable that snaps back to where it started on release
    #[must_use]
    pub const fn reverting(mut self) -> Self {
        self.draggable = true;
        self.reverts = true;
        self
    }

    /// Text content
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `value` property
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn rendered_box(&self) -> Option<BoundingBox> {
        if self.attached && self.visible {
            self.bbox
        } else {
            None
        }
    }

    fn is_visible(&self) -> bool {
        self.rendered_box()
            .is_some_and(|b| b.width > 0.0 && b.height > 0.0)
    }
}

type Deferred = Box<dyn FnOnce(&mut MockDom) + Send>;

/// The element store handlers operate on
#[derive(Default)]
pub struct MockDom {
    elements: Vec<(String, MockElement)>,
    deferred: Vec<(Instant, Deferred)>,
    clipboard: String,
    clipboard_denied: bool,
}

impl std::fmt::Debug for MockDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDom")
            .field("elements", &self.elements)
            .field("deferred", &self.deferred.len())
            .field("clipboard", &self.clipboard)
            .finish_non_exhaustive()
    }
}

impl MockDom {
    /// Register an element under `key`
    pub fn insert(&mut self, key: impl Into<String>, element: MockElement) -> ElementId {
        self.elements.push((key.into(), element));
        ElementId(self.elements.len() - 1)
    }

    /// First attached element registered under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MockElement> {
        self.elements
            .iter()
            .find(|(k, e)| k == key && e.attached)
            .map(|(_, e)| e)
    }

    fn first_mut(&mut self, key: &str) -> Option<&mut MockElement> {
        self.elements
            .iter_mut()
            .find(|(k, e)| k == key && e.attached)
            .map(|(_, e)| e)
    }

    /// Element by handle
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut MockElement> {
        self.elements.get_mut(id.0).map(|(_, e)| e)
    }

    /// Replace the text of the first element under `key`
    pub fn set_text(&mut self, key: &str, text: impl Into<String>) {
        if let Some(el) = self.first_mut(key) {
            el.text = text.into();
        }
    }

    /// Replace the `value` of the first element under `key`
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        if let Some(el) = self.first_mut(key) {
            el.value = Some(value.into());
        }
    }

    /// Set a fixed attribute on the first element under `key`
    pub fn set_attr(&mut self, key: &str, name: &str, value: impl Into<String>) {
        if let Some(el) = self.first_mut(key) {
            el.attrs.insert(name.to_string(), AttrValue::fixed(value));
        }
    }

    /// Make an attribute step through `values`, one per read, stopping at the last
    pub fn set_attr_sequence(&mut self, key: &str, name: &str, values: &[&str]) {
        if let Some(el) = self.first_mut(key) {
            el.attrs.insert(
                name.to_string(),
                AttrValue {
                    values: values.iter().map(|v| (*v).to_string()).collect(),
                    cursor: 0,
                    started: false,
                    frozen: false,
                },
            );
        }
    }

    /// Stop an attribute sequence at the value last read
    pub fn freeze_attr(&mut self, key: &str, name: &str) {
        if let Some(attr) = self.first_mut(key).and_then(|el| el.attrs.get_mut(name)) {
            attr.frozen = true;
        }
    }

    /// Show or hide the first element under `key`
    pub fn set_visible(&mut self, key: &str, visible: bool) {
        if let Some(el) = self.first_mut(key) {
            el.visible = visible;
        }
    }

    /// Move the first element under `key`
    pub fn set_box(&mut self, key: &str, bbox: BoundingBox) {
        if let Some(el) = self.first_mut(key) {
            el.bbox = Some(bbox);
        }
    }

    /// Remove every element under `key` from the document
    pub fn detach(&mut self, key: &str) {
        for (_, el) in self.elements.iter_mut().filter(|(k, _)| k == key) {
            el.attached = false;
        }
    }

    /// Write the system clipboard
    pub fn set_clipboard(&mut self, text: impl Into<String>) {
        self.clipboard = text.into();
    }

    /// Apply `mutation` once `delay` has passed
    pub fn defer<F>(&mut self, delay: Duration, mutation: F)
    where
        F: FnOnce(&mut Self) + Send + 'static,
    {
        self.deferred.push((Instant::now() + delay, Box::new(mutation)));
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.deferred = pending;
        for (_, mutation) in due {
            mutation(self);
        }
    }

    fn matches(&self, selector: &Selector) -> Vec<usize> {
        let attached = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, (_, e))| e.attached);
        match selector {
            Selector::Css(css) => attached.filter(|(_, (k, _))| k == css).map(|(i, _)| i).collect(),
            Selector::Text(text) => attached
                .filter(|(_, (_, e))| e.text.contains(text.as_str()))
                .map(|(i, _)| i)
                .collect(),
            Selector::WithText { base, text } => self
                .matches(base)
                .into_iter()
                .filter(|&i| self.elements[i].1.text.contains(text.as_str()))
                .collect(),
            Selector::Nth { base, index } => {
                self.matches(base).into_iter().skip(*index).take(1).collect()
            }
        }
    }

    fn resolve(&self, selector: &Selector) -> Option<usize> {
        self.matches(selector).into_iter().next()
    }

    /// Innermost rendered element under `point`
    #[must_use]
    pub fn hit_test(&self, point: &Point) -> Option<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, (_, e))| e.rendered_box().map(|b| (i, b)))
            .filter(|(_, b)| b.contains(point))
            .min_by(|(_, a), (_, b)| a.area().total_cmp(&b.area()))
            .map(|(i, _)| ElementId(i))
    }

    fn key(&self, id: ElementId) -> Option<&str> {
        self.elements.get(id.0).map(|(k, _)| k.as_str())
    }
}

/// What a drop handler is told about a completed drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragEvent {
    /// Key of the element under the pointer when the button went down
    pub source: Option<String>,
    /// Where the button went down
    pub from: Point,
    /// Where the button came up
    pub to: Point,
}

type ClickHandler = Box<dyn FnMut(&mut MockDom) + Send>;
type DropHandler = Box<dyn FnMut(&mut MockDom, &DragEvent) + Send>;

#[derive(Debug, Clone, Copy)]
struct Press {
    from: Point,
    source: Option<ElementId>,
}

#[derive(Default)]
struct MockState {
    url: String,
    dom: MockDom,
    history: Vec<String>,
    pointer: Option<Point>,
    press: Option<Press>,
    click_handlers: Vec<(ElementId, ClickHandler)>,
    drop_handlers: Vec<(ElementId, DropHandler)>,
    reload_handlers: Vec<ClickHandler>,
    moves: usize,
    fail_moves_after: Option<usize>,
    closed: bool,
}

/// Mock page for unit testing
pub struct MockPage {
    state: Mutex<MockState>,
    held: AtomicBool,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockPage")
            .field("url", &state.url)
            .field("dom", &state.dom)
            .field("held", &self.held.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl MockPage {
    /// Blank page
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                url: "about:blank".to_string(),
                ..MockState::default()
            }),
            held: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.dom.apply_due();
        state
    }

    /// Register an element under `key`
    pub fn insert(&self, key: impl Into<String>, element: MockElement) -> ElementId {
        self.lock().dom.insert(key, element)
    }

    /// Run `handler` whenever the element is clicked
    pub fn on_click<F>(&self, id: ElementId, handler: F)
    where
        F: FnMut(&mut MockDom) + Send + 'static,
    {
        self.lock().click_handlers.push((id, Box::new(handler)));
    }

    /// Run `handler` whenever a drag is released over the element
    pub fn on_drop<F>(&self, id: ElementId, handler: F)
    where
        F: FnMut(&mut MockDom, &DragEvent) + Send + 'static,
    {
        self.lock().drop_handlers.push((id, Box::new(handler)));
    }

    /// Run `handler` on every reload
    pub fn on_reload<F>(&self, handler: F)
    where
        F: FnMut(&mut MockDom) + Send + 'static,
    {
        self.lock().reload_handlers.push(Box::new(handler));
    }

    /// Inspect or mutate the DOM directly
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        f(&mut self.lock().dom)
    }

    /// Refuse clipboard reads, as a context without permissions would
    pub fn deny_clipboard(&self) {
        self.lock().dom.clipboard_denied = true;
    }

    /// Let `n` pointer moves succeed, then fail every later one
    pub fn fail_mouse_move_after(&self, n: usize) {
        let mut state = self.lock();
        state.fail_moves_after = Some(state.moves + n);
    }

    /// Text of the first match, without going through the driver
    #[must_use]
    pub fn text(&self, selector: &Selector) -> Option<String> {
        let state = self.lock();
        state
            .dom
            .resolve(selector)
            .map(|i| state.dom.elements[i].1.text.clone())
    }

    /// Recorded calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Whether a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Whether [`PageDriver::close`] was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn record(&self, call: String) -> MutexGuard<'_, MockState> {
        let mut state = self.lock();
        state.history.push(call);
        state
    }

    fn release(state: &mut MockState) {
        let Some(press) = state.press.take() else {
            return;
        };
        let to = state.pointer.unwrap_or(press.from);
        let MockState {
            dom, drop_handlers, ..
        } = state;

        let mut source_key = None;
        if let Some(id) = press.source {
            source_key = dom.key(id).map(str::to_string);
            if let Some(el) = dom.element_mut(id) {
                if el.draggable && !el.reverts {
                    if let Some(b) = el.bbox {
                        el.bbox = Some(b.translated(to.x - press.from.x, to.y - press.from.y));
                    }
                }
            }
        }

        let event = DragEvent {
            source: source_key,
            from: press.from,
            to,
        };

        let mut targets: Vec<(usize, f64)> = drop_handlers
            .iter()
            .enumerate()
            .filter(|(_, (id, _))| Some(*id) != press.source)
            .filter_map(|(i, (id, _))| {
                let (_, el) = dom.elements.get(id.0)?;
                let b = el.rendered_box()?;
                b.contains(&to).then_some((i, b.area()))
            })
            .collect();
        targets.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (i, _) in targets {
            let (_, handler) = &mut drop_handlers[i];
            handler(&mut *dom, &event);
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> PlayprobeResult<()> {
        let mut state = self.record(format!("goto:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn reload(&self) -> PlayprobeResult<()> {
        let mut state = self.record("reload".to_string());
        let MockState {
            dom,
            reload_handlers,
            ..
        } = &mut *state;
        for handler in reload_handlers.iter_mut() {
            handler(&mut *dom);
        }
        Ok(())
    }

    async fn current_url(&self) -> PlayprobeResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn bring_to_front(&self) -> PlayprobeResult<()> {
        drop(self.record("bring_to_front".to_string()));
        Ok(())
    }

    async fn bounding_box(&self, selector: &Selector) -> PlayprobeResult<Option<BoundingBox>> {
        let state = self.lock();
        Ok(state
            .dom
            .resolve(selector)
            .and_then(|i| state.dom.elements[i].1.rendered_box()))
    }

    async fn text_content(&self, selector: &Selector) -> PlayprobeResult<Option<String>> {
        Ok(self.text(selector))
    }

    async fn input_value(&self, selector: &Selector) -> PlayprobeResult<Option<String>> {
        let state = self.lock();
        Ok(state
            .dom
            .resolve(selector)
            .and_then(|i| state.dom.elements[i].1.value.clone()))
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> PlayprobeResult<Option<String>> {
        let mut state = self.lock();
        let Some(i) = state.dom.resolve(selector) else {
            return Ok(None);
        };
        Ok(state.dom.elements[i]
            .1
            .attrs
            .get_mut(name)
            .and_then(AttrValue::read))
    }

    async fn is_visible(&self, selector: &Selector) -> PlayprobeResult<bool> {
        let state = self.lock();
        Ok(state
            .dom
            .resolve(selector)
            .is_some_and(|i| state.dom.elements[i].1.is_visible()))
    }

    async fn count(&self, selector: &Selector) -> PlayprobeResult<usize> {
        Ok(self.lock().dom.matches(selector).len())
    }

    async fn scroll_into_view(&self, selector: &Selector) -> PlayprobeResult<()> {
        drop(self.record(format!("scroll_into_view:{selector}")));
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> PlayprobeResult<()> {
        let mut state = self.record(format!("click:{selector}"));
        let index = state
            .dom
            .resolve(selector)
            .ok_or_else(|| PlayprobeError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        let (visible, bbox) = {
            let element = &state.dom.elements[index].1;
            (element.is_visible(), element.bbox)
        };
        if !visible {
            return Err(PlayprobeError::Input {
                message: format!("{selector} is not visible"),
            });
        }
        state.pointer = bbox.map(|b| b.center());

        let MockState {
            dom,
            click_handlers,
            ..
        } = &mut *state;
        for (id, handler) in click_handlers.iter_mut() {
            if id.0 == index {
                handler(&mut *dom);
            }
        }
        Ok(())
    }

    async fn mouse_move(&self, point: Point) -> PlayprobeResult<()> {
        let mut state = self.lock();
        if state.fail_moves_after.is_some_and(|limit| state.moves >= limit) {
            return Err(PlayprobeError::Input {
                message: format!("mouse_move to {point} rejected"),
            });
        }
        state.moves += 1;
        state.history.push(format!("mouse_move:{},{}", point.x, point.y));
        state.pointer = Some(point);
        Ok(())
    }

    async fn mouse_down(&self) -> PlayprobeResult<()> {
        let mut state = self.record("mouse_down".to_string());
        let from = state.pointer.unwrap_or(Point::new(0.0, 0.0));
        let source = state.dom.hit_test(&from);
        state.press = Some(Press { from, source });
        self.held.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn mouse_up(&self) -> PlayprobeResult<()> {
        let mut state = self.record("mouse_up".to_string());
        Self::release(&mut state);
        self.held.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn button_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    async fn wait_for_state(
        &self,
        selector: &Selector,
        state: ElementState,
        timeout: Duration,
    ) -> PlayprobeResult<()> {
        let description = format!("{selector} to be {state}");
        let options = WaitOptions::from(timeout).with_poll_interval(MOCK_POLL_INTERVAL_MS);
        wait::poll_until(&description, options, move || async move {
            let guard = self.lock();
            let found = guard.dom.resolve(selector);
            let visible = found.is_some_and(|i| guard.dom.elements[i].1.is_visible());
            Ok(state.is_satisfied(found.is_some(), visible))
        })
        .await
        .map(|_| ())
    }

    async fn wait_for_attribute(
        &self,
        selector: &Selector,
        name: &str,
        value: &str,
        timeout: Duration,
    ) -> PlayprobeResult<()> {
        let description = format!("{selector}[{name}] == {value:?}");
        let options = WaitOptions::from(timeout).with_poll_interval(MOCK_POLL_INTERVAL_MS);
        wait::poll_until(&description, options, move || async move {
            Ok(self.attribute(selector, name).await?.as_deref() == Some(value))
        })
        .await
        .map(|_| ())
    }

    async fn read_clipboard(&self) -> PlayprobeResult<String> {
        let state = self.record("read_clipboard".to_string());
        if state.dom.clipboard_denied {
            return Err(PlayprobeError::Clipboard {
                message: "permission denied".to_string(),
            });
        }
        Ok(state.dom.clipboard.clone())
    }

    async fn close(&self) -> PlayprobeResult<()> {
        let mut state = self.record("close".to_string());
        state.closed = true;
        Ok(())
    }
}
