//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`BrowserSession`] launches Chromium through
//! chromiumoxide and hands out one [`CdpPage`] per isolated browser context,
//! with the configured permissions granted on that context. Without the
//! feature only [`BrowserConfig`] is available and pages come from
//! [`crate::mock`].

use crate::config::{Permission, SuiteConfig};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Extra command line flags
    pub args: Vec<String>,
    /// Permissions granted to every context
    pub permissions: Vec<Permission>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::from(&SuiteConfig::default())
    }
}

impl From<&SuiteConfig> for BrowserConfig {
    fn from(config: &SuiteConfig) -> Self {
        Self {
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            chromium_path: config.chromium_path.clone(),
            sandbox: config.sandbox,
            args: config.launch_args.clone(),
            permissions: config.permissions.clone(),
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Add a command line flag
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::BrowserConfig;
    use crate::config::Permission;
    use crate::driver::{PageDriver, PageFactory};
    use crate::locator::{BoundingBox, Point, Selector};
    use crate::result::{PlayprobeError, PlayprobeResult};
    use crate::wait::{self, Deadline, ElementState, WaitOptions};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::browser::{
        BrowserContextId, GrantPermissionsParams, PermissionType,
    };
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
    };
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex as StdMutex, PoisonError};
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Rendered, non-empty, not `visibility: hidden` / `display: none`.
    const VISIBLE_JS: &str = "const r = el.getBoundingClientRect(); \
const s = getComputedStyle(el); \
const visible = r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';";

    const STATE_POLL_INTERVAL_MS: u64 = 50;

    fn input_err(e: impl std::fmt::Display) -> PlayprobeError {
        PlayprobeError::Input {
            message: e.to_string(),
        }
    }

    fn eval_err(e: impl std::fmt::Display) -> PlayprobeError {
        PlayprobeError::Evaluation {
            message: e.to_string(),
        }
    }

    fn page_err(e: impl std::fmt::Display) -> PlayprobeError {
        PlayprobeError::Page {
            message: e.to_string(),
        }
    }

    const fn permission_types(permission: Permission) -> &'static [PermissionType] {
        match permission {
            Permission::ClipboardRead => &[PermissionType::ClipboardReadWrite],
            Permission::ClipboardWrite => &[PermissionType::ClipboardSanitizedWrite],
        }
    }

    /// A launched Chromium process
    #[derive(Debug)]
    pub struct BrowserSession {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl BrowserSession {
        /// Launch a new browser instance with real CDP
        pub async fn launch(config: BrowserConfig) -> PlayprobeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .args(config.args.clone());

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| PlayprobeError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| PlayprobeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!(error = %e, "cdp handler event error");
                    }
                }
            });

            tracing::info!(
                headless = config.headless,
                sandbox = config.sandbox,
                "browser launched"
            );

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> PlayprobeResult<()> {
            {
                let mut browser = self.inner.lock().await;
                browser.close().await.map_err(page_err)?;
                let _ = browser.wait().await;
            }
            self.handle.abort();
            tracing::info!("browser closed");
            Ok(())
        }

        async fn grant_permissions(
            &self,
            browser: &CdpBrowser,
            context: &BrowserContextId,
        ) -> PlayprobeResult<()> {
            if self.config.permissions.is_empty() {
                return Ok(());
            }
            let permissions: Vec<PermissionType> = self
                .config
                .permissions
                .iter()
                .flat_map(|p| permission_types(*p).iter().cloned())
                .collect();
            let params = GrantPermissionsParams::builder()
                .permissions(permissions)
                .browser_context_id(context.clone())
                .build()
                .map_err(page_err)?;
            browser.execute(params).await.map_err(page_err)?;
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for BrowserSession {
        async fn open_page(&self) -> PlayprobeResult<Box<dyn PageDriver>> {
            let browser = self.inner.lock().await;
            let context = browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map_err(page_err)?
                .result
                .browser_context_id;

            self.grant_permissions(&browser, &context).await?;

            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context.clone())
                .build()
                .map_err(page_err)?;
            let page = browser.new_page(target).await.map_err(page_err)?;
            tracing::debug!(context = ?context, "opened page in fresh context");

            Ok(Box::new(CdpPage {
                page,
                context,
                browser: Arc::clone(&self.inner),
                pointer: StdMutex::new(Point::new(0.0, 0.0)),
                held: AtomicBool::new(false),
            }))
        }
    }

    /// A page in its own browser context
    #[derive(Debug)]
    pub struct CdpPage {
        page: Page,
        context: BrowserContextId,
        browser: Arc<Mutex<CdpBrowser>>,
        pointer: StdMutex<Point>,
        held: AtomicBool,
    }

    impl CdpPage {
        /// Evaluate `expression` (awaiting promises) and decode its JSON value
        async fn eval<T: DeserializeOwned>(&self, expression: &str) -> PlayprobeResult<T> {
            let wrapped = format!(
                "(async () => {{ const v = await ({expression}); return JSON.stringify(v === undefined ? null : v); }})()"
            );
            let params = EvaluateParams::builder()
                .expression(wrapped)
                .await_promise(true)
                .return_by_value(true)
                .build()
                .map_err(eval_err)?;
            let json: String = self
                .page
                .evaluate_expression(params)
                .await
                .map_err(eval_err)?
                .into_value()
                .map_err(eval_err)?;
            Ok(serde_json::from_str(&json)?)
        }

        fn pointer(&self) -> Point {
            *self.pointer.lock().unwrap_or_else(PoisonError::into_inner)
        }

        async fn dispatch_mouse(
            &self,
            kind: DispatchMouseEventType,
            at: Point,
            buttons: i64,
        ) -> PlayprobeResult<()> {
            let params = DispatchMouseEventParams::builder()
                .r#type(kind)
                .x(at.x)
                .y(at.y)
                .button(MouseButton::Left)
                .buttons(buttons)
                .click_count(1)
                .build()
                .map_err(input_err)?;
            self.page.execute(params).await.map_err(input_err)?;
            Ok(())
        }

        async fn state_of(&self, selector: &Selector) -> PlayprobeResult<(bool, bool)> {
            let script = selector.with_element(&format!("{VISIBLE_JS} return visible;"));
            let visible: Option<bool> = self.eval(&script).await?;
            Ok((visible.is_some(), visible.unwrap_or(false)))
        }
    }

    #[async_trait]
    impl PageDriver for CdpPage {
        async fn goto(&self, url: &str) -> PlayprobeResult<()> {
            tracing::debug!(url, "goto");
            self.page
                .goto(url)
                .await
                .map_err(|e| PlayprobeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn reload(&self) -> PlayprobeResult<()> {
            self.page.reload().await.map_err(page_err)?;
            Ok(())
        }

        async fn current_url(&self) -> PlayprobeResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_err)?
                .unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn bring_to_front(&self) -> PlayprobeResult<()> {
            self.page.bring_to_front().await.map_err(page_err)?;
            Ok(())
        }

        async fn bounding_box(&self, selector: &Selector) -> PlayprobeResult<Option<BoundingBox>> {
            let script = selector.with_element(&format!(
                "{VISIBLE_JS} if (!visible) {{ return null; }} \
return {{ x: r.x, y: r.y, width: r.width, height: r.height }};"
            ));
            self.eval(&script).await
        }

        async fn text_content(&self, selector: &Selector) -> PlayprobeResult<Option<String>> {
            self.eval(&selector.with_element("return el.textContent;"))
                .await
        }

        async fn input_value(&self, selector: &Selector) -> PlayprobeResult<Option<String>> {
            self.eval(&selector.with_element("return el.value ?? null;"))
                .await
        }

        async fn attribute(&self, selector: &Selector, name: &str) -> PlayprobeResult<Option<String>> {
            let name = serde_json::to_string(name)?;
            self.eval(&selector.with_element(&format!("return el.getAttribute({name});")))
                .await
        }

        async fn is_visible(&self, selector: &Selector) -> PlayprobeResult<bool> {
            Ok(self.state_of(selector).await?.1)
        }

        async fn count(&self, selector: &Selector) -> PlayprobeResult<usize> {
            self.eval(&selector.to_count_query()).await
        }

        async fn scroll_into_view(&self, selector: &Selector) -> PlayprobeResult<()> {
            let _: Option<bool> = self
                .eval(&selector.with_element(
                    "el.scrollIntoView({ block: 'center', inline: 'center' }); return true;",
                ))
                .await?;
            Ok(())
        }

        async fn click(&self, selector: &Selector) -> PlayprobeResult<()> {
            self.scroll_into_view(selector).await?;
            let center = self
                .bounding_box(selector)
                .await?
                .ok_or_else(|| PlayprobeError::missing_geometry(selector.to_string()))?
                .center();
            tracing::debug!(selector = %selector, at = %center, "click");
            self.dispatch_mouse(DispatchMouseEventType::MouseMoved, center, 0)
                .await?;
            self.dispatch_mouse(DispatchMouseEventType::MousePressed, center, 1)
                .await?;
            self.dispatch_mouse(DispatchMouseEventType::MouseReleased, center, 0)
                .await?;
            *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = center;
            Ok(())
        }

        async fn mouse_move(&self, point: Point) -> PlayprobeResult<()> {
            let buttons = i64::from(self.button_held());
            self.dispatch_mouse(DispatchMouseEventType::MouseMoved, point, buttons)
                .await?;
            *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = point;
            Ok(())
        }

        async fn mouse_down(&self) -> PlayprobeResult<()> {
            self.dispatch_mouse(DispatchMouseEventType::MousePressed, self.pointer(), 1)
                .await?;
            self.held.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn mouse_up(&self) -> PlayprobeResult<()> {
            let released = self
                .dispatch_mouse(DispatchMouseEventType::MouseReleased, self.pointer(), 0)
                .await;
            self.held.store(false, Ordering::SeqCst);
            released
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
            let options = WaitOptions::from(timeout).with_poll_interval(STATE_POLL_INTERVAL_MS);
            wait::poll_until(&description, options, move || async move {
                let (attached, visible) = self.state_of(selector).await?;
                Ok(state.is_satisfied(attached, visible))
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
            let deadline = Deadline::after(timeout);
            self.wait_for_state(selector, ElementState::Attached, timeout)
                .await?;
            if deadline.is_expired() {
                return Err(PlayprobeError::timeout(deadline.budget_ms(), description));
            }

            let remaining = deadline.remaining();
            let remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
            let name_js = serde_json::to_string(name)?;
            let value_js = serde_json::to_string(value)?;
            let script = selector.with_element(&format!(
                "return new Promise((resolve) => {{ \
const matches = () => el.getAttribute({name_js}) === {value_js}; \
if (matches()) {{ resolve(true); return; }} \
const observer = new MutationObserver(() => {{ \
if (matches()) {{ observer.disconnect(); resolve(true); }} }}); \
observer.observe(el, {{ attributes: true, attributeFilter: [{name_js}] }}); \
setTimeout(() => {{ observer.disconnect(); resolve(false); }}, {remaining_ms}); }});"
            ));

            let reached: Option<bool> = wait::with_deadline(
                &description,
                remaining + Duration::from_millis(STATE_POLL_INTERVAL_MS),
                self.eval(&script),
            )
            .await?;
            if reached == Some(true) {
                Ok(())
            } else {
                Err(PlayprobeError::timeout(deadline.budget_ms(), description))
            }
        }

        async fn read_clipboard(&self) -> PlayprobeResult<String> {
            self.bring_to_front().await?;
            self.eval("navigator.clipboard.readText()")
                .await
                .map_err(|e| PlayprobeError::Clipboard {
                    message: e.to_string(),
                })
        }

        async fn close(&self) -> PlayprobeResult<()> {
            self.page.clone().close().await.map_err(page_err)?;
            let browser = self.browser.lock().await;
            browser
                .execute(DisposeBrowserContextParams::new(self.context.clone()))
                .await
                .map_err(page_err)?;
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{BrowserSession, CdpPage};
