//! The demo QA droppable page: four drag-and-drop widgets behind tabs.
//!
//! | Tab | Widget |
//! |-----|--------|
//! | 0 | simple drop target |
//! | 1 | target that accepts only `#acceptable` |
//! | 2 | nested greedy and non-greedy targets |
//! | 3 | reverting and non-reverting draggables |
//!
//! Geometry is re-read after every drag; a box captured before a drop says
//! nothing about where the element is afterwards.

use std::time::Duration;

use async_trait::async_trait;

use super::{Scenario, Suite};
use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::expect::{assert_moved, assert_same_position, expect};
use crate::locator::Locator;
use crate::pointer::{self, DragOptions, DropExpectation, Gesture};
use crate::result::PlayprobeResult;
use crate::wait::ElementState;

/// Tab links on the droppable page
pub const TAB_LINKS: &str = "nav.nav-tabs a";

/// Text a drop target shows after accepting a drop
pub const DROPPED: &str = "Dropped!";

/// Text an untouched outer target shows
pub const OUTER_DROPPABLE: &str = "Outer droppable";

const SIMPLE_PANE: &str = "#droppableExample-tabpane-simple";
const ACCEPT_PANE: &str = "#droppableExample-tabpane-accept";
const PROPAGATION_PANE: &str = "#droppableExample-tabpane-preventPropogation";
const REVERT_PANE: &str = "#droppableExample-tabpane-revertable";

/// Locator for `selector` inside a tab pane
fn in_pane(pane: &str, selector: &str) -> Locator {
    Locator::new(format!("{pane} {selector}"))
}

/// Options for the nested propagation widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Check that a drop inside the greedy inner target leaves the outer one untouched
    pub verify_contained_drop: bool,
    /// Pixels below the greedy outer target's top edge to drop at
    pub outer_edge_offset: u32,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            verify_contained_drop: true,
            outer_edge_offset: 10,
        }
    }
}

/// Options for the revert widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevertOptions {
    /// Wait for the revert animation to finish
    pub revert_settle: Duration,
    /// Wait after a drag that should not revert
    pub settle: Duration,
    /// Pixels two boxes may differ by and still count as the same position
    pub tolerance: f64,
}

impl Default for RevertOptions {
    fn default() -> Self {
        Self {
            revert_settle: Duration::from_secs(2),
            settle: Duration::from_secs(1),
            tolerance: 1.0,
        }
    }
}

/// Simple tab: drag onto the target with the high-level primitive
pub async fn simple_drag(
    page: &dyn PageDriver,
    source: &Locator,
    target: &Locator,
    drag: DragOptions,
    expect_timeout: Duration,
) -> PlayprobeResult<()> {
    source.drag_to(page, target, drag).await?;
    expect(target)
        .with_timeout(expect_timeout)
        .to_contain_text(DROPPED)
        .verify(page)
        .await?;
    tracing::info!("simple tab is completed");
    Ok(())
}

/// Accept tab: the rejected source never marks the target, the accepted one does
pub async fn accept_drag(
    page: &dyn PageDriver,
    acceptable: &Locator,
    not_acceptable: &Locator,
    target: &Locator,
    expect_timeout: Duration,
) -> PlayprobeResult<()> {
    let not_acceptable_box = not_acceptable.bounding_box(page).await?;

    pointer::drag(
        page,
        not_acceptable_box,
        target,
        DropExpectation::Rejected,
        expect_timeout,
    )
    .await?;
    expect(target)
        .with_timeout(expect_timeout)
        .not_to_contain_text(DROPPED)
        .verify(page)
        .await?;
    tracing::info!("not acceptable dragging");

    let acceptable_box = acceptable.bounding_box(page).await?;
    pointer::drag(
        page,
        acceptable_box,
        target,
        DropExpectation::Accepted,
        expect_timeout,
    )
    .await?;
    tracing::info!("acceptable dragging");
    Ok(())
}

/// Selectors of the propagation widget
#[derive(Debug, Clone)]
pub struct PropagationTargets {
    /// The draggable box
    pub drag_box: Locator,
    /// Non-greedy outer target
    pub not_greedy_outer: Locator,
    /// Non-greedy inner target
    pub not_greedy_inner: Locator,
    /// Greedy outer target
    pub greedy_outer: Locator,
    /// Greedy inner target
    pub greedy_inner: Locator,
}

impl PropagationTargets {
    fn in_pane(pane: &str) -> Self {
        Self {
            drag_box: in_pane(pane, "#dragBox"),
            not_greedy_outer: in_pane(pane, "#notGreedyDropBox"),
            not_greedy_inner: in_pane(pane, "#notGreedyDropBox #notGreedyInnerDropBox"),
            greedy_outer: in_pane(pane, "#greedyDropBox"),
            greedy_inner: in_pane(pane, "#greedyDropBox #greedyDropBoxInner"),
        }
    }
}

/// Prevent-propagation tab
pub async fn prevent_propagation(
    page: &dyn PageDriver,
    targets: &PropagationTargets,
    options: PropagationOptions,
    expect_timeout: Duration,
) -> PlayprobeResult<()> {
    let contains = |locator: &Locator, text: &'static str| {
        expect(locator)
            .with_timeout(expect_timeout)
            .to_contain_text(text)
    };

    // Fully inside the greedy inner target.
    let from = targets.drag_box.require_box(page).await?.center();
    let to = targets.greedy_inner.require_box(page).await?.center();
    pointer::press_and_release(page, &Gesture::single(from, to)).await?;
    if options.verify_contained_drop {
        contains(&targets.greedy_inner, DROPPED).verify(page).await?;
        contains(&targets.greedy_outer, OUTER_DROPPABLE)
            .verify(page)
            .await?;
    }

    // Inside the greedy outer target, above the inner one.
    let from = targets.drag_box.require_box(page).await?.center();
    let to = targets
        .greedy_outer
        .require_box(page)
        .await?
        .top_center(f64::from(options.outer_edge_offset));
    pointer::press_and_release(page, &Gesture::single(from, to)).await?;
    contains(&targets.greedy_inner, DROPPED).verify(page).await?;
    contains(&targets.greedy_outer, DROPPED).verify(page).await?;

    targets
        .drag_box
        .drag_to(page, &targets.not_greedy_inner, DragOptions::default())
        .await?;
    contains(&targets.not_greedy_outer, DROPPED)
        .verify(page)
        .await?;
    contains(&targets.not_greedy_inner, DROPPED)
        .verify(page)
        .await?;
    tracing::info!("prevent propagation tab is completed");
    Ok(())
}

/// Revert tab
pub async fn revert_draggable(
    page: &dyn PageDriver,
    revertable: &Locator,
    not_revertable: &Locator,
    target: &Locator,
    options: RevertOptions,
) -> PlayprobeResult<()> {
    let before = revertable.require_box(page).await?;
    let drop_at = target.require_box(page).await?.center();
    pointer::drag_between(page, before.center(), drop_at).await?;
    tokio::time::sleep(options.revert_settle).await;
    let after = revertable.require_box(page).await?;
    assert_same_position("revertable after drop", &before, &after, options.tolerance)?;

    let original = not_revertable.require_box(page).await?;
    not_revertable
        .drag_to(page, target, DragOptions::default())
        .await?;
    tokio::time::sleep(options.settle).await;
    let dropped = not_revertable.require_box(page).await?;
    assert_moved("notRevertable after drop", &original, &dropped, options.tolerance)?;

    pointer::drag_between(page, dropped.center(), original.top_left()).await?;
    let moved_back = not_revertable.require_box(page).await?;
    tokio::time::sleep(options.settle).await;
    let settled = not_revertable.require_box(page).await?;
    assert_same_position(
        "notRevertable after drag back",
        &moved_back,
        &settled,
        options.tolerance,
    )?;
    tracing::info!("revert draggable tab is completed");
    Ok(())
}

/// Visit every droppable tab and run its widget
#[derive(Debug, Clone, Copy, Default)]
pub struct Droppable {
    /// Steps for high-level drags
    pub drag: DragOptions,
    /// Propagation widget options
    pub propagation: PropagationOptions,
    /// Revert widget options
    pub revert: RevertOptions,
}

#[async_trait]
impl Scenario for Droppable {
    fn name(&self) -> &'static str {
        "Droppable test"
    }

    fn suite(&self) -> Suite {
        Suite::DemoQa
    }

    async fn run(&self, page: &dyn PageDriver, config: &SuiteConfig) -> PlayprobeResult<()> {
        page.goto(&config.demoqa_page("droppable")).await?;
        let expect_timeout = config.expect_timeout();

        let tabs = Locator::new(TAB_LINKS).with_timeout(expect_timeout);
        tabs.nth(0).wait_for(page, ElementState::Visible).await?;
        let count = tabs.count(page).await?;
        tracing::debug!(tabs = count, "droppable tabs");

        for index in 0..count.min(4) {
            tabs.nth(index).click(page).await?;
            page.bring_to_front().await?;

            match index {
                0 => {
                    simple_drag(
                        page,
                        &in_pane(SIMPLE_PANE, "#draggable"),
                        &in_pane(SIMPLE_PANE, "#droppable"),
                        self.drag,
                        expect_timeout,
                    )
                    .await?;
                }
                1 => {
                    accept_drag(
                        page,
                        &in_pane(ACCEPT_PANE, "#acceptable"),
                        &in_pane(ACCEPT_PANE, "#notAcceptable"),
                        &in_pane(ACCEPT_PANE, "#droppable"),
                        expect_timeout,
                    )
                    .await?;
                }
                2 => {
                    prevent_propagation(
                        page,
                        &PropagationTargets::in_pane(PROPAGATION_PANE),
                        self.propagation,
                        expect_timeout,
                    )
                    .await?;
                }
                _ => {
                    revert_draggable(
                        page,
                        &in_pane(REVERT_PANE, "#revertable"),
                        &in_pane(REVERT_PANE, "#notRevertable"),
                        &in_pane(REVERT_PANE, "#droppable"),
                        self.revert,
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{BoundingBox, Selector};
    use crate::mock::{MockElement, MockPage};
    use crate::result::PlayprobeError;

    fn key(pane: &str, selector: &str) -> String {
        format!("{pane} {selector}")
    }

    fn config() -> SuiteConfig {
        SuiteConfig::default().with_expect_timeout_ms(150)
    }

    fn fast_revert() -> RevertOptions {
        RevertOptions {
            revert_settle: Duration::from_millis(5),
            settle: Duration::from_millis(5),
            tolerance: 1.0,
        }
    }

    /// Widget behaviour the fixture can be configured to get wrong
    #[derive(Clone, Copy)]
    struct Site {
        tabs: usize,
        accept_anything: bool,
        rejected_drop_shifts_layout: bool,
        greedy: bool,
        greedy_outer_registers: bool,
        not_greedy_outer_registers: bool,
        revert_works: bool,
        not_revertable_reverts: bool,
    }

    impl Default for Site {
        fn default() -> Self {
            Self {
                tabs: 4,
                accept_anything: false,
                rejected_drop_shifts_layout: false,
                greedy: true,
                greedy_outer_registers: true,
                not_greedy_outer_registers: true,
                revert_works: true,
                not_revertable_reverts: false,
            }
        }
    }

    fn droppable_site(site: Site) -> MockPage {
        let page = MockPage::new();
        for i in 0..site.tabs {
            page.insert(
                TAB_LINKS,
                MockElement::new(BoundingBox::new(i as f64 * 100.0, -60.0, 90.0, 40.0)),
            );
        }

        // Simple
        page.insert(
            key(SIMPLE_PANE, "#draggable"),
            MockElement::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0)).draggable(),
        );
        let simple_target = page.insert(
            key(SIMPLE_PANE, "#droppable"),
            MockElement::new(BoundingBox::new(300.0, 0.0, 150.0, 150.0)).with_text("Drop here"),
        );
        page.on_drop(simple_target, |dom, _| {
            dom.set_text(&key(SIMPLE_PANE, "#droppable"), DROPPED);
        });

        // Accept
        page.insert(
            key(ACCEPT_PANE, "#acceptable"),
            MockElement::new(BoundingBox::new(0.0, 300.0, 100.0, 100.0)).draggable(),
        );
        page.insert(
            key(ACCEPT_PANE, "#notAcceptable"),
            MockElement::new(BoundingBox::new(0.0, 420.0, 100.0, 100.0)).draggable(),
        );
        let accept_target = page.insert(
            key(ACCEPT_PANE, "#droppable"),
            MockElement::new(BoundingBox::new(300.0, 300.0, 150.0, 150.0)).with_text("Drop here"),
        );
        let accept_anything = site.accept_anything;
        let accepted = key(ACCEPT_PANE, "#acceptable");
        let shifts_layout = site.rejected_drop_shifts_layout;
        page.on_drop(accept_target, move |dom, event| {
            if accept_anything || event.source.as_deref() == Some(accepted.as_str()) {
                dom.set_text(&key(ACCEPT_PANE, "#droppable"), DROPPED);
            } else if shifts_layout {
                dom.set_box(&accepted, BoundingBox::new(0.0, 540.0, 100.0, 100.0));
            }
        });

        // Prevent propagation
        page.insert(
            key(PROPAGATION_PANE, "#dragBox"),
            MockElement::new(BoundingBox::new(0.0, 600.0, 50.0, 50.0)).draggable(),
        );
        let outer_text = |t: &str| format!("{OUTER_DROPPABLE} {t}");
        let not_greedy_outer = page.insert(
            key(PROPAGATION_PANE, "#notGreedyDropBox"),
            MockElement::new(BoundingBox::new(100.0, 600.0, 300.0, 300.0))
                .with_text(outer_text("Inner droppable (not greedy)")),
        );
        let not_greedy_inner = page.insert(
            key(PROPAGATION_PANE, "#notGreedyDropBox #notGreedyInnerDropBox"),
            MockElement::new(BoundingBox::new(150.0, 700.0, 150.0, 100.0))
                .with_text("Inner droppable (not greedy)"),
        );
        let greedy_outer = page.insert(
            key(PROPAGATION_PANE, "#greedyDropBox"),
            MockElement::new(BoundingBox::new(450.0, 600.0, 300.0, 300.0))
                .with_text(outer_text("Inner droppable (greedy)")),
        );
        let greedy_inner = page.insert(
            key(PROPAGATION_PANE, "#greedyDropBox #greedyDropBoxInner"),
            MockElement::new(BoundingBox::new(500.0, 700.0, 150.0, 100.0))
                .with_text("Inner droppable (greedy)"),
        );
        let not_greedy_registers = site.not_greedy_outer_registers;
        page.on_drop(not_greedy_outer, move |dom, _| {
            if not_greedy_registers {
                dom.set_text(&key(PROPAGATION_PANE, "#notGreedyDropBox"), DROPPED);
            }
        });
        page.on_drop(not_greedy_inner, |dom, _| {
            dom.set_text(
                &key(PROPAGATION_PANE, "#notGreedyDropBox #notGreedyInnerDropBox"),
                DROPPED,
            );
        });
        let greedy = site.greedy;
        let inner_box = BoundingBox::new(500.0, 700.0, 150.0, 100.0);
        let greedy_registers = site.greedy_outer_registers;
        page.on_drop(greedy_outer, move |dom, event| {
            if greedy_registers && (!greedy || !inner_box.contains(&event.to)) {
                dom.set_text(&key(PROPAGATION_PANE, "#greedyDropBox"), DROPPED);
            }
        });
        page.on_drop(greedy_inner, |dom, _| {
            dom.set_text(
                &key(PROPAGATION_PANE, "#greedyDropBox #greedyDropBoxInner"),
                DROPPED,
            );
        });

        // Revert
        let revertable = MockElement::new(BoundingBox::new(0.0, 1100.0, 100.0, 100.0));
        page.insert(
            key(REVERT_PANE, "#revertable"),
            if site.revert_works {
                revertable.reverting()
            } else {
                revertable.draggable()
            },
        );
        let not_revertable = MockElement::new(BoundingBox::new(0.0, 1220.0, 100.0, 100.0));
        page.insert(
            key(REVERT_PANE, "#notRevertable"),
            if site.not_revertable_reverts {
                not_revertable.reverting()
            } else {
                not_revertable.draggable()
            },
        );
        let revert_target = page.insert(
            key(REVERT_PANE, "#droppable"),
            MockElement::new(BoundingBox::new(300.0, 1100.0, 150.0, 150.0)).with_text("Drop here"),
        );
        page.on_drop(revert_target, |dom, _| {
            dom.set_text(&key(REVERT_PANE, "#droppable"), DROPPED);
        });

        page
    }

    fn scenario() -> Droppable {
        Droppable {
            revert: fast_revert(),
            ..Droppable::default()
        }
    }

    fn text(page: &MockPage, pane: &str, selector: &str) -> String {
        page.text(&Selector::css(key(pane, selector)))
            .unwrap_or_default()
    }

    mod full_page_tests {
        use super::*;

        #[tokio::test]
        async fn test_all_tabs_pass() {
            let page = droppable_site(Site::default());
            scenario().run(&page, &config()).await.unwrap();

            assert_eq!(
                page.current_url().await.unwrap(),
                "https://demoqa.com/droppable"
            );
            for i in 0..4 {
                assert!(page.was_called(&format!("click:{TAB_LINKS} >> nth={i}")));
            }
            assert_eq!(
                page.history()
                    .iter()
                    .filter(|c| c.as_str() == "bring_to_front")
                    .count(),
                4
            );
            assert!(!page.button_held());
        }

        #[tokio::test]
        async fn test_fewer_tabs_runs_fewer_widgets() {
            let page = droppable_site(Site {
                tabs: 2,
                ..Site::default()
            });
            scenario().run(&page, &config()).await.unwrap();
            assert_eq!(text(&page, SIMPLE_PANE, "#droppable"), DROPPED);
            assert_eq!(text(&page, ACCEPT_PANE, "#droppable"), DROPPED);
            assert_eq!(text(&page, REVERT_PANE, "#droppable"), "Drop here");
        }

        #[tokio::test]
        async fn test_page_without_tabs_fails() {
            let page = MockPage::new();
            let err = scenario().run(&page, &config()).await.unwrap_err();
            assert!(matches!(err, PlayprobeError::Timeout { .. }));
        }

        #[tokio::test]
        async fn test_uses_demoqa_base_url() {
            let page = droppable_site(Site::default());
            let config = config().with_demoqa_url("http://127.0.0.1:3000");
            scenario().run(&page, &config).await.unwrap();
            assert!(page.was_called("goto:http://127.0.0.1:3000/droppable"));
        }
    }

    mod simple_tests {
        use super::*;

        #[tokio::test]
        async fn test_simple_drag_marks_target() {
            let page = droppable_site(Site::default());
            simple_drag(
                &page,
                &in_pane(SIMPLE_PANE, "#draggable"),
                &in_pane(SIMPLE_PANE, "#droppable"),
                DragOptions::default(),
                Duration::from_millis(100),
            )
            .await
            .unwrap();
            assert_eq!(text(&page, SIMPLE_PANE, "#droppable"), DROPPED);
        }
    }

    mod accept_tests {
        use super::*;

        async fn run(site: Site) -> PlayprobeResult<()> {
            let page = droppable_site(site);
            accept_drag(
                &page,
                &in_pane(ACCEPT_PANE, "#acceptable"),
                &in_pane(ACCEPT_PANE, "#notAcceptable"),
                &in_pane(ACCEPT_PANE, "#droppable"),
                Duration::from_millis(100),
            )
            .await
        }

        #[tokio::test]
        async fn test_only_acceptable_is_accepted() {
            run(Site::default()).await.unwrap();
        }

        #[tokio::test]
        async fn test_target_accepting_anything_fails() {
            let err = run(Site {
                accept_anything: true,
                ..Site::default()
            })
            .await
            .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("Drop here"));
        }

        #[tokio::test]
        async fn test_acceptable_box_is_read_after_rejected_drop() {
            let page = droppable_site(Site {
                rejected_drop_shifts_layout: true,
                ..Site::default()
            });
            accept_drag(
                &page,
                &in_pane(ACCEPT_PANE, "#acceptable"),
                &in_pane(ACCEPT_PANE, "#notAcceptable"),
                &in_pane(ACCEPT_PANE, "#droppable"),
                Duration::from_millis(100),
            )
            .await
            .unwrap();
            assert!(page.was_called("mouse_move:50,590"));
            assert_eq!(text(&page, ACCEPT_PANE, "#droppable"), DROPPED);
        }

        #[tokio::test]
        async fn test_missing_source_is_missing_geometry() {
            let page = droppable_site(Site::default());
            let err = accept_drag(
                &page,
                &in_pane(ACCEPT_PANE, "#acceptable"),
                &in_pane(ACCEPT_PANE, "#gone"),
                &in_pane(ACCEPT_PANE, "#droppable"),
                Duration::from_millis(100),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, PlayprobeError::MissingGeometry { .. }));
        }
    }

    mod propagation_tests {
        use super::*;

        async fn run(site: Site, options: PropagationOptions) -> PlayprobeResult<MockPage> {
            let page = droppable_site(site);
            prevent_propagation(
                &page,
                &PropagationTargets::in_pane(PROPAGATION_PANE),
                options,
                Duration::from_millis(100),
            )
            .await?;
            Ok(page)
        }

        #[tokio::test]
        async fn test_greedy_and_not_greedy_targets() {
            let page = run(Site::default(), PropagationOptions::default())
                .await
                .unwrap();
            for selector in [
                "#greedyDropBox",
                "#greedyDropBox #greedyDropBoxInner",
                "#notGreedyDropBox",
                "#notGreedyDropBox #notGreedyInnerDropBox",
            ] {
                assert_eq!(text(&page, PROPAGATION_PANE, selector), DROPPED);
            }
        }

        #[tokio::test]
        async fn test_contained_drop_that_leaks_to_outer_fails() {
            let err = run(
                Site {
                    greedy: false,
                    ..Site::default()
                },
                PropagationOptions::default(),
            )
            .await
            .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains(OUTER_DROPPABLE));
        }

        #[tokio::test]
        async fn test_greedy_outer_that_never_registers_fails_edge_drop() {
            let page = droppable_site(Site {
                greedy_outer_registers: false,
                ..Site::default()
            });
            let err = prevent_propagation(
                &page,
                &PropagationTargets::in_pane(PROPAGATION_PANE),
                PropagationOptions::default(),
                Duration::from_millis(100),
            )
            .await
            .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains(DROPPED));
            // Failed on the edge drop, before the not-greedy pair was touched.
            assert!(
                text(&page, PROPAGATION_PANE, "#notGreedyDropBox").starts_with(OUTER_DROPPABLE)
            );
            assert!(!page.button_held());
        }

        #[tokio::test]
        async fn test_not_greedy_outer_that_never_registers_fails_last_step() {
            let page = droppable_site(Site {
                not_greedy_outer_registers: false,
                ..Site::default()
            });
            let err = prevent_propagation(
                &page,
                &PropagationTargets::in_pane(PROPAGATION_PANE),
                PropagationOptions::default(),
                Duration::from_millis(100),
            )
            .await
            .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains(DROPPED));
            // Both greedy steps completed first.
            assert_eq!(text(&page, PROPAGATION_PANE, "#greedyDropBox"), DROPPED);
            assert_eq!(
                text(&page, PROPAGATION_PANE, "#notGreedyDropBox #notGreedyInnerDropBox"),
                DROPPED
            );
        }

        #[tokio::test]
        async fn test_contained_drop_unchecked_when_disabled() {
            run(
                Site {
                    greedy: false,
                    ..Site::default()
                },
                PropagationOptions {
                    verify_contained_drop: false,
                    ..PropagationOptions::default()
                },
            )
            .await
            .unwrap();
        }

        #[tokio::test]
        async fn test_second_drag_starts_from_current_box() {
            let page = run(Site::default(), PropagationOptions::default())
                .await
                .unwrap();
            let downs: Vec<String> = page
                .history()
                .windows(2)
                .filter(|w| w[1] == "mouse_down")
                .map(|w| w[0].clone())
                .collect();
            // First press at the original box centre, second where the first drop left it.
            assert_eq!(downs[0], "mouse_move:25,625");
            assert_eq!(downs[1], "mouse_move:575,750");
        }
    }

    mod revert_tests {
        use super::*;

        async fn run(site: Site) -> PlayprobeResult<()> {
            let page = droppable_site(site);
            revert_draggable(
                &page,
                &in_pane(REVERT_PANE, "#revertable"),
                &in_pane(REVERT_PANE, "#notRevertable"),
                &in_pane(REVERT_PANE, "#droppable"),
                fast_revert(),
            )
            .await
        }

        #[tokio::test]
        async fn test_revert_and_stable_drag_back() {
            run(Site::default()).await.unwrap();
        }

        #[tokio::test]
        async fn test_element_that_stays_dropped_fails_revert_check() {
            let err = run(Site {
                revert_works: false,
                ..Site::default()
            })
            .await
            .unwrap_err();
            assert!(err.to_string().contains("revertable after drop"));
        }

        #[tokio::test]
        async fn test_element_that_snaps_back_fails_move_check() {
            let err = run(Site {
                not_revertable_reverts: true,
                ..Site::default()
            })
            .await
            .unwrap_err();
            assert!(err.to_string().contains("notRevertable after drop"));
        }
    }
}
