//! Pointer simulation: manual drag gestures and the high-level drag-to.
//!
//! Every gesture goes through [`press_and_release`], which releases the left
//! button on every path once it has been pressed. A failed intermediate move
//! is reported after the release, never instead of it.

use std::time::Duration;

use crate::driver::PageDriver;
use crate::expect::expect;
use crate::locator::{BoundingBox, Locator, Point};
use crate::result::{PlayprobeError, PlayprobeResult};

/// Selector reported when a drag starts without a source box
pub const DRAG_SOURCE: &str = "<drag source>";

/// Default number of interpolated moves for [`drag_and_drop`]
pub const DEFAULT_DRAG_STEPS: u32 = 5;

/// What the drop target must show after a manual drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropExpectation {
    /// The target accepted the drop
    Accepted,
    /// The target refused the drop
    Rejected,
}

impl DropExpectation {
    /// Text the target contains in this outcome
    #[must_use]
    pub const fn expected_text(&self) -> &'static str {
        match self {
            Self::Accepted => "Dropped!",
            Self::Rejected => "Drop here",
        }
    }
}

/// Options for [`drag_and_drop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOptions {
    /// Interpolated moves between source and target centre
    pub steps: u32,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            steps: DEFAULT_DRAG_STEPS,
        }
    }
}

impl DragOptions {
    /// Set the number of steps; zero is treated as one
    #[must_use]
    pub const fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }
}

/// A press at `from`, moves towards `to`, and a release at `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    /// Where the button goes down
    pub from: Point,
    /// Where the button comes up
    pub to: Point,
    /// Moves issued while the button is held
    pub steps: u32,
}

impl Gesture {
    /// Jump straight from `from` to `to`
    #[must_use]
    pub const fn single(from: Point, to: Point) -> Self {
        Self { from, to, steps: 1 }
    }

    /// Travel from `from` to `to` in `steps` evenly spaced moves
    #[must_use]
    pub const fn interpolated(from: Point, to: Point, steps: u32) -> Self {
        Self { from, to, steps }
    }

    /// Points visited after the press, ending exactly at `to`
    #[must_use]
    pub fn path(&self) -> Vec<Point> {
        let steps = self.steps.max(1);
        (1..=steps)
            .map(|i| self.from.lerp(&self.to, f64::from(i) / f64::from(steps)))
            .collect()
    }
}

/// Perform `gesture`; the button is released whenever it was pressed.
pub async fn press_and_release(page: &dyn PageDriver, gesture: &Gesture) -> PlayprobeResult<()> {
    tracing::debug!(from = %gesture.from, to = %gesture.to, steps = gesture.steps, "drag gesture");
    page.mouse_move(gesture.from).await?;
    page.mouse_down().await?;

    let mut moved = Ok(());
    for point in gesture.path() {
        if let Err(e) = page.mouse_move(point).await {
            moved = Err(e);
            break;
        }
    }

    let released = page.mouse_up().await;
    moved.and(released)
}

/// Manual single-step drag from a source snapshot onto `target`, then check
/// the target shows the text `expectation` implies.
///
/// The target's box is queried at call time. The source box is whatever the
/// caller captured, so a stale snapshot presses wherever the element used to be.
pub async fn drag(
    page: &dyn PageDriver,
    source_box: Option<BoundingBox>,
    target: &Locator,
    expectation: DropExpectation,
    expect_timeout: Duration,
) -> PlayprobeResult<()> {
    let source = source_box.ok_or_else(|| PlayprobeError::missing_geometry(DRAG_SOURCE))?;
    let target_box = target.require_box(page).await?;

    press_and_release(page, &Gesture::single(source.center(), target_box.center())).await?;

    expect(target)
        .with_timeout(expect_timeout)
        .to_contain_text(expectation.expected_text())
        .verify(page)
        .await
}

/// Drag between two explicit points without any post-condition
pub async fn drag_between(page: &dyn PageDriver, from: Point, to: Point) -> PlayprobeResult<()> {
    press_and_release(page, &Gesture::single(from, to)).await
}

/// High-level drag-to: scroll both elements into view, re-resolve their
/// boxes, and travel between the centres in `options.steps` moves.
pub async fn drag_and_drop(
    page: &dyn PageDriver,
    source: &Locator,
    target: &Locator,
    options: DragOptions,
) -> PlayprobeResult<()> {
    source.scroll_into_view(page).await?;
    target.scroll_into_view(page).await?;

    let from = source.require_box(page).await?.center();
    let to = target.require_box(page).await?.center();
    tracing::debug!(source = %source, target = %target, "drag to");

    press_and_release(page, &Gesture::interpolated(from, to, options.steps)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage};

    fn droppable_page() -> MockPage {
        let page = MockPage::new();
        page.insert(
            "#draggable",
            MockElement::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0)).draggable(),
        );
        let droppable = page.insert(
            "#droppable",
            MockElement::new(BoundingBox::new(300.0, 0.0, 150.0, 150.0)).with_text("Drop here"),
        );
        page.on_drop(droppable, |dom, event| {
            if event.source.as_deref() == Some("#draggable") {
                dom.set_text("#droppable", "Dropped!");
            }
        });
        page
    }

    mod gesture_tests {
        use super::*;

        #[test]
        fn test_single_path_is_target_only() {
            let g = Gesture::single(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
            assert_eq!(g.path(), vec![Point::new(10.0, 20.0)]);
        }

        #[test]
        fn test_interpolated_path_ends_at_target() {
            let g = Gesture::interpolated(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 4);
            let path = g.path();
            assert_eq!(path.len(), 4);
            assert_eq!(path[0], Point::new(25.0, 0.0));
            assert_eq!(path[3], Point::new(100.0, 0.0));
        }

        #[test]
        fn test_zero_steps_behaves_as_one() {
            let g = Gesture::interpolated(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0);
            assert_eq!(g.path().len(), 1);
        }

        #[test]
        fn test_expected_text() {
            assert_eq!(DropExpectation::Accepted.expected_text(), "Dropped!");
            assert_eq!(DropExpectation::Rejected.expected_text(), "Drop here");
        }
    }

    mod release_tests {
        use super::*;

        #[tokio::test]
        async fn test_button_released_when_move_fails() {
            let page = MockPage::new();
            page.fail_mouse_move_after(2);
            let gesture = Gesture::interpolated(Point::new(0.0, 0.0), Point::new(50.0, 50.0), 5);

            let err = press_and_release(&page, &gesture).await.unwrap_err();
            assert!(matches!(err, PlayprobeError::Input { .. }));
            assert!(!page.button_held());
            assert_eq!(page.history().last().map(String::as_str), Some("mouse_up"));
        }

        #[tokio::test]
        async fn test_no_release_without_press() {
            let page = MockPage::new();
            page.fail_mouse_move_after(0);
            let gesture = Gesture::single(Point::new(0.0, 0.0), Point::new(1.0, 1.0));

            assert!(press_and_release(&page, &gesture).await.is_err());
            assert!(!page.was_called("mouse_down"));
            assert!(!page.was_called("mouse_up"));
        }
    }

    mod drag_tests {
        use super::*;

        #[tokio::test]
        async fn test_drag_missing_source() {
            let page = droppable_page();
            let err = drag(
                &page,
                None,
                &Locator::new("#droppable"),
                DropExpectation::Accepted,
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
            assert!(
                matches!(err, PlayprobeError::MissingGeometry { ref selector } if selector == DRAG_SOURCE)
            );
            assert!(!page.was_called("mouse_down"));
        }

        #[tokio::test]
        async fn test_drag_missing_target() {
            let page = droppable_page();
            let err = drag(
                &page,
                Some(BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
                &Locator::new("#nowhere"),
                DropExpectation::Accepted,
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
            assert!(
                matches!(err, PlayprobeError::MissingGeometry { ref selector } if selector == "#nowhere")
            );
        }

        #[tokio::test]
        async fn test_drag_accepted() {
            let page = droppable_page();
            let source = Locator::new("#draggable").bounding_box(&page).await.unwrap();
            drag(
                &page,
                source,
                &Locator::new("#droppable"),
                DropExpectation::Accepted,
                Duration::from_millis(200),
            )
            .await
            .unwrap();
            assert!(!page.button_held());
        }

        #[tokio::test]
        async fn test_drag_expectation_mismatch_is_assertion_error() {
            let page = droppable_page();
            let source = Locator::new("#draggable").bounding_box(&page).await.unwrap();
            let err = drag(
                &page,
                source,
                &Locator::new("#droppable"),
                DropExpectation::Rejected,
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
            assert!(err.is_assertion());
        }

        #[tokio::test]
        async fn test_drag_and_drop_interpolates() {
            let page = droppable_page();
            drag_and_drop(
                &page,
                &Locator::new("#draggable"),
                &Locator::new("#droppable"),
                DragOptions::default().with_steps(3),
            )
            .await
            .unwrap();

            let moves = page
                .history()
                .iter()
                .filter(|c| c.starts_with("mouse_move"))
                .count();
            assert_eq!(moves, 4);
            assert!(page.was_called("scroll_into_view:#draggable"));
            assert_eq!(
                page.text(&crate::locator::Selector::css("#droppable")).as_deref(),
                Some("Dropped!")
            );
        }

        #[tokio::test]
        async fn test_drag_and_drop_missing_source() {
            let page = droppable_page();
            let err = drag_and_drop(
                &page,
                &Locator::new("#ghost"),
                &Locator::new("#droppable"),
                DragOptions::default(),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, PlayprobeError::MissingGeometry { .. }));
        }
    }
}
