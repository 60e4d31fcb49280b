//! Rotating image carousel widget.
//!
//! The Carousel cycles through an ordered sequence of images, advancing
//! on a repeating timer and on explicit navigation commands. Positions
//! are 1-based; advancing past the last item wraps to the first, and
//! retreating from the first wraps to the last.
//!
//! # Example
//!
//! ```ignore
//! use orrery::widget::widgets::{Carousel, CarouselItem};
//! use orrery_core::TimerService;
//!
//! let timers = TimerService::new();
//! let mut carousel = Carousel::new(
//!     vec![
//!         CarouselItem::new(1, "img/dawn.png", "Dawn over the ridge"),
//!         CarouselItem::new(2, "img/noon.png", "Noon haze"),
//!         CarouselItem::new(3, "img/dusk.png", "Dusk colors"),
//!     ],
//!     timers.clone(),
//! );
//!
//! carousel.current_changed.connect(|&index| {
//!     println!("now showing slide {index}");
//! });
//!
//! carousel.start_autoplay();
//!
//! // Host loop: route fired timers back to the widget.
//! for id in timers.process_expired() {
//!     carousel.event(&mut orrery::widget::WidgetEvent::timer(id));
//! }
//! ```

use std::time::Duration;

use orrery_core::{Signal, TimerId, TimerService};

use crate::widget::events::WidgetEvent;
use crate::widget::traits::Widget;

/// Delay between automatic transitions when none is configured.
pub const DEFAULT_TRANSITION_DELAY: Duration = Duration::from_millis(5000);

/// One displayable entry of a carousel.
///
/// Items are immutable once supplied; the sequence a carousel shows is
/// fixed at construction and its insertion order is the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselItem {
    /// Stable, unique identifier.
    pub id: u64,
    /// URI of the image to display.
    pub source: String,
    /// Alternative text describing the image.
    pub alt_text: String,
}

impl CarouselItem {
    /// Create a new item.
    pub fn new(id: u64, source: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            alt_text: alt_text.into(),
        }
    }
}

/// One slide in a rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideFrame {
    /// The item's stable identifier.
    pub id: u64,
    /// URI of the image.
    pub source: String,
    /// Alternative text.
    pub alt_text: String,
    /// Whether this slide is the one currently shown.
    pub visible: bool,
}

/// One dot affordance in a rendered frame.
///
/// Selecting the dot for item `id` maps to [`Carousel::jump_to`] with
/// that id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotFrame {
    /// The item the dot selects.
    pub id: u64,
    /// Whether the dot marks the current item.
    pub active: bool,
}

/// A renderable snapshot of the carousel.
///
/// Exactly one slide is visible per frame (none when the sequence is
/// empty). The next/prev affordances map to [`Carousel::advance`] and
/// [`Carousel::retreat`] whether or not they are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselFrame {
    /// All slides, in display order.
    pub slides: Vec<SlideFrame>,
    /// Whether the next/prev affordances should be rendered.
    pub nav_buttons_visible: bool,
    /// Dot affordances, present only when dot navigation is enabled.
    pub dots: Option<Vec<DotFrame>>,
}

/// A cyclic image carousel with timer-driven autoplay.
///
/// # Signals
///
/// - `current_changed(usize)`: Emitted with the new 1-based position
///   whenever the shown item actually changes
pub struct Carousel {
    /// The fixed display sequence.
    items: Vec<CarouselItem>,

    /// 1-based position of the shown item. Stays within `[1, len]`
    /// whenever `items` is non-empty; meaningless when it is empty.
    current: usize,

    /// Delay between automatic transitions.
    transition_delay: Duration,

    /// Whether dot navigation is rendered.
    show_dots: bool,

    /// Whether the next/prev affordances are rendered.
    show_nav_buttons: bool,

    /// Shared timer service used for autoplay.
    timers: TimerService,

    /// The armed autoplay timer, if autoplay is running.
    autoplay_timer: Option<TimerId>,

    /// Signal emitted when the current position changes.
    pub current_changed: Signal<usize>,
}

impl Carousel {
    /// Create a carousel over `items`.
    ///
    /// The first item is current. Autoplay does not start until
    /// [`start_autoplay`](Self::start_autoplay) is called.
    pub fn new(items: Vec<CarouselItem>, timers: TimerService) -> Self {
        Self {
            items,
            current: 1,
            transition_delay: DEFAULT_TRANSITION_DELAY,
            show_dots: true,
            show_nav_buttons: true,
            timers,
            autoplay_timer: None,
            current_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Sequence Access
    // =========================================================================

    /// Number of items in the sequence.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, in display order.
    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    /// The item at a 1-based position.
    pub fn item(&self, position: usize) -> Option<&CarouselItem> {
        position.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// The 1-based position of the shown item, or 0 when the sequence
    /// is empty.
    pub fn current_index(&self) -> usize {
        if self.items.is_empty() { 0 } else { self.current }
    }

    /// The currently shown item.
    pub fn current_item(&self) -> Option<&CarouselItem> {
        self.item(self.current_index())
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Delay between automatic transitions.
    pub fn transition_delay(&self) -> Duration {
        self.transition_delay
    }

    /// Set the delay between automatic transitions.
    ///
    /// Takes effect immediately: a running autoplay timer is re-armed
    /// with the new delay.
    pub fn set_transition_delay(&mut self, delay: Duration) {
        self.transition_delay = delay;
        if self.is_autoplaying() {
            self.stop_autoplay();
            self.start_autoplay();
        }
    }

    /// Set the transition delay using the builder pattern.
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.set_transition_delay(delay);
        self
    }

    /// Whether dot navigation is rendered.
    pub fn show_dots(&self) -> bool {
        self.show_dots
    }

    /// Show or hide dot navigation.
    pub fn set_show_dots(&mut self, show: bool) {
        self.show_dots = show;
    }

    /// Set dot visibility using the builder pattern.
    pub fn with_show_dots(mut self, show: bool) -> Self {
        self.set_show_dots(show);
        self
    }

    /// Whether the next/prev affordances are rendered.
    pub fn show_nav_buttons(&self) -> bool {
        self.show_nav_buttons
    }

    /// Show or hide the next/prev affordances.
    ///
    /// Hiding them does not change navigation semantics; it only removes
    /// them from rendered frames.
    pub fn set_show_nav_buttons(&mut self, show: bool) {
        self.show_nav_buttons = show;
    }

    /// Set nav-button visibility using the builder pattern.
    pub fn with_show_nav_buttons(mut self, show: bool) -> Self {
        self.set_show_nav_buttons(show);
        self
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Step to the next item, wrapping from the last back to the first.
    ///
    /// The same rule applies whether the step comes from the autoplay
    /// timer or from the "next" affordance. No-op on an empty sequence.
    pub fn advance(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = if self.current < self.items.len() {
            self.current + 1
        } else {
            1
        };
        self.set_current(next);
    }

    /// Step to the previous item, wrapping from the first to the last.
    ///
    /// No-op on an empty sequence.
    pub fn retreat(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let previous = if self.current > 1 {
            self.current - 1
        } else {
            self.items.len()
        };
        self.set_current(previous);
    }

    /// Jump to the item with the given id.
    ///
    /// Returns `true` if the item exists. An unknown id is ignored; the
    /// affordances that call this are only rendered for known items.
    pub fn jump_to(&mut self, id: u64) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                self.set_current(index + 1);
                true
            }
            None => {
                tracing::trace!(target: "orrery::widget", id, "jump_to: no such item");
                false
            }
        }
    }

    /// Move to a 1-based position, emitting `current_changed` on change.
    fn set_current(&mut self, position: usize) {
        debug_assert!(position >= 1 && position <= self.items.len());
        if self.current != position {
            self.current = position;
            self.current_changed.emit(position);
        }
    }

    // =========================================================================
    // Autoplay
    // =========================================================================

    /// Start automatic transitions at the configured delay.
    ///
    /// Arms a repeating timer on the shared timer service; each fired
    /// tick reaches the widget as a [`WidgetEvent::Timer`] and steps the
    /// carousel by the wrap rule of [`advance`](Self::advance), decided
    /// against the position current at dispatch time. Restarting re-arms
    /// the timer from now. No-op on an empty sequence.
    pub fn start_autoplay(&mut self) {
        if self.items.is_empty() {
            tracing::debug!(target: "orrery::widget", "carousel empty, autoplay not started");
            return;
        }
        if self.transition_delay.is_zero() {
            tracing::warn!(target: "orrery::widget", "zero transition delay, autoplay not started");
            return;
        }
        self.stop_autoplay();
        self.autoplay_timer = Some(self.timers.start_repeating(self.transition_delay));
    }

    /// Stop automatic transitions.
    ///
    /// After this returns no further timer-driven steps occur; a tick
    /// already drained by the host but not yet dispatched no longer
    /// matches the widget's timer and is ignored.
    pub fn stop_autoplay(&mut self) {
        if let Some(id) = self.autoplay_timer.take()
            && self.timers.stop(id).is_err()
        {
            tracing::warn!(target: "orrery::widget", ?id, "autoplay timer already gone");
        }
    }

    /// Check whether autoplay is running.
    pub fn is_autoplaying(&self) -> bool {
        self.autoplay_timer.is_some()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Snapshot the renderable state.
    ///
    /// Exactly one slide is marked visible (none when the sequence is
    /// empty); the dot for the current item is marked active.
    pub fn frame(&self) -> CarouselFrame {
        let current = self.current_index();

        let slides = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| SlideFrame {
                id: item.id,
                source: item.source.clone(),
                alt_text: item.alt_text.clone(),
                visible: i + 1 == current,
            })
            .collect();

        let dots = self.show_dots.then(|| {
            self.items
                .iter()
                .enumerate()
                .map(|(i, item)| DotFrame {
                    id: item.id,
                    active: i + 1 == current,
                })
                .collect()
        });

        CarouselFrame {
            slides,
            nav_buttons_visible: self.show_nav_buttons,
            dots,
        }
    }
}

impl Widget for Carousel {
    fn event(&mut self, event: &mut WidgetEvent) -> bool {
        match event {
            WidgetEvent::Timer(timer) if Some(timer.id) == self.autoplay_timer => {
                self.advance();
                event.accept();
                true
            }
            _ => false,
        }
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        self.stop_autoplay();
    }
}

static_assertions::assert_impl_all!(Carousel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread::sleep;

    fn three_items() -> Vec<CarouselItem> {
        vec![
            CarouselItem::new(1, "img/a.png", "first"),
            CarouselItem::new(2, "img/b.png", "second"),
            CarouselItem::new(3, "img/c.png", "third"),
        ]
    }

    fn carousel() -> Carousel {
        Carousel::new(three_items(), TimerService::new())
    }

    #[test]
    fn test_defaults() {
        let carousel = carousel();
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(carousel.transition_delay(), DEFAULT_TRANSITION_DELAY);
        assert!(carousel.show_dots());
        assert!(carousel.show_nav_buttons());
        assert!(!carousel.is_autoplaying());
    }

    #[test]
    fn test_advance_wraps_at_end() {
        let mut carousel = carousel();
        carousel.advance();
        assert_eq!(carousel.current_index(), 2);
        carousel.advance();
        assert_eq!(carousel.current_index(), 3);
        carousel.advance();
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn test_retreat_wraps_at_start() {
        let mut carousel = carousel();
        carousel.retreat();
        assert_eq!(carousel.current_index(), 3);
        carousel.retreat();
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn test_index_stays_in_bounds() {
        let mut carousel = carousel();
        for step in 0..50 {
            if step % 3 == 0 {
                carousel.retreat();
            } else {
                carousel.advance();
            }
            let index = carousel.current_index();
            assert!((1..=3).contains(&index));
        }
    }

    #[test]
    fn test_single_item_wraps_to_itself() {
        let mut carousel = Carousel::new(
            vec![CarouselItem::new(7, "img/only.png", "only")],
            TimerService::new(),
        );
        carousel.advance();
        assert_eq!(carousel.current_index(), 1);
        carousel.retreat();
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn test_jump_to_is_idempotent() {
        let mut carousel = carousel();
        assert!(carousel.jump_to(3));
        assert_eq!(carousel.current_index(), 3);
        assert!(carousel.jump_to(3));
        assert_eq!(carousel.current_index(), 3);
    }

    #[test]
    fn test_jump_to_unknown_id_is_ignored() {
        let mut carousel = carousel();
        carousel.advance();
        assert!(!carousel.jump_to(99));
        assert_eq!(carousel.current_index(), 2);
    }

    #[test]
    fn test_current_changed_emits_only_on_change() {
        let mut carousel = carousel();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        carousel.current_changed.connect(move |&index| {
            s.lock().push(index);
        });

        carousel.advance();
        carousel.jump_to(2); // already current, no emission
        carousel.jump_to(1);
        assert_eq!(*seen.lock(), vec![2, 1]);
    }

    #[test]
    fn test_empty_sequence_degrades_gracefully() {
        let timers = TimerService::new();
        let mut carousel = Carousel::new(Vec::new(), timers.clone());

        assert_eq!(carousel.current_index(), 0);
        carousel.advance();
        carousel.retreat();
        assert_eq!(carousel.current_index(), 0);

        carousel.start_autoplay();
        assert!(!carousel.is_autoplaying());
        assert_eq!(timers.active_count(), 0);

        let frame = carousel.frame();
        assert!(frame.slides.is_empty());
    }

    #[test]
    fn test_autoplay_ticks_advance_in_sequence() {
        let timers = TimerService::new();
        let mut carousel = Carousel::new(three_items(), timers.clone())
            .with_transition_delay(Duration::from_millis(10));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        carousel.current_changed.connect(move |&index| {
            s.lock().push(index);
        });

        carousel.start_autoplay();
        for _ in 0..3 {
            sleep(Duration::from_millis(12));
            for id in timers.process_expired() {
                carousel.event(&mut WidgetEvent::timer(id));
            }
        }

        assert_eq!(*seen.lock(), vec![2, 3, 1]);
    }

    #[test]
    fn test_stop_autoplay_halts_transitions() {
        let timers = TimerService::new();
        let mut carousel = Carousel::new(three_items(), timers.clone())
            .with_transition_delay(Duration::from_millis(5));

        carousel.start_autoplay();
        carousel.stop_autoplay();
        assert!(!carousel.is_autoplaying());
        assert_eq!(timers.active_count(), 0);

        sleep(Duration::from_millis(10));
        assert!(timers.process_expired().is_empty());
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn test_stale_timer_event_is_ignored() {
        let timers = TimerService::new();
        let mut carousel = Carousel::new(three_items(), timers.clone())
            .with_transition_delay(Duration::from_millis(5));

        carousel.start_autoplay();
        sleep(Duration::from_millis(8));
        let fired = timers.process_expired();
        assert_eq!(fired.len(), 1);

        // The widget stops before the drained tick is dispatched.
        carousel.stop_autoplay();
        let mut event = WidgetEvent::timer(fired[0]);
        assert!(!carousel.event(&mut event));
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn test_drop_cancels_autoplay_timer() {
        let timers = TimerService::new();
        {
            let mut carousel = Carousel::new(three_items(), timers.clone());
            carousel.start_autoplay();
            assert_eq!(timers.active_count(), 1);
        }
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_frame_marks_exactly_one_slide_visible() {
        let mut carousel = carousel();
        carousel.advance();

        let frame = carousel.frame();
        let visible: Vec<_> = frame.slides.iter().filter(|s| s.visible).collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);
        assert_eq!(visible[0].alt_text, "second");

        let dots = frame.dots.unwrap();
        assert_eq!(dots.len(), 3);
        let active: Vec<_> = dots.iter().filter(|d| d.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 2);
    }

    #[test]
    fn test_frame_respects_visibility_config() {
        let carousel = carousel().with_show_dots(false).with_show_nav_buttons(false);
        let frame = carousel.frame();
        assert!(frame.dots.is_none());
        assert!(!frame.nav_buttons_visible);
    }
}
