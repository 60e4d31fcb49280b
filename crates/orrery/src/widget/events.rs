//! Widget events.
//!
//! Events are delivered to widgets by the host loop through
//! [`Widget::event`](crate::widget::Widget::event). Each event carries an
//! [`EventBase`] recording whether a handler accepted it.

use orrery_core::TimerId;

/// Common state shared by all event types.
#[derive(Debug, Default)]
pub struct EventBase {
    /// Whether the event has been accepted (handled).
    accepted: bool,
}

impl EventBase {
    /// Create a new, unaccepted event base.
    pub fn new() -> Self {
        Self { accepted: false }
    }

    /// Check if the event has been accepted.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Mark the event as handled.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    /// Clear the accepted flag.
    pub fn ignore(&mut self) {
        self.accepted = false;
    }
}

/// Timer event, sent when a widget-owned timer fires.
///
/// The host drains `TimerService::process_expired()` and delivers one
/// `TimerEvent` per fired ID to the widgets it drives. A widget handles
/// the event only when the ID matches a timer it armed; the decision of
/// what the tick means is made against the widget's state at dispatch
/// time, never against state recorded when the timer was armed.
#[derive(Debug)]
pub struct TimerEvent {
    /// Event base.
    pub base: EventBase,
    /// The timer that fired.
    pub id: TimerId,
}

impl TimerEvent {
    /// Create a timer event for a fired timer ID.
    pub fn new(id: TimerId) -> Self {
        Self {
            base: EventBase::new(),
            id,
        }
    }
}

/// Poll event, sent once per host loop turn.
///
/// Widgets that started asynchronous work drain any completed results
/// here. The interactive path never blocks: a poll either merges results
/// that have already landed or does nothing.
#[derive(Debug, Default)]
pub struct PollEvent {
    /// Event base.
    pub base: EventBase,
}

impl PollEvent {
    /// Create a poll event.
    pub fn new() -> Self {
        Self::default()
    }
}

/// The unified widget event type.
#[derive(Debug)]
pub enum WidgetEvent {
    /// A widget-owned timer fired.
    Timer(TimerEvent),
    /// Once-per-loop-turn chance to drain async completions.
    Poll(PollEvent),
}

impl WidgetEvent {
    /// Build a timer event.
    pub fn timer(id: TimerId) -> Self {
        Self::Timer(TimerEvent::new(id))
    }

    /// Build a poll event.
    pub fn poll() -> Self {
        Self::Poll(PollEvent::new())
    }

    /// Check if the event has been accepted.
    pub fn is_accepted(&self) -> bool {
        match self {
            Self::Timer(e) => e.base.is_accepted(),
            Self::Poll(e) => e.base.is_accepted(),
        }
    }

    /// Accept the event.
    pub fn accept(&mut self) {
        match self {
            Self::Timer(e) => e.base.accept(),
            Self::Poll(e) => e.base.accept(),
        }
    }

    /// Clear the accepted flag.
    pub fn ignore(&mut self) {
        match self {
            Self::Timer(e) => e.base.ignore(),
            Self::Poll(e) => e.base.ignore(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_and_ignore() {
        let mut event = WidgetEvent::poll();
        assert!(!event.is_accepted());
        event.accept();
        assert!(event.is_accepted());
        event.ignore();
        assert!(!event.is_accepted());
    }
}
