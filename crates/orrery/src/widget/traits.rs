//! Core widget trait.

use crate::widget::events::WidgetEvent;

/// The base trait for all Orrery widgets.
///
/// Widgets receive events from the host loop and expose their renderable
/// state through per-widget `frame()` snapshot methods. The host owns
/// the loop; widgets own their interaction state.
pub trait Widget: Send + Sync {
    /// Handle an event.
    ///
    /// Returns `true` if the widget handled the event. Handlers must read
    /// any state they need at dispatch time; an event never carries state
    /// captured when it was scheduled.
    fn event(&mut self, event: &mut WidgetEvent) -> bool {
        let _ = event;
        false
    }
}
