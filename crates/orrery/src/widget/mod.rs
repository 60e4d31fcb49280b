//! Widget system for Orrery.
//!
//! This module provides the widget architecture:
//!
//! - [`Widget`] trait: event handling for all interactive elements
//! - [`WidgetEvent`]: the event vocabulary delivered by the host loop
//! - [`widgets`]: the concrete widgets
//!
//! # Overview
//!
//! Orrery widgets own their interaction state and publish changes
//! through signals; the host owns the loop that feeds them events and
//! reads their `frame()` snapshots for rendering. A minimal host loop:
//!
//! ```ignore
//! loop {
//!     for id in timers.process_expired() {
//!         carousel.event(&mut WidgetEvent::timer(id));
//!     }
//!     filter.event(&mut WidgetEvent::poll());
//!
//!     render(carousel.frame(), filter.frame());
//! }
//! ```

pub mod events;
pub mod traits;
pub mod widgets;

pub use events::{EventBase, PollEvent, TimerEvent, WidgetEvent};
pub use traits::Widget;
