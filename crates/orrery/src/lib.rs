//! Interactive data-discovery widgets for Rust.
//!
//! Orrery provides the presentation-layer building blocks of a dataset
//! discovery page:
//!
//! - [`widget::widgets::Carousel`]: a rotating image carousel driven by
//!   a repeating timer and explicit navigation commands
//! - [`widget::widgets::FilterField`]: a per-column query-filter input
//!   whose enumerated value sets are fetched lazily from an opaque
//!   [`query::RowSource`]
//!
//! Widgets hold their interaction state, publish changes through
//! [`orrery_core::Signal`]s, and expose renderable `frame()` snapshots;
//! rendering, styling and transport stay with the host.

pub mod query;
pub mod widget;

pub use query::{QueryError, QueryFuture, QueryOptions, QueryReply, Row, RowSource};
pub use widget::{Widget, WidgetEvent};
pub use widget::widgets::{
    Carousel, CarouselFrame, CarouselItem, FieldFilter, FieldKind, FilterField, FilterFieldFrame,
    WhereFilter,
};
