//! Concrete widget implementations.

pub mod carousel;
pub mod filter_field;

pub use carousel::{
    Carousel, CarouselFrame, CarouselItem, DEFAULT_TRANSITION_DELAY, DotFrame, SlideFrame,
};
pub use filter_field::{FieldFilter, FieldKind, FilterField, FilterFieldFrame, WhereFilter};
