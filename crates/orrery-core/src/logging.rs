//! Logging facilities for Orrery.
//!
//! Orrery instruments its subsystems with the `tracing` crate. Nothing
//! here installs a subscriber; the host application chooses one:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // ...
//! }
//! ```
//!
//! The constants in [`targets`] name each subsystem so log output can be
//! filtered with `tracing` directives, e.g.
//! `RUST_LOG=orrery_core::timer=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "orrery_core";
    /// Timer system target.
    pub const TIMER: &str = "orrery_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "orrery_core::signal";
    /// Async runtime target.
    pub const ASYNC_RUNTIME: &str = "orrery_core::async_runtime";
    /// Widget crate target.
    pub const WIDGET: &str = "orrery::widget";
}
