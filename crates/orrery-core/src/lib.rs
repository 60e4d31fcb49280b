//! Core systems for Orrery.
//!
//! This crate provides the foundations the Orrery widgets are built on:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Timers**: One-shot and repeating timers drained by the host loop
//! - **Async Runtime**: Tokio bridge for network-bound widget work
//!
//! # Signal/Slot Example
//!
//! ```
//! use orrery_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|&value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use orrery_core::TimerService;
//! use std::time::Duration;
//!
//! let timers = TimerService::new();
//! let id = timers.start_repeating(Duration::from_millis(16));
//!
//! // Host loop: drain expirations and dispatch them to widgets.
//! for fired in timers.process_expired() {
//!     println!("timer {:?} fired", fired);
//! }
//! # timers.stop(id).unwrap();
//! ```

pub mod async_runtime;
mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use async_runtime::{AsyncRuntime, AsyncRuntimeConfig, AsyncRuntimeError, AsyncTaskHandle};
pub use error::{OrreryError, Result, TimerError};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerKind, TimerManager, TimerService};
