//! Signal/slot system for Orrery.
//!
//! A type-safe, Qt-inspired notification mechanism. Widgets emit signals
//! when their state changes; connected slots (closures) are invoked with
//! the emitted arguments. This is the single channel through which
//! widgets publish state to their host.
//!
//! All invocation is direct: slots run on the emitting thread. There is
//! no deferred/queued tier here because this crate does not own an
//! event loop; the host drives everything from one cooperative loop.
//!
//! # Example
//!
//! ```
//! use orrery_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn = value_changed.connect(|&value| {
//!     println!("value is now {value}");
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Returned by [`Signal::connect`]; pass it to [`Signal::disconnect`]
    /// to remove the slot. Valid until disconnected or until the signal
    /// is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot to invoke (Arc-wrapped so emission can run outside the lock).
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal with any number of connected slots.
///
/// # Type Parameter
///
/// - `Args`: the argument type passed to slots. Use `()` for signals
///   without arguments, or a tuple for several.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync`. Emission clones the slot list out of
/// the internal lock before invoking, so a slot may connect or disconnect
/// other slots on the same signal without deadlocking.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether emission is temporarily suppressed.
    blocked: AtomicBool,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a [`ConnectionId`] for later disconnection.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
        })
    }

    /// Connect a slot that disconnects automatically when the returned
    /// guard is dropped.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            signal: self,
            id: self.connect(slot),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Suppress or re-enable emission.
    ///
    /// While blocked, `emit()` does nothing. Useful during batch updates
    /// to avoid cascading notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot with `args`.
    ///
    /// Slots run on the calling thread. Does nothing while the signal
    /// is blocked.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "orrery_core::signal", "signal blocked, skipping emit");
            return;
        }

        // Snapshot the slots so emission runs without holding the lock.
        let slots: Vec<_> = {
            let connections = self.connections.lock();
            connections.iter().map(|(_, c)| c.slot.clone()).collect()
        };

        tracing::trace!(
            target: "orrery_core::signal",
            connection_count = slots.len(),
            "emitting signal"
        );

        for slot in slots {
            slot(&args);
        }
    }
}

/// A connection that disconnects automatically when dropped.
///
/// Created via [`Signal::connect_scoped`]. The borrow ties the guard's
/// lifetime to the signal, so a dangling disconnect is impossible.
///
/// # Example
///
/// ```
/// use orrery_core::Signal;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// let signal = Signal::<i32>::new();
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43); // guard dropped, nothing happens
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<'a, Args: Send + 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: Send + 'static> ConnectionGuard<'_, Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: Send + 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, AtomicUsize};

    #[test]
    fn test_connect_and_emit() {
        let signal = Signal::<i32>::new();
        let total = Arc::new(AtomicI32::new(0));

        let t = total.clone();
        signal.connect(move |&n| {
            t.fetch_add(n, Ordering::SeqCst);
        });

        signal.emit(5);
        signal.emit(7);
        assert_eq!(total.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_disconnect() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let id = signal.connect(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        signal.emit(());
        assert!(signal.disconnect(id));
        signal.emit(());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Second disconnect of the same ID is a no-op.
        assert!(!signal.disconnect(id));
    }

    #[test]
    fn test_multiple_slots_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(tag));
        }

        signal.emit(());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_blocked_signal_does_not_emit() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        signal.connect(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        signal.set_blocked(true);
        assert!(signal.is_blocked());
        signal.emit(());
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        signal.set_blocked(false);
        signal.emit(());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scoped_connection_disconnects_on_drop() {
        let signal = Signal::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        {
            let h = hits.clone();
            let _guard = signal.connect_scoped(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            });
            signal.emit(());
            assert_eq!(signal.connection_count(), 1);
        }

        signal.emit(());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_slot_may_disconnect_during_emit() {
        // Emission snapshots the slot list, so a slot can disconnect
        // itself without deadlocking on the connection table.
        let signal = Arc::new(Signal::<()>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let id_cell = Arc::new(Mutex::new(None));
        let s = signal.clone();
        let h = hits.clone();
        let cell = id_cell.clone();
        let id = signal.connect(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = cell.lock().take() {
                s.disconnect(id);
            }
        });
        *id_cell.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
