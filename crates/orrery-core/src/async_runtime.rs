//! Async runtime bridge for Orrery.
//!
//! Widgets occasionally need to run network-bound work (for example a
//! filter field fetching its legal value set) without ever blocking the
//! interactive path. This module wraps a Tokio runtime: spawn the work,
//! keep the returned [`AsyncTaskHandle`], and poll it from the host loop
//! with [`AsyncTaskHandle::try_get`] until the result lands.
//!
//! # Example
//!
//! ```
//! use orrery_core::async_runtime::AsyncRuntime;
//!
//! let runtime = AsyncRuntime::global();
//! let handle = runtime.spawn(async { 2 + 2 });
//!
//! // Host loop: non-blocking poll until ready. Tests may block instead.
//! assert_eq!(handle.blocking_wait(), Some(4));
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::oneshot;

/// Global async runtime instance.
static GLOBAL_RUNTIME: OnceLock<AsyncRuntime> = OnceLock::new();

/// Counter for unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Configuration for the async runtime.
#[derive(Debug, Clone)]
pub struct AsyncRuntimeConfig {
    /// Worker thread count. Defaults to the number of CPU cores.
    pub worker_threads: Option<usize>,
    /// Name prefix for runtime threads.
    pub thread_name: String,
}

impl Default for AsyncRuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "orrery-async".to_string(),
        }
    }
}

impl AsyncRuntimeConfig {
    /// Set the number of worker threads.
    pub fn with_worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = Some(count);
        self
    }

    /// Set the thread name prefix.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A handle to a spawned async task.
///
/// The task keeps running whether or not the handle is polled; the
/// handle only observes completion.
#[derive(Debug)]
pub struct AsyncTaskHandle<T> {
    id: u64,
    receiver: oneshot::Receiver<T>,
}

impl<T> AsyncTaskHandle<T> {
    /// Get the unique task ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Try to take the result without blocking.
    ///
    /// Returns `Ok(value)` once the task has completed; otherwise the
    /// handle is handed back in `Err` so it can be polled again.
    pub fn try_get(mut self) -> std::result::Result<T, Self> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(value),
            Err(_) => Err(self),
        }
    }

    /// Wait for the result within an async context.
    ///
    /// Returns `None` if the task was dropped without producing a value.
    pub async fn wait(self) -> Option<T> {
        self.receiver.await.ok()
    }

    /// Wait for the result, blocking the current thread.
    ///
    /// Never call this from the host loop or an async context; it is
    /// intended for startup code and tests.
    pub fn blocking_wait(self) -> Option<T> {
        self.receiver.blocking_recv().ok()
    }
}

/// The async runtime manager.
pub struct AsyncRuntime {
    /// The owned Tokio runtime. Kept alive for the program's lifetime.
    #[allow(dead_code)]
    runtime: Runtime,
    /// Handle used for spawning.
    handle: Handle,
    /// Number of tasks spawned and not yet finished.
    active_tasks: Arc<AtomicU64>,
}

impl AsyncRuntime {
    /// Get the global async runtime, initializing it with defaults on
    /// first use.
    pub fn global() -> &'static AsyncRuntime {
        GLOBAL_RUNTIME.get_or_init(|| {
            AsyncRuntime::new(AsyncRuntimeConfig::default())
                .expect("failed to create global async runtime")
        })
    }

    /// Initialize the global runtime with custom configuration.
    ///
    /// Must be called before the first use of [`AsyncRuntime::global`];
    /// fails if the global runtime already exists.
    pub fn init_global(
        config: AsyncRuntimeConfig,
    ) -> std::result::Result<&'static AsyncRuntime, AsyncRuntimeError> {
        let runtime = AsyncRuntime::new(config)?;
        GLOBAL_RUNTIME
            .set(runtime)
            .map_err(|_| AsyncRuntimeError::AlreadyInitialized)?;
        Ok(GLOBAL_RUNTIME.get().expect("just initialized"))
    }

    /// Create a new runtime with the given configuration.
    pub fn new(config: AsyncRuntimeConfig) -> std::result::Result<Self, AsyncRuntimeError> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(&config.thread_name);
        builder.enable_time();

        if let Some(workers) = config.worker_threads {
            builder.worker_threads(workers);
        }

        let runtime = builder
            .build()
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;
        let handle = runtime.handle().clone();

        Ok(Self {
            runtime,
            handle,
            active_tasks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Get the number of in-flight tasks.
    pub fn active_tasks(&self) -> u64 {
        self.active_tasks.load(Ordering::Acquire)
    }

    /// Get a handle to the underlying Tokio runtime.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Spawn an async task on the runtime.
    ///
    /// Returns a handle used to collect the result.
    pub fn spawn<F, T>(&self, future: F) -> AsyncTaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        let active_tasks = self.active_tasks.clone();

        active_tasks.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(target: "orrery_core::async_runtime", task_id = id, "task spawned");

        self.handle.spawn(async move {
            let result = future.await;
            let _ = sender.send(result);
            active_tasks.fetch_sub(1, Ordering::AcqRel);
        });

        AsyncTaskHandle { id, receiver }
    }

    /// Run a future to completion on this runtime, blocking the caller.
    ///
    /// For startup code and tests only; never call from the host loop.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: Future<Output = T>,
    {
        self.handle.block_on(future)
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

/// Errors that can occur with the async runtime.
#[derive(Debug, Clone)]
pub enum AsyncRuntimeError {
    /// The global runtime has already been initialized.
    AlreadyInitialized,
    /// Failed to create the runtime.
    CreationFailed(String),
}

impl std::fmt::Display for AsyncRuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "Async runtime already initialized"),
            Self::CreationFailed(msg) => write!(f, "Failed to create async runtime: {msg}"),
        }
    }
}

impl std::error::Error for AsyncRuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_spawn_and_blocking_wait() {
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default()).unwrap();
        let handle = runtime.spawn(async { 42 });
        assert_eq!(handle.blocking_wait(), Some(42));
    }

    #[test]
    fn test_try_get_until_ready() {
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default()).unwrap();
        let mut handle = runtime.spawn(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            "done"
        });

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            match handle.try_get() {
                Ok(value) => {
                    assert_eq!(value, "done");
                    break;
                }
                Err(again) => {
                    assert!(std::time::Instant::now() < deadline, "task never completed");
                    handle = again;
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        }
    }

    #[test]
    fn test_block_on() {
        let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default()).unwrap();
        let value = runtime.block_on(async { 2 + 2 });
        assert_eq!(value, 4);
    }

    #[test]
    fn test_worker_thread_config() {
        let config = AsyncRuntimeConfig::default()
            .with_worker_threads(2)
            .with_thread_name("orrery-test");
        let runtime = AsyncRuntime::new(config).unwrap();
        let handle = runtime.spawn(async {});
        assert_eq!(handle.blocking_wait(), Some(()));
    }
}
