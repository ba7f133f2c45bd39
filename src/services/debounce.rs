// src/services/debounce.rs

//! Trailing-edge debounce gate.
//!
//! Each call stores its value and restarts the quiet window. When the window
//! elapses without another call, the action runs once with the freshest value.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

type Action<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Coalesces bursts of calls into a single trailing invocation.
///
/// Must be used from within a Tokio runtime.
pub struct Debouncer<T> {
    window: Duration,
    latest: Arc<Mutex<Option<T>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    action: Action<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(window: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            window,
            latest: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
            action: Arc::new(action),
        }
    }

    /// Record `value` and restart the quiet window.
    pub fn call(&self, value: T) {
        *self.latest.lock() = Some(value);

        let mut timer = self.timer.lock();
        if let Some(pending) = timer.take() {
            pending.abort();
        }

        let latest = Arc::clone(&self.latest);
        let action = Arc::clone(&self.action);
        let window = self.window;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let value = latest.lock().take();
            if let Some(value) = value {
                action(value);
            }
        }));
    }

    /// Drop the pending value without firing.
    pub fn cancel(&self) {
        if let Some(pending) = self.timer.lock().take() {
            pending.abort();
        }
        self.latest.lock().take();
    }

    /// True while a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.latest.lock().is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.timer.get_mut().take() {
            pending.abort();
        }
    }
}
