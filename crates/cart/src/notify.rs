//! User-visible error surface.
//!
//! Cart operations never hand failures back as unhandled errors; each one is
//! turned into a single message for the shopper (a toast in a browser, a line
//! on stderr in the CLI) through a [`Notifier`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fire-and-forget sink for user-visible error messages.
pub trait Notifier {
    fn notify_error(&self, message: &str);
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, message: &str) {
        tracing::error!(target: "rocketshoes_cart::notify", "{message}");
    }
}

/// Buffers notifications until a front end drains them.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Remove and return all buffered messages.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for CollectingNotifier {
    fn notify_error(&self, message: &str) {
        self.lock().push(message.to_string());
    }
}
