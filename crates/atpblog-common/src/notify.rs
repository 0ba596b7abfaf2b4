//! User-facing notification sink.
//!
//! The composer absorbs its own faults and reports them here; the host
//! decides how a notice is shown (toast, status line, log).

use std::sync::{Arc, Mutex};

use smol_str::SmolStr;

/// Fire-and-forget sink for user-facing notices.
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

/// Routes notices to the tracing pipeline at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "atpblog::notice", "{message}");
    }
}

/// Collects notices in memory, for tests and headless drivers.
#[derive(Debug, Default)]
pub struct BufferedNotifier {
    notices: Mutex<Vec<SmolStr>>,
}

impl BufferedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears everything collected so far.
    pub fn drain(&self) -> Vec<SmolStr> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.notices.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for BufferedNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(SmolStr::new(message));
        }
    }
}
