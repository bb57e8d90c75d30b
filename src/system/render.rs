//! Offscreen rendering context shared by the trackers of one worker.
//!
//! The region-based tracker renders the tracked models offscreen, and its
//! rendering context may only be current for one run at a time. The context
//! is passed explicitly; `acquire` makes it current and the returned guard
//! releases it when dropped, on every exit path of the run.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug)]
pub struct RenderContext {
    name: String,
    current: Mutex<()>,
    acquisitions: AtomicU64,
}

impl RenderContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: Mutex::new(()),
            acquisitions: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make the context current, blocking while another run holds it.
    pub fn acquire(&self) -> RenderGuard<'_> {
        let guard = self.current.lock();
        self.on_acquired();
        RenderGuard {
            context: self,
            _guard: guard,
        }
    }

    pub fn try_acquire(&self) -> Option<RenderGuard<'_>> {
        let guard = self.current.try_lock()?;
        self.on_acquired();
        Some(RenderGuard {
            context: self,
            _guard: guard,
        })
    }

    /// Whether some run currently holds the context.
    pub fn is_current(&self) -> bool {
        self.current.is_locked()
    }

    /// Number of times the context has been made current.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::SeqCst)
    }

    fn on_acquired(&self) {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        trace!("Render context '{}' made current", self.name);
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new("offscreen")
    }
}

/// Holds the context current until dropped.
#[derive(Debug)]
pub struct RenderGuard<'a> {
    context: &'a RenderContext,
    _guard: MutexGuard<'a, ()>,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        trace!("Render context '{}' released", self.context.name);
    }
}
