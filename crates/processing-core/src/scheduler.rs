//! Tick admission for fixed-rate drivers.
//!
//! Ticks for one entity must never overlap. When a tick is still running
//! as the next one comes due, the new tick is dropped rather than queued
//! so latency stays bounded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct GateState {
    busy: AtomicBool,
    admitted: AtomicU64,
    dropped: AtomicU64,
}

/// Non-blocking single-occupancy gate. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct TickGate {
    state: Arc<GateState>,
}

/// Held for the duration of one tick; releases the gate on drop.
#[derive(Debug)]
pub struct TickPermit {
    state: Arc<GateState>,
}

impl TickGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start a tick. Returns `None` (and counts a drop) when the
    /// previous tick has not finished.
    pub fn try_enter(&self) -> Option<TickPermit> {
        if self
            .state
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.state.admitted.fetch_add(1, Ordering::Relaxed);
            Some(TickPermit {
                state: Arc::clone(&self.state),
            })
        } else {
            let dropped = self.state.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(dropped, "Tick dropped, previous tick still running");
            None
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy.load(Ordering::Acquire)
    }

    pub fn admitted(&self) -> u64 {
        self.state.admitted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.state.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for TickPermit {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::Release);
    }
}
