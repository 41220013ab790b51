//! In-flight request counters behind the global loading indicator.
//!
//! DESIGN
//! ======
//! Two independent counters share one `watch` cell: `requests`, driven by the
//! pipeline's loading stage, and `operator`, toggled explicitly by screens
//! that run long operator-facing work. Both clamp at zero.
//!
//! A tracked request holds a `LoadingTicket`; dropping the ticket is the only
//! way to decrement `requests`, so success, failure and a dropped future all
//! release exactly once.

#[cfg(test)]
#[path = "loading_test.rs"]
mod loading_test;

use std::sync::Arc;

use tokio::sync::watch;

/// Point-in-time view of both counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadingSnapshot {
    pub requests: usize,
    pub operator: usize,
}

impl LoadingSnapshot {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.requests > 0
    }

    #[must_use]
    pub fn is_operator_loading(&self) -> bool {
        self.operator > 0
    }
}

#[derive(Clone)]
pub struct LoadingState {
    cell: Arc<watch::Sender<LoadingSnapshot>>,
}

impl LoadingState {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LoadingSnapshot::default());
        Self { cell: Arc::new(tx) }
    }

    /// Count one more outstanding request until the ticket is dropped.
    #[must_use = "dropping the ticket immediately ends the tracked request"]
    pub fn begin(&self) -> LoadingTicket {
        self.cell.send_modify(|snapshot| snapshot.requests += 1);
        LoadingTicket { cell: Arc::clone(&self.cell) }
    }

    pub fn show_operator(&self) {
        self.cell.send_modify(|snapshot| snapshot.operator += 1);
    }

    pub fn hide_operator(&self) {
        self.cell.send_modify(|snapshot| snapshot.operator = snapshot.operator.saturating_sub(1));
    }

    #[must_use]
    pub fn snapshot(&self) -> LoadingSnapshot {
        *self.cell.borrow()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    #[must_use]
    pub fn is_operator_loading(&self) -> bool {
        self.snapshot().is_operator_loading()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.snapshot().requests
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadingSnapshot> {
        self.cell.subscribe()
    }
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

/// One outstanding tracked request.
#[derive(Debug)]
pub struct LoadingTicket {
    cell: Arc<watch::Sender<LoadingSnapshot>>,
}

impl Drop for LoadingTicket {
    fn drop(&mut self) {
        self.cell.send_modify(|snapshot| snapshot.requests = snapshot.requests.saturating_sub(1));
    }
}
