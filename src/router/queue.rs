//! Navigation requests raised outside the router.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pipeline stages cannot await the router (the router's guards call back
//! into the pipeline), so they post a path here and the router drains the
//! queue on its own schedule via `Router::drain_requests`.

#[cfg(test)]
#[path = "queue_test.rs"]
mod queue_test;

use tokio::sync::mpsc;

/// Capability to ask for a navigation without awaiting it.
pub trait Navigator: Send + Sync {
    fn request_navigation(&self, path: &str);
}

/// Sending half: handed to pipeline stages.
#[derive(Clone, Debug)]
pub struct NavigationQueue {
    tx: mpsc::UnboundedSender<String>,
}

/// Receiving half: owned by whoever drives the router.
#[derive(Debug)]
pub struct NavigationRequests {
    rx: mpsc::UnboundedReceiver<String>,
}

#[must_use]
pub fn navigation_queue() -> (NavigationQueue, NavigationRequests) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NavigationQueue { tx }, NavigationRequests { rx })
}

impl Navigator for NavigationQueue {
    fn request_navigation(&self, path: &str) {
        if self.tx.send(path.to_owned()).is_err() {
            tracing::warn!(%path, "navigation request dropped: router gone");
        }
    }
}

impl NavigationRequests {
    /// Next queued path without waiting.
    pub fn try_next(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next queued path. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
