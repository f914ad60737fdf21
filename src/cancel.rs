// src/cancel.rs

//! Process-wide cooperative cancellation.
//!
//! One token is created by whoever drives the whole migration (the binary
//! wires it to Ctrl-C) and clones are handed to every runner. Runners only
//! ever *observe* it; triggering is the owner's business.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable cancellation signal backed by a `watch` channel.
///
/// Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger cancellation for every clone of this token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the token has been cancelled.
    ///
    /// Cancel safe: dropping the future before it resolves has no effect on
    /// the token.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot see a
        // closed channel here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
