// src/exec/heartbeat.rs

//! Liveness flag between the output readers and the watchdog loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Binary liveness signal.
///
/// `beat` sets the flag (any number of beats before the next wait collapse
/// into one); a successful `wait` clears it again. Backed by the single
/// stored permit of `Notify::notify_one`.
#[derive(Debug, Clone, Default)]
pub struct Heartbeat {
    inner: Arc<Notify>,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beat(&self) {
        self.inner.notify_one();
    }

    /// Wait for the flag to be set, clearing it.
    ///
    /// Returns `false` if `timeout` elapsed first. With no timeout this waits
    /// forever. Cancel safe.
    pub async fn wait(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.notified())
                .await
                .is_ok(),
            None => {
                self.inner.notified().await;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_times_out_without_beat() {
        let hb = Heartbeat::new();
        assert!(!hb.wait(Some(Duration::from_millis(30))).await);
    }

    #[tokio::test]
    async fn beat_before_wait_is_remembered_once() {
        let hb = Heartbeat::new();
        hb.beat();
        hb.beat();
        assert!(hb.wait(Some(Duration::from_millis(30))).await);
        // Both beats collapsed into one permit, which has now been cleared.
        assert!(!hb.wait(Some(Duration::from_millis(30))).await);
    }

    #[tokio::test]
    async fn beat_from_another_task_wakes_waiter() {
        let hb = Heartbeat::new();
        let beater = hb.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            beater.beat();
        });
        assert!(hb.wait(Some(Duration::from_secs(2))).await);
    }
}
