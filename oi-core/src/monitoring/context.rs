//! Per-scrape cancellation and deadline
//!
//! A [`ScrapeContext`] is handed to every collection call. It bounds the
//! provider fetch by an optional deadline and an optional shutdown signal.
//! Either one firing turns the fetch into a [`FetchError`], so the caller
//! always takes the `fail` path and never skips the counter update.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

use crate::core::FetchError;

#[derive(Debug, Clone, Default)]
pub struct ScrapeContext {
    timeout: Option<Duration>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ScrapeContext {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cancel when `shutdown` flips to `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether the shutdown signal has already fired
    pub fn is_cancelled(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drive `fetch` to completion unless the deadline or shutdown wins
    ///
    /// The losing future is dropped, which cancels any in-flight request.
    pub async fn run<T, F>(&self, fetch: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        if self.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, fetch)
                    .await
                    .unwrap_or(Err(FetchError::Timeout(limit))),
                None => fetch.await,
            }
        };

        match self.shutdown.clone() {
            Some(mut rx) => {
                tokio::select! {
                    result = bounded => result,
                    _ = wait_for_shutdown(&mut rx) => Err(FetchError::Cancelled),
                }
            }
            None => bounded.await,
        }
    }
}

/// Resolves once the channel holds `true`, or never if the sender is gone
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
