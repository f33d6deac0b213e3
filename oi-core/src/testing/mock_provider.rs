//! Scripted snapshot provider for testing
//!
//! Provides a programmable [`SnapshotProvider`] so collector and server tests
//! can run without network access.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::FetchError;
use crate::data::{Snapshot, SnapshotProvider};

enum Script {
    /// Same snapshot on every call
    Always(Snapshot),
    /// Same failure message on every call
    AlwaysErr(String),
    /// One result per call, `Provider("script exhausted")` afterwards
    Sequence(Mutex<VecDeque<Result<Snapshot, FetchError>>>),
}

/// Mock provider returning pre-programmed results
pub struct ScriptedProvider {
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_symbol: Mutex<Option<String>>,
}

impl ScriptedProvider {
    fn from_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            last_symbol: Mutex::new(None),
        }
    }

    pub fn always_ok(snapshot: Snapshot) -> Self {
        Self::from_script(Script::Always(snapshot))
    }

    pub fn always_err(message: impl Into<String>) -> Self {
        Self::from_script(Script::AlwaysErr(message.into()))
    }

    pub fn sequence(results: Vec<Result<Snapshot, FetchError>>) -> Self {
        Self::from_script(Script::Sequence(Mutex::new(results.into())))
    }

    /// Sleep before answering (to exercise deadlines and cancellation)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_symbol(&self) -> Option<String> {
        self.last_symbol.lock().clone()
    }
}

#[async_trait]
impl SnapshotProvider for ScriptedProvider {
    async fn fetch(&self, symbol: &str) -> Result<Snapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_symbol.lock() = Some(symbol.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Always(snapshot) => Ok(snapshot.clone()),
            Script::AlwaysErr(message) => Err(FetchError::Provider(message.clone())),
            Script::Sequence(results) => results
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Provider("script exhausted".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sequence_then_exhausted() {
        let provider = ScriptedProvider::sequence(vec![Ok(Snapshot::default())]);
        assert!(provider.fetch("NIFTY").await.is_ok());
        assert!(provider.fetch("NIFTY").await.is_err());
        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.last_symbol().as_deref(), Some("NIFTY"));
    }
}
