//! Cooperative cancellation for cache and store calls

use crate::error::{CacheError, Result};
use std::future::Future;
use tokio::sync::watch;

/// Receiving side of a cancellation pair. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

/// Sending side of a cancellation pair
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelSignal {
    /// Create a linked handle/signal pair
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx: Some(rx) })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Resolve once cancellation is requested; pends forever otherwise
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling
                return std::future::pending().await;
            }
        }
    }

    /// Fail with [`CacheError::Cancelled`] if cancellation was requested
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(CacheError::Cancelled(operation.to_string()))
        } else {
            Ok(())
        }
    }

    /// Drive `fut` to completion unless cancellation fires first
    pub async fn run<F, T>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(operation)?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(CacheError::Cancelled(operation.to_string())),
            result = fut => result,
        }
    }
}

impl CancelHandle {
    /// Request cancellation of every linked signal
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
