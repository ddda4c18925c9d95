// View lifetime scope. Every fetch a view starts runs under its scope's token;
// tearing the view down aborts fetches still in flight, and results that land
// after teardown are discarded instead of being written into view state.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("view was torn down before the request completed")]
pub struct Cancelled;

#[derive(Debug, Clone)]
pub struct ViewScope {
    tx: Arc<watch::Sender<bool>>,
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            rx: self.tx.subscribe(),
        }
    }

    // Idempotent
    pub fn teardown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_torn_down(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ScopeToken {
    rx: watch::Receiver<bool>,
}

impl ScopeToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    // Resolves once the owning scope is torn down or dropped
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    // Runs `fut` unless the scope goes away first
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Cancelled),
            out = fut => {
                // A result that raced teardown is still a late result
                if self.is_cancelled() {
                    Err(Cancelled)
                } else {
                    Ok(out)
                }
            }
        }
    }
}
