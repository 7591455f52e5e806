//! In-Flight Load Module
//!
//! Coordination state for deduplicated loads. At most one computation runs
//! per key at any instant; every concurrent caller for that key awaits the
//! same outcome.

use tokio::sync::watch;

use crate::error::CacheError;

/// Outcome of a load, fanned out to every waiter.
pub(crate) type LoadOutcome<T> = Result<T, CacheError>;

// == Load State ==
/// Coordination handle for a single in-flight load.
///
/// The sender half lives in the detached loader task. Waiters hold clones of
/// the receiver and suspend until the outcome is published. The state is
/// created together with the miss check under the in-flight table lock and
/// removed by the loader task as soon as the computation completes.
#[derive(Debug)]
pub(crate) struct LoadState<T> {
    rx: watch::Receiver<Option<LoadOutcome<T>>>,
}

impl<T: Clone> LoadState<T> {
    // == Constructor ==
    /// Creates the coordination pair for a fresh load.
    ///
    /// The returned sender must publish exactly one `Some(outcome)`.
    pub(crate) fn new() -> (watch::Sender<Option<LoadOutcome<T>>>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self { rx })
    }

    // == Subscribe ==
    /// Registers as a waiter on this load.
    pub(crate) fn subscribe(&self) -> LoadWaiter<T> {
        LoadWaiter {
            rx: self.rx.clone(),
        }
    }
}

// == Load Waiter ==
/// A registered waiter for an in-flight load.
#[derive(Debug)]
pub(crate) struct LoadWaiter<T> {
    rx: watch::Receiver<Option<LoadOutcome<T>>>,
}

impl<T: Clone> LoadWaiter<T> {
    /// Suspends until the load publishes its outcome.
    ///
    /// If the loader task goes away without publishing (runtime shutdown),
    /// waiters get `LoadInterrupted` instead of hanging forever. Dropping
    /// this future detaches the waiter without affecting the load.
    pub(crate) async fn wait(mut self, key: &str) -> LoadOutcome<T> {
        loop {
            let current = self.rx.borrow_and_update().clone();
            if let Some(outcome) = current {
                return outcome;
            }
            if self.rx.changed().await.is_err() {
                return Err(CacheError::LoadInterrupted {
                    key: key.to_string(),
                });
            }
        }
    }
}
