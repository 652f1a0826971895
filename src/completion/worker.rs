//! Background completion with cancellation by supersession
//!
//! Every submitted document runs on its own task. Submitting a new document
//! cancels the request before it: its result is dropped, never delivered
//! late. Resource fetches already started keep running and still fill the
//! cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::aggregator::Aggregator;
use super::candidate::Candidate;
use super::document::Document;

/// Result of a submitted completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Candidates for the request
    Ready(Vec<Candidate>),
    /// A newer request replaced this one
    Superseded,
}

impl CompletionOutcome {
    /// Candidates, or nothing when superseded
    pub fn into_candidates(self) -> Option<Vec<Candidate>> {
        match self {
            CompletionOutcome::Ready(candidates) => Some(candidates),
            CompletionOutcome::Superseded => None,
        }
    }
}

/// Handle to a request running on the worker
#[derive(Debug)]
pub struct PendingCompletion {
    generation: u64,
    receiver: oneshot::Receiver<Vec<Candidate>>,
}

impl PendingCompletion {
    /// Sequence number of the request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the request to finish or be superseded
    pub async fn wait(self) -> CompletionOutcome {
        match self.receiver.await {
            Ok(candidates) => CompletionOutcome::Ready(candidates),
            Err(_) => CompletionOutcome::Superseded,
        }
    }
}

#[derive(Debug, Default)]
struct Latest {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Runs completion requests off the input loop.
#[derive(Debug)]
pub struct CompletionWorker {
    aggregator: Arc<Aggregator>,
    runtime: Handle,
    latest: Mutex<Latest>,
    current: Arc<AtomicU64>,
}

impl CompletionWorker {
    /// Create a worker spawning requests on `runtime`.
    ///
    /// # Arguments
    /// * `aggregator` - Sources to run for every request
    /// * `runtime` - Runtime the request tasks are spawned on
    pub fn new(aggregator: Arc<Aggregator>, runtime: Handle) -> Self {
        Self {
            aggregator,
            runtime,
            latest: Mutex::new(Latest::default()),
            current: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The aggregator requests run through
    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    /// Generation of the most recent request
    pub fn current_generation(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Start completing `document`, superseding any request still running.
    ///
    /// # Returns
    /// * `PendingCompletion` - Resolves to the candidates, or to
    ///   [`CompletionOutcome::Superseded`] once a newer request is submitted
    pub fn submit(&self, document: Document) -> PendingCompletion {
        let token = CancellationToken::new();
        let generation = {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            latest.generation += 1;
            if let Some(previous) = latest.token.replace(token.clone()) {
                previous.cancel();
            }
            self.current.store(latest.generation, Ordering::SeqCst);
            latest.generation
        };

        let (sender, receiver) = oneshot::channel();
        let aggregator = Arc::clone(&self.aggregator);
        let current = Arc::clone(&self.current);

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(generation, "completion request superseded");
                }
                candidates = aggregator.complete(&document) => {
                    if current.load(Ordering::SeqCst) == generation {
                        // The receiver may be gone already; nothing to deliver then
                        let _ = sender.send(candidates);
                    } else {
                        trace!(generation, "dropping stale completion result");
                    }
                }
            }
        });

        PendingCompletion {
            generation,
            receiver,
        }
    }
}
