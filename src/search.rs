//! Typeahead search pipeline.
//!
//! Raw keystroke terms go in, search results come out. In between, terms
//! are debounced, repeated terms are dropped and a newer search cancels the
//! one still in flight, so a burst of typing turns into a single request
//! for the final term.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::hero::Hero;

/// Quiet period used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub term: String,
    pub heroes: Vec<Hero>,
}

/// Handle to a running pipeline. Dropping it stops the pipeline task and
/// any search still in flight.
pub struct SearchPipeline {
    term_tx: UnboundedSender<String>,
    cancellation_token: CancellationToken,
}

impl SearchPipeline {
    /// Start the pipeline on the current tokio runtime.
    ///
    /// `search` is invoked once per term that survives debouncing and
    /// deduplication. Completed searches are sent to `outcome_tx`.
    pub fn spawn<F, Fut>(
        debounce: Duration,
        search: F,
        outcome_tx: UnboundedSender<SearchOutcome>,
    ) -> Self
    where
        F: Fn(String) -> Fut + Send + 'static,
        Fut: Future<Output = Vec<Hero>> + Send + 'static,
    {
        let (term_tx, term_rx) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();
        tokio::spawn(run(
            term_rx,
            debounce,
            search,
            outcome_tx,
            cancellation_token.clone(),
        ));
        Self {
            term_tx,
            cancellation_token,
        }
    }

    /// Push a new term into the pipeline.
    pub fn search(&self, term: impl Into<String>) {
        let _ = self.term_tx.send(term.into());
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

async fn run<F, Fut>(
    mut term_rx: UnboundedReceiver<String>,
    debounce: Duration,
    search: F,
    outcome_tx: UnboundedSender<SearchOutcome>,
    cancellation_token: CancellationToken,
) where
    F: Fn(String) -> Fut + Send + 'static,
    Fut: Future<Output = Vec<Hero>> + Send + 'static,
{
    let mut pending: Option<String> = None;
    let mut last_term: Option<String> = None;
    let mut in_flight: Option<JoinHandle<()>> = None;

    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            () = cancellation_token.cancelled() => break,
            term = term_rx.recv() => {
                let Some(term) = term else { break };
                pending = Some(term);
                timer.as_mut().reset(Instant::now() + debounce);
            }
            () = &mut timer, if pending.is_some() => {
                let Some(term) = pending.take() else { continue };
                if last_term.as_deref() == Some(term.as_str()) {
                    debug!(term, "Search term unchanged, skipping");
                    continue;
                }
                last_term = Some(term.clone());

                if let Some(previous) = in_flight.take() {
                    previous.abort();
                }

                debug!(term, "Searching");
                let request = search(term.clone());
                let tx = outcome_tx.clone();
                in_flight = Some(tokio::spawn(async move {
                    let heroes = request.await;
                    let _ = tx.send(SearchOutcome { term, heroes });
                }));
            }
        }
    }

    if let Some(handle) = in_flight {
        handle.abort();
    }
}
