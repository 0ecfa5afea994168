use crate::error::Result;
use crate::event::{CrawlEvent, EventSender};
use crate::graph::{CrawlGraph, GraphStats};
use crate::session::{CrawlBudgets, CrawlSession, SessionEnd, validate_request};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;
use wikigrapher_scraper::LinkFetcher;

/// Shared cooperative stop signal. Setting it never interrupts an in-flight
/// fetch; the scheduler honors it at the next polling point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Completed(GraphStats),
    Cancelled,
    /// Another session held the gate; no work was started.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The graph document; partial if the run was cancelled.
    Graph(CrawlGraph),
    Busy,
}

/// Owns the single-flight gate and the cancellation token: at most one
/// crawl session runs at a time across whoever shares a clone of this
/// manager. Idle -> Running on acquisition, back to Idle on every exit
/// path.
#[derive(Debug, Clone, Default)]
pub struct CrawlManager {
    running: Arc<AtomicBool>,
    cancel: CancelToken,
}

/// Releases the gate when dropped, so a panic inside the session cannot
/// leave it held.
struct GateGuard(Arc<AtomicBool>);

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CrawlManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request a cooperative stop of the active session. Returns whether a
    /// session was actually running; with no active session this is a no-op
    /// that is still acknowledged.
    pub fn request_cancel(&self) -> bool {
        if self.is_running() {
            info!("Cancellation requested");
            self.cancel.cancel();
            true
        } else {
            false
        }
    }

    fn try_acquire(&self) -> Option<GateGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| GateGuard(self.running.clone()))
    }

    /// Streaming variant: run one crawl session, pushing events into the
    /// channel as the graph grows. Validation happens before any gate
    /// interaction; a held gate yields a `busy` event and outcome without
    /// touching the in-flight session.
    pub async fn crawl<F: LinkFetcher>(
        &self,
        fetcher: &F,
        seed: &str,
        budgets: CrawlBudgets,
        events: &EventSender,
    ) -> Result<CrawlOutcome> {
        validate_request(seed, budgets)?;

        let Some(_gate) = self.try_acquire() else {
            info!("Rejecting crawl of {}: another crawl is in progress", seed);
            let _ = events.send(CrawlEvent::Busy {
                message: "Another crawl is in progress".to_string(),
            });
            return Ok(CrawlOutcome::Busy);
        };

        let session_id = Uuid::new_v4();
        info!("Session {} crawling from {}", session_id, seed);

        let mut session = CrawlSession::new(fetcher, seed, budgets, self.cancel.clone())?;
        match session.run(Some(events)).await {
            Ok(SessionEnd::Completed(stats)) => Ok(CrawlOutcome::Completed(stats)),
            Ok(SessionEnd::Cancelled) => Ok(CrawlOutcome::Cancelled),
            Err(e) => {
                warn!("Session {} failed: {}", session_id, e);
                // Best effort; the stream may already be gone.
                let _ = events.send(CrawlEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Batch variant: run the same scheduler without a stream and return
    /// the whole graph document at the end.
    pub async fn crawl_graph<F: LinkFetcher>(
        &self,
        fetcher: &F,
        seed: &str,
        budgets: CrawlBudgets,
    ) -> Result<BatchOutcome> {
        validate_request(seed, budgets)?;

        let Some(_gate) = self.try_acquire() else {
            info!("Rejecting crawl of {}: another crawl is in progress", seed);
            return Ok(BatchOutcome::Busy);
        };

        let session_id = Uuid::new_v4();
        info!("Session {} building graph from {}", session_id, seed);

        let mut session = CrawlSession::new(fetcher, seed, budgets, self.cancel.clone())?;
        session.run(None).await?;
        Ok(BatchOutcome::Graph(session.snapshot()))
    }
}
