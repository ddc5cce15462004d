//! Debouncing of rapidly repeated queries.
//!
//! Every submission takes a [`RequestTicket`]. A ticket stays current until
//! a newer submission is made, so a caller can both skip dispatching a
//! query that was typed over and ignore a response that arrived after a
//! newer request superseded it.
//!
//! Intended for interactive front ends built on this crate. The `marquee`
//! binary runs one query per invocation and has no use for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default quiet period before a query is dispatched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Issues tickets and waits out the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Quiet period after the latest submission.
    interval: Duration,
    /// Generation of the newest ticket.
    latest: Arc<AtomicU64>,
}

/// Marks one submission. Compare with [`RequestTicket::is_current`].
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RequestTicket {
    /// Returns `true` while no newer submission has been made.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a new submission, superseding every earlier ticket.
    #[must_use]
    pub fn submit(&self) -> RequestTicket {
        let generation = self
            .latest
            .fetch_add(1, Ordering::AcqRel)
            .wrapping_add(1);
        RequestTicket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Waits for the quiet period and returns the ticket if it is still
    /// the newest, or `None` if a later submission superseded it.
    pub async fn settle(&self, ticket: RequestTicket) -> Option<RequestTicket> {
        tokio::time::sleep(self.interval).await;
        if ticket.is_current() {
            Some(ticket)
        } else {
            tracing::trace!(generation = ticket.generation, "Submission superseded");
            None
        }
    }

    /// Submits and waits in one step.
    pub async fn debounce(&self) -> Option<RequestTicket> {
        let ticket = self.submit();
        self.settle(ticket).await
    }
}
