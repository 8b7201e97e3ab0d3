//! In-flight submission tracking.
//!
//! Each browser session builds its own copy of the session state, so two
//! concurrent form posts cannot see each other through the session. The
//! tracker is shared across requests instead: it remembers the latest request
//! id per `(submission, email)` so that duplicates are refused and late
//! responses for superseded requests are discarded.
//!
//! A [`Ticket`] releases its entry when dropped, so a request abandoned
//! mid-flight (client disconnect, reload) does not block retries until the
//! TTL runs out.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache;
use portfolio_core::Email;

use super::{AuthError, Submission};

/// Upper bound on tracked submissions.
const MAX_TRACKED: u64 = 10_000;

type TrackerKey = (Submission, String);

fn tracker_key(kind: Submission, email: &Email) -> TrackerKey {
    (kind, email.as_str().to_ascii_lowercase())
}

/// Tracks backend submissions that have not yet completed.
#[derive(Clone)]
pub struct SubmissionTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    latest: Cache<TrackerKey, u64>,
    next_id: AtomicU64,
}

/// A registered submission.
///
/// Pass it back to [`SubmissionTracker::finish`] once the backend has
/// answered. Dropping it unfinished releases the entry if it is still the
/// latest for its key.
#[must_use = "dropping a ticket releases its submission immediately"]
pub struct Ticket {
    latest: Cache<TrackerKey, u64>,
    key: TrackerKey,
    id: u64,
    finished: bool,
}

impl Ticket {
    /// Request id of this submission.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Remove the entry if it still carries this ticket's id.
    ///
    /// Returns whether the entry was removed.
    fn release(&self) -> bool {
        let id = self.id;
        let result = self
            .latest
            .entry(self.key.clone())
            .and_compute_with(|entry| match entry {
                Some(entry) if *entry.value() == id => Op::Remove,
                _ => Op::Nop,
            });
        matches!(result, CompResult::Removed(_))
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if !self.finished && self.release() {
            tracing::debug!(
                submission = ?self.key.0,
                request_id = self.id,
                "released abandoned submission"
            );
        }
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("submission", &self.key.0)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl SubmissionTracker {
    /// Create a tracker whose entries expire after `ttl`.
    ///
    /// The TTL should exceed the backend timeout so that an entry can only
    /// expire once its request is guaranteed to have finished.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let latest = Cache::builder()
            .max_capacity(MAX_TRACKED)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(TrackerInner {
                latest,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a new submission.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InFlight` if the same submission for the same email
    /// is still waiting for the backend.
    pub fn begin(&self, kind: Submission, email: &Email) -> Result<Ticket, AuthError> {
        let key = tracker_key(kind, email);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let entry = self.inner.latest.entry(key.clone()).or_insert_with(|| id);

        if !entry.is_fresh() {
            tracing::info!(
                submission = ?kind,
                email = %email.masked(),
                "refusing duplicate submission"
            );
            return Err(AuthError::InFlight(kind));
        }

        Ok(Ticket {
            latest: self.inner.latest.clone(),
            key,
            id,
            finished: false,
        })
    }

    /// Complete a submission.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Stale` if the entry was replaced or expired while
    /// the request was in flight; its response must not be applied.
    pub fn finish(&self, mut ticket: Ticket) -> Result<(), AuthError> {
        ticket.finished = true;
        if ticket.release() {
            return Ok(());
        }

        tracing::warn!(
            submission = ?ticket.key.0,
            request_id = ticket.id,
            latest = ?self.inner.latest.get(&ticket.key),
            "discarding stale backend response"
        );
        Err(AuthError::Stale)
    }

    /// Whether a submission for this email is currently in flight.
    #[must_use]
    pub fn is_in_flight(&self, kind: Submission, email: &Email) -> bool {
        self.inner.latest.contains_key(&tracker_key(kind, email))
    }
}
