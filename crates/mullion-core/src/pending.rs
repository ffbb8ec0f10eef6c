//! Correlation-keyed pending-request tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mullion_proto::RequestId;

/// Requests awaiting their `RESPONSE`, each with a deadline.
///
/// Used on both sides of the exchange: the requester records outbound
/// requests so a missing answer becomes a definitive timeout, and the
/// responder records inbound requests so a handler that never answers
/// still produces a terminal error response. The owner drives expiry by
/// calling [`PendingRequests::expire`] from its periodic tick.
#[derive(Debug, Default)]
pub struct PendingRequests {
    deadlines: HashMap<RequestId, Instant>,
}

impl PendingRequests {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request with a deadline of `now + timeout`.
    ///
    /// Returns false (and leaves the original deadline in place) when the
    /// id is already pending - correlation ids must not be reused while
    /// in flight.
    pub fn insert(&mut self, id: RequestId, now: Instant, timeout: Duration) -> bool {
        if self.deadlines.contains_key(&id) {
            return false;
        }
        self.deadlines.insert(id, now + timeout);
        true
    }

    /// Settle a request, removing it from the map.
    ///
    /// Returns false when the id was unknown - either never pending or
    /// already settled (a late or duplicate response).
    pub fn complete(&mut self, id: &RequestId) -> bool {
        self.deadlines.remove(id).is_some()
    }

    /// Whether `id` is still awaiting its response.
    pub fn contains(&self, id: &RequestId) -> bool {
        self.deadlines.contains_key(id)
    }

    /// Remove and return every request whose deadline has been reached.
    ///
    /// Ids are returned in sorted order so expiry processing is
    /// deterministic.
    pub fn expire(&mut self, now: Instant) -> Vec<RequestId> {
        let mut expired: Vec<RequestId> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(id, _)| id.clone())
            .collect();
        expired.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for id in &expired {
            self.deadlines.remove(id);
        }
        expired
    }

    /// Drop every in-flight request without settling it.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    /// Number of in-flight requests.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// True when nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
