//! Dispatch and send counters.

/// Counters covering every accept/drop path of an endpoint.
///
/// A cross-document message channel has no request log to consult after
/// the fact; these counters are the instrumentation hook. They are plain
/// data - read them from the owning endpoint and export them however the
/// embedder monitors things.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Messages validated and delivered to at least the dispatch stage.
    pub delivered: u64,
    /// Messages rejected by the origin policy.
    pub dropped_origin: u64,
    /// Values that failed the structural guard.
    pub dropped_shape: u64,
    /// Messages whose typed decode failed after the guard passed.
    pub dropped_malformed: u64,
    /// Messages rejected by a strict version policy.
    pub dropped_version: u64,
    /// Well-formed messages with no registered handler.
    pub dropped_unrouted: u64,
    /// Version mismatches tolerated under the lenient policy.
    pub version_warnings: u64,
    /// Handler invocations that returned an error.
    pub handler_errors: u64,
    /// Messages posted to the peer frame.
    pub sent: u64,
    /// Sends attempted while no frame was bound (logged no-ops).
    pub send_unbound: u64,
    /// Sends the transport itself rejected.
    pub send_failed: u64,
    /// Responses suppressed because their request was already answered.
    pub duplicate_responses: u64,
    /// Requests settled by deadline expiry instead of a response.
    pub request_timeouts: u64,
}
