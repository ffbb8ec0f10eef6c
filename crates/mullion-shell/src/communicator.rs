//! The shell-side message dispatcher.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use mullion_core::origin::OriginPolicy;
use mullion_core::pending::PendingRequests;
use mullion_core::policy::{VersionDecision, VersionPolicy};
use mullion_core::registry::{HandlerError, HandlerId, HandlerRegistry};
use mullion_core::stats::DispatchStats;
use mullion_core::transport::FrameTransport;
use mullion_proto::{
    AccountKind, AccountPayload, Envelope, Kinded, PROTOCOL_VERSION, Query, RequestId,
    ResponseBody, ShellPayload, ThemeMode, WalletState, is_account_message, version,
};
use serde_json::Value;

/// Communicator configuration.
///
/// `allowed_origins` and `target_origin` are deliberately mandatory: the
/// permissive wildcard of the underlying browser API is never used.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Origins inbound messages may arrive from.
    pub allowed_origins: OriginPolicy,

    /// Origin outbound messages are addressed to.
    pub target_origin: String,

    /// Version-mismatch policy for inbound messages.
    pub version_policy: VersionPolicy,

    /// Deadline for answering an inbound request before the communicator
    /// answers it with a timeout error.
    pub response_timeout: Duration,
}

impl ShellConfig {
    /// Config for a single account-app origin: it is both the send target
    /// and the only allowed inbound origin. Lenient version policy, 30
    /// second response deadline.
    pub fn for_origin(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            allowed_origins: OriginPolicy::single(origin.clone()),
            target_origin: origin,
            version_policy: VersionPolicy::default(),
            response_timeout: Duration::from_secs(30),
        }
    }
}

/// Output of a shell-side message handler, executed by the communicator
/// after the handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Push a message to the account app.
    Message(ShellPayload),

    /// Answer the request being dispatched. The communicator correlates
    /// this to the inbound `requestId`; handlers never fabricate ids.
    Response(ResponseBody),
}

impl Reply {
    /// Successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self::Response(ResponseBody::ok(data))
    }

    /// Successful response with no data.
    pub fn ack() -> Self {
        Self::Response(ResponseBody::ack())
    }

    /// Failed response.
    pub fn err(message: impl Into<String>) -> Self {
        Self::Response(ResponseBody::err(message))
    }
}

/// Why an inbound value was not delivered to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Origin outside the allow-list.
    Origin,
    /// Failed the structural guard.
    Shape,
    /// Guard passed, typed decode failed.
    Malformed,
    /// Rejected by a strict version policy.
    Version,
    /// Request id already in flight or already answered.
    ReplayedRequest,
    /// Well-formed, but nothing registered for this kind.
    Unrouted(AccountKind),
}

/// What [`ShellCommunicator::receive`] did with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Delivered to `handlers` registered handlers.
    Delivered {
        /// Message kind that was dispatched.
        kind: AccountKind,
        /// Number of handlers invoked.
        handlers: usize,
    },
    /// A request kind with no handler; answered with an error response.
    AnsweredUnrouted(AccountKind),
    /// Dropped without reaching handlers.
    Dropped(DropReason),
}

/// Recently answered request ids, bounded so a chatty peer cannot grow
/// memory. Old entries fall off in answer order.
#[derive(Debug, Default)]
struct AnsweredLog {
    ids: HashSet<RequestId>,
    order: VecDeque<RequestId>,
}

impl AnsweredLog {
    const CAP: usize = 1024;

    fn contains(&self, id: &RequestId) -> bool {
        self.ids.contains(id)
    }

    fn record(&mut self, id: RequestId) {
        if !self.ids.insert(id.clone()) {
            return;
        }
        self.order.push_back(id);
        if self.order.len() > Self::CAP {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
    }

    fn clear(&mut self) {
        self.ids.clear();
        self.order.clear();
    }
}

/// The sole mediator between the raw cross-frame transport and typed
/// shell logic.
///
/// Inbound values pass, in order: the origin allow-list, the structural
/// guard, the typed decode, and the version policy; only then do
/// registered handlers run. Outbound sends degrade to logged no-ops while
/// no frame is bound - callers are never blocked by transport
/// unavailability.
///
/// # Request/response discipline
///
/// Every inbound request receives exactly one `RESPONSE`:
///
/// - a handler answers it (usually synchronously, via [`Reply::Response`]),
/// - or nothing is registered for it and the communicator answers with an
///   error immediately,
/// - or its handlers defer and [`ShellCommunicator::tick`] answers with a
///   timeout error once the response deadline passes.
///
/// Duplicate answers for one id are suppressed and counted.
pub struct ShellCommunicator {
    config: ShellConfig,
    transport: Option<Box<dyn FrameTransport>>,
    registry: HandlerRegistry<AccountPayload, Reply>,
    /// Inbound requests awaiting their answer.
    pending: PendingRequests,
    answered: AnsweredLog,
    stats: DispatchStats,
}

impl ShellCommunicator {
    /// Communicator with no frame bound yet.
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            transport: None,
            registry: HandlerRegistry::new(),
            pending: PendingRequests::new(),
            answered: AnsweredLog::default(),
            stats: DispatchStats::default(),
        }
    }

    /// Bind (or re-bind) the frame transport. Replaces any previous
    /// binding, so re-binding after a frame remount cannot double-send.
    pub fn bind_frame(&mut self, transport: Box<dyn FrameTransport>) {
        self.transport = Some(transport);
    }

    /// Drop the frame transport; subsequent sends become logged no-ops.
    pub fn unbind_frame(&mut self) {
        self.transport = None;
    }

    /// Whether a frame is currently bound.
    pub fn is_bound(&self) -> bool {
        self.transport.is_some()
    }

    /// Register `handler` for inbound messages of `kind`.
    pub fn on(
        &mut self,
        kind: AccountKind,
        handler: impl FnMut(&Envelope<AccountPayload>) -> Result<Vec<Reply>, HandlerError> + 'static,
    ) -> HandlerId {
        self.registry.on(kind, handler)
    }

    /// Remove one handler registration. Safe to call twice.
    pub fn off(&mut self, id: HandlerId) -> bool {
        self.registry.off(id)
    }

    /// Push a wallet snapshot to the account app.
    pub fn send_wallet_state(&mut self, state: &WalletState) {
        if !state.is_consistent() {
            tracing::warn!(
                is_connected = state.is_connected,
                "wallet snapshot connection flag disagrees with identity fields"
            );
        }
        self.post_payload(ShellPayload::WalletStateChanged(state.clone()));
    }

    /// Push a theme change to the account app.
    pub fn send_theme_change(&mut self, mode: ThemeMode) {
        self.post_payload(ShellPayload::ThemeChanged { mode });
    }

    /// Ask the account app to navigate.
    pub fn send_navigation(&mut self, path: impl Into<String>, query: Option<Query>) {
        self.post_payload(ShellPayload::Navigate { path: path.into(), query });
    }

    /// Answer an inbound request out of band.
    ///
    /// Handlers normally answer via [`Reply::Response`]; this entry point
    /// exists for deferred fulfillment, where the answer is only known
    /// after the dispatch that delivered the request has returned.
    pub fn respond(&mut self, id: RequestId, body: ResponseBody) {
        if self.answered.contains(&id) {
            tracing::warn!(%id, "suppressing duplicate response");
            self.stats.duplicate_responses += 1;
            return;
        }
        self.pending.complete(&id);
        self.answered.record(id.clone());
        let envelope = Envelope::shell(ShellPayload::Response(body)).with_request_id(id);
        self.post_envelope(&envelope);
    }

    /// Validate and dispatch one inbound value.
    ///
    /// `origin` is the browser origin the value arrived from; `now` drives
    /// the response deadline recorded for request kinds.
    pub fn receive(&mut self, raw: &Value, origin: &str, now: Instant) -> DispatchOutcome {
        if !self.config.allowed_origins.allows(origin) {
            tracing::warn!(origin, "dropping message from disallowed origin");
            self.stats.dropped_origin += 1;
            return DispatchOutcome::Dropped(DropReason::Origin);
        }

        if !is_account_message(raw) {
            tracing::trace!("dropping value that failed the account-message guard");
            self.stats.dropped_shape += 1;
            return DispatchOutcome::Dropped(DropReason::Shape);
        }

        let envelope = match mullion_proto::envelope::decode_account(raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::debug!(%error, "dropping malformed account message");
                self.stats.dropped_malformed += 1;
                return DispatchOutcome::Dropped(DropReason::Malformed);
            },
        };

        match self.config.version_policy.decide(version::classify(&envelope.version)) {
            VersionDecision::Accept => {},
            VersionDecision::Warn => {
                tracing::warn!(
                    theirs = %envelope.version,
                    ours = PROTOCOL_VERSION,
                    "protocol version mismatch; processing anyway"
                );
                self.stats.version_warnings += 1;
            },
            VersionDecision::Reject => {
                tracing::warn!(
                    theirs = %envelope.version,
                    ours = PROTOCOL_VERSION,
                    "rejecting message at incompatible protocol version"
                );
                self.stats.dropped_version += 1;
                return DispatchOutcome::Dropped(DropReason::Version);
            },
        }

        let kind = envelope.payload.kind();

        if kind.is_request() {
            match &envelope.request_id {
                Some(id) => {
                    if self.answered.contains(id) || self.pending.contains(id) {
                        tracing::warn!(%id, %kind, "dropping request with an in-flight or answered id");
                        return DispatchOutcome::Dropped(DropReason::ReplayedRequest);
                    }
                    self.pending.insert(id.clone(), now, self.config.response_timeout);
                },
                None => {
                    tracing::warn!(%kind, "request arrived without a requestId and cannot be answered");
                },
            }
        }

        if self.registry.count(kind) == 0 {
            if kind.is_request() {
                if let Some(id) = envelope.request_id.clone() {
                    tracing::warn!(%kind, %id, "no handler for request; answering with an error");
                    self.respond(id, ResponseBody::err(format!("Unsupported request: {kind}")));
                    return DispatchOutcome::AnsweredUnrouted(kind);
                }
            }
            tracing::trace!(%kind, "no handler registered; dropping");
            self.stats.dropped_unrouted += 1;
            return DispatchOutcome::Dropped(DropReason::Unrouted(kind));
        }

        self.stats.delivered += 1;
        let mut replies = Vec::new();
        let report = self.registry.dispatch(&envelope, &mut replies);
        self.stats.handler_errors += report.failed as u64;

        for reply in replies {
            match reply {
                Reply::Message(payload) => {
                    let outbound = Envelope::shell(payload);
                    self.post_envelope(&outbound);
                },
                Reply::Response(body) => match envelope.request_id.clone() {
                    Some(id) => self.respond(id, body),
                    None => {
                        tracing::warn!(
                            %kind,
                            "handler produced a response but the message carried no requestId"
                        );
                    },
                },
            }
        }

        DispatchOutcome::Delivered { kind, handlers: report.invoked }
    }

    /// Answer every inbound request whose response deadline has passed.
    ///
    /// Returns how many were timed out. Call this from the host's
    /// periodic tick.
    pub fn tick(&mut self, now: Instant) -> usize {
        let expired = self.pending.expire(now);
        let count = expired.len();
        for id in expired {
            tracing::warn!(%id, "request not answered before its deadline");
            self.stats.request_timeouts += 1;
            self.respond(id, ResponseBody::err("Request timed out"));
        }
        count
    }

    /// Counters for every accept/drop path.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Number of inbound requests still awaiting an answer.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Tear down: drop all handlers, pending state, and the transport.
    /// Idempotent.
    pub fn shutdown(&mut self) {
        self.registry.clear();
        self.pending.clear();
        self.answered.clear();
        self.transport = None;
    }

    fn post_payload(&mut self, payload: ShellPayload) {
        let envelope = Envelope::shell(payload);
        self.post_envelope(&envelope);
    }

    fn post_envelope(&mut self, envelope: &Envelope<ShellPayload>) {
        let kind = envelope.payload.kind();
        let Some(transport) = self.transport.as_mut() else {
            tracing::warn!(%kind, "no frame bound; dropping outbound message");
            self.stats.send_unbound += 1;
            return;
        };

        let value = match envelope.to_value() {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(%kind, %error, "failed to serialize outbound message");
                self.stats.send_failed += 1;
                return;
            },
        };

        match transport.post(&value, &self.config.target_origin) {
            Ok(()) => self.stats.sent += 1,
            Err(error) => {
                tracing::warn!(%kind, %error, "posting to the account frame failed");
                self.stats.send_failed += 1;
            },
        }
    }
}
