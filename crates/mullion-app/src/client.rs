//! The account-app-side state machine.

use std::time::{Duration, Instant};

use mullion_core::origin::OriginPolicy;
use mullion_core::pending::PendingRequests;
use mullion_core::policy::{VersionDecision, VersionPolicy};
use mullion_core::stats::DispatchStats;
use mullion_core::transport::FrameTransport;
use mullion_proto::{
    AccountPayload, Envelope, Kinded, PROTOCOL_VERSION, Query, RequestId, ShellPayload,
    is_shell_message, version,
};
use serde_json::Value;

use crate::event::{AccountEvent, RequestError};

/// Account client configuration. The Shell's origin is both the send
/// target and the only trusted inbound origin.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Origins inbound messages may arrive from.
    pub allowed_origins: OriginPolicy,

    /// Origin outbound messages are addressed to.
    pub target_origin: String,

    /// Version-mismatch policy for inbound messages.
    pub version_policy: VersionPolicy,

    /// How long a request may stay unanswered before it settles as a
    /// timeout.
    pub request_timeout: Duration,
}

impl AccountConfig {
    /// Config for a single shell origin, with the lenient version policy
    /// and a 30 second request deadline.
    pub fn for_origin(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            allowed_origins: OriginPolicy::single(origin.clone()),
            target_origin: origin,
            version_policy: VersionPolicy::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The embedded app's endpoint: emits requests and announcements to the
/// parent Shell and turns validated inbound messages into
/// [`AccountEvent`]s.
///
/// Requests are correlated by a monotonic per-client id. A request is
/// recorded as pending even when the parent window is not attached - the
/// caller then receives a timeout instead of silence, keeping the
/// "every request settles" contract unconditional.
pub struct AccountClient {
    config: AccountConfig,
    transport: Option<Box<dyn FrameTransport>>,
    pending: PendingRequests,
    next_request: u64,
    stats: DispatchStats,
}

impl AccountClient {
    /// Client with no parent window attached yet.
    pub fn new(config: AccountConfig) -> Self {
        Self {
            config,
            transport: None,
            pending: PendingRequests::new(),
            next_request: 0,
            stats: DispatchStats::default(),
        }
    }

    /// Attach (or re-attach) the parent window's transport.
    pub fn attach_shell(&mut self, transport: Box<dyn FrameTransport>) {
        self.transport = Some(transport);
    }

    /// Drop the parent transport; sends become logged no-ops.
    pub fn detach_shell(&mut self) {
        self.transport = None;
    }

    /// Whether a parent window is attached.
    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Announce that the app has booted and can receive pushes.
    pub fn announce_ready(&mut self) {
        self.post(Envelope::account(AccountPayload::AppReady {
            version: PROTOCOL_VERSION.to_string(),
        }));
    }

    /// Report an internal route change for the host to mirror.
    pub fn notify_navigation(&mut self, path: impl Into<String>, query: Option<Query>) {
        self.post(Envelope::account(AccountPayload::NavigationChanged {
            path: path.into(),
            query,
        }));
    }

    /// Ask for the current wallet snapshot.
    pub fn request_wallet_state(&mut self, now: Instant) -> RequestId {
        self.request(AccountPayload::RequestWalletState, now)
    }

    /// Ask the host to start its wallet-connection flow.
    pub fn request_connect_wallet(&mut self, now: Instant) -> RequestId {
        self.request(AccountPayload::RequestConnectWallet, now)
    }

    /// Ask the host to disconnect the current wallet.
    pub fn request_disconnect_wallet(&mut self, now: Instant) -> RequestId {
        self.request(AccountPayload::RequestDisconnectWallet, now)
    }

    /// Ask the host to switch the wallet to another chain.
    pub fn request_switch_chain(&mut self, chain_id: impl Into<String>, now: Instant) -> RequestId {
        self.request(AccountPayload::RequestSwitchChain { chain_id: chain_id.into() }, now)
    }

    /// Proxy a JSON-RPC call through the host.
    pub fn rpc_request(
        &mut self,
        method: impl Into<String>,
        params: Vec<Value>,
        now: Instant,
    ) -> RequestId {
        self.request(AccountPayload::RpcRequest { method: method.into(), params }, now)
    }

    /// Validate one inbound value and translate it into events.
    ///
    /// The validation pipeline mirrors the Shell side: origin allow-list,
    /// structural guard, typed decode, version policy. A `RESPONSE`
    /// settles its pending request; late or unknown correlation ids are
    /// dropped with a warning.
    pub fn receive(&mut self, raw: &Value, origin: &str) -> Vec<AccountEvent> {
        if !self.config.allowed_origins.allows(origin) {
            tracing::warn!(origin, "dropping message from disallowed origin");
            self.stats.dropped_origin += 1;
            return Vec::new();
        }

        if !is_shell_message(raw) {
            tracing::trace!("dropping value that failed the shell-message guard");
            self.stats.dropped_shape += 1;
            return Vec::new();
        }

        let envelope = match mullion_proto::envelope::decode_shell(raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::debug!(%error, "dropping malformed shell message");
                self.stats.dropped_malformed += 1;
                return Vec::new();
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
                return Vec::new();
            },
        }

        self.stats.delivered += 1;
        match envelope.payload {
            ShellPayload::WalletStateChanged(state) => vec![AccountEvent::WalletChanged(state)],
            ShellPayload::ThemeChanged { mode } => vec![AccountEvent::ThemeChanged(mode)],
            ShellPayload::Navigate { path, query } => {
                vec![AccountEvent::Navigate { path, query: query.unwrap_or_default() }]
            },
            ShellPayload::Response(body) => {
                let Some(request_id) = envelope.request_id else {
                    tracing::warn!("dropping response without a requestId");
                    self.stats.dropped_malformed += 1;
                    return Vec::new();
                };
                if !self.pending.complete(&request_id) {
                    tracing::warn!(%request_id, "dropping late or unknown response");
                    self.stats.duplicate_responses += 1;
                    return Vec::new();
                }
                let result = body.into_result().map_err(RequestError::Remote);
                vec![AccountEvent::RequestSettled { request_id, result }]
            },
        }
    }

    /// Settle every request whose deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<AccountEvent> {
        self.pending
            .expire(now)
            .into_iter()
            .map(|request_id| {
                tracing::warn!(%request_id, "request timed out without a response");
                self.stats.request_timeouts += 1;
                AccountEvent::RequestSettled { request_id, result: Err(RequestError::Timeout) }
            })
            .collect()
    }

    /// Number of requests still awaiting their response.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Counters for every accept/drop path.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    fn request(&mut self, payload: AccountPayload, now: Instant) -> RequestId {
        self.next_request += 1;
        let request_id = RequestId::new(format!("req-{}", self.next_request));
        // Recorded before posting: even a send into the void settles as a
        // timeout instead of hanging the caller.
        self.pending.insert(request_id.clone(), now, self.config.request_timeout);
        self.post(Envelope::account(payload).with_request_id(request_id.clone()));
        request_id
    }

    fn post(&mut self, envelope: Envelope<AccountPayload>) {
        let kind = envelope.payload.kind();
        let Some(transport) = self.transport.as_mut() else {
            tracing::warn!(%kind, "no parent window attached; dropping outbound message");
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
                tracing::warn!(%kind, %error, "posting to the parent window failed");
                self.stats.send_failed += 1;
            },
        }
    }
}
