//! Shared endpoint machinery for the Mullion cross-frame protocol.
//!
//! Both protocol endpoints - the Shell communicator and the Account App
//! client - are pure state machines over the same building blocks:
//!
//! - [`FrameTransport`]: the seam over the embedder's cross-document
//!   `postMessage` channel, so production pages and the deterministic test
//!   harness drive identical logic.
//! - [`OriginPolicy`]: the inbound trust gate; messages from origins
//!   outside the policy are rejected before any parsing happens.
//! - [`HandlerRegistry`]: kind-keyed callback registrations with teardown
//!   tokens, ordered delivery, and per-handler error isolation.
//! - [`PendingRequests`]: the correlation-keyed deadline map that turns a
//!   request nobody answered into a definitive timeout instead of a hang.
//! - [`DispatchStats`]: counters for every accept/drop path, the
//!   instrumentation hook a `postMessage` boundary otherwise lacks.
//!
//! Nothing here touches a clock or an event loop. Time enters as
//! [`std::time::Instant`] parameters supplied by the embedder, which keeps
//! every component deterministic under test.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod origin;
pub mod pending;
pub mod policy;
pub mod registry;
pub mod stats;
pub mod transport;

pub use origin::OriginPolicy;
pub use pending::PendingRequests;
pub use policy::{VersionDecision, VersionPolicy};
pub use registry::{DispatchReport, HandlerError, HandlerId, HandlerRegistry};
pub use stats::DispatchStats;
pub use transport::{FrameTransport, TransportError};
