//! Shell-side endpoint of the Mullion cross-frame protocol.
//!
//! The Shell is the host page: it owns the embedded account frame, knows
//! the connected wallet, and owns the address bar. This crate provides the
//! two pieces the host wires together at bootstrap:
//!
//! - [`ShellCommunicator`]: the single mediator between the raw
//!   cross-document transport and typed logic. Inbound values pass an
//!   origin gate, a structural guard, a typed decode, and a version policy
//!   before handlers run; outbound sends stamp the protocol version and
//!   target the configured origin. Every inbound request is guaranteed a
//!   terminal `RESPONSE` - immediately, from a handler, or as a timeout
//!   error from [`ShellCommunicator::tick`].
//! - [`FrameHost`]: owns the frame lifecycle. It computes the frame URL
//!   from router state, pushes wallet snapshots, and registers the
//!   handler group translating Account App messages into calls on the
//!   embedder-implemented [`WalletProvider`] and [`Router`] seams.
//!
//! There is no global communicator: the host constructs one explicitly
//! and hands it to the [`FrameHost`], so tests build a fresh pair per
//! scenario.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod communicator;
pub mod config;
pub mod frame_url;
pub mod host;
pub mod router;
pub mod wallet;

pub use communicator::{DispatchOutcome, DropReason, Reply, ShellCommunicator, ShellConfig};
pub use config::{ConfigError, HostConfig};
pub use frame_url::{ACCOUNT_PARAM, FrameUrlError};
pub use host::FrameHost;
pub use router::{RouteLocation, Router};
pub use wallet::{ConnectedWallet, WalletError, WalletProvider};
