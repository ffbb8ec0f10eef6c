//! Deterministic loopback harness for the Mullion protocol.
//!
//! Wires a real [`mullion_shell::FrameHost`] and a real
//! [`mullion_app::AccountClient`] back to back through queued in-memory
//! transports, with virtual time. Nothing is mocked below the endpoints:
//! the bytes crossing the harness are exactly the values a page would hand
//! to its cross-document channel, so integration tests exercise the same
//! validation pipeline production does.
//!
//! The "network" of this protocol is same-thread message posting between
//! two documents, so the harness models it as two queues pumped to
//! quiescence ([`World::pump`]) and a manually advanced clock
//! ([`World::advance`]) - arrival order is delivery order, exactly like
//! the browser's event loop.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fakes;
pub mod world;

pub use fakes::{DeadTransport, QueueTransport, RecordingRouter, ScriptedWallet};
pub use world::{ACCOUNT_ORIGIN, SHELL_ORIGIN, World};
