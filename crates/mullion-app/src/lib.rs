//! Account-app-side endpoint of the Mullion cross-frame protocol.
//!
//! The embedded account frontend talks to its host Shell through an
//! [`AccountClient`]: an action-based state machine that emits requests
//! with correlation ids, announces readiness, reports internal navigation,
//! and translates validated inbound Shell messages into [`AccountEvent`]s
//! for the app's runtime to execute.
//!
//! The client never hangs a caller: every request it emits is tracked
//! with a deadline, and [`AccountClient::tick`] settles overdue requests
//! with [`RequestError::Timeout`] so the asking code always receives a
//! terminal outcome.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod event;

pub use client::{AccountClient, AccountConfig};
pub use event::{AccountEvent, RequestError};
