//! Wire schema for the Mullion cross-frame messaging protocol.
//!
//! Messages travel between two independently deployed frontends - the Shell
//! host page and the Account App it embeds - as structured-clone JSON values
//! handed to the embedder's cross-document messaging channel. Every message
//! is an [`Envelope`]: a `source` role, a protocol `version`, an optional
//! `requestId` correlating a request to its single `RESPONSE`, and a
//! type-discriminated payload.
//!
//! The two payload directions are closed sets, modeled as tagged enums
//! ([`ShellPayload`], [`AccountPayload`]) so every dispatch site is an
//! exhaustive match: adding a message type forces a compile-checked update
//! of all consumers.
//!
//! # Validation layers
//!
//! Incoming values cross a trust boundary, so validation is layered:
//! structural guards ([`is_shell_message`], [`is_account_message`]) perform
//! the cheap boundary sniff-test (object shape, sender role, required keys),
//! and [`envelope::decode_shell`] / [`envelope::decode_account`] perform the
//! full typed decode. Receivers fail closed: a value that passes the guard
//! but not the decode is dropped, never partially trusted.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod payloads;
pub mod source;
pub mod version;

pub use envelope::{Envelope, RequestId, is_account_message, is_shell_message};
pub use error::DecodeError;
pub use payloads::{
    AccountKind, AccountPayload, Kinded, Query, ResponseBody, ShellKind, ShellPayload, ThemeMode,
    WalletState,
};
pub use source::Source;
pub use version::{PROTOCOL_VERSION, VersionMatch};
