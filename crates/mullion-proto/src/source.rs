//! Sender roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical sender of a message.
///
/// A receiver accepts a message only when its `source` names the opposite
/// role: the Shell communicator accepts [`Source::AccountApp`] messages and
/// the Account App client accepts [`Source::Shell`] messages. Anything else
/// is rejected at the structural guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// The host page embedding the account frame.
    Shell,
    /// The embedded account micro-frontend.
    AccountApp,
}

impl Source {
    /// The exact string carried in the `source` field on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::AccountApp => "account-app",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
