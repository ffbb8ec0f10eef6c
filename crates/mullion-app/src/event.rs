//! Events produced for the embedded app's runtime.

use mullion_proto::{Query, RequestId, ThemeMode, WalletState};
use serde_json::Value;

/// Why a request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// No response arrived before the request's deadline.
    #[error("request timed out")]
    Timeout,

    /// The Shell answered with an error.
    #[error("{0}")]
    Remote(String),
}

/// Actions produced by the [`crate::AccountClient`] for the app runtime
/// to execute.
///
/// The runtime consumes these through one exhaustive match - adding a
/// variant forces every consumer to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountEvent {
    /// The host wallet's connectivity changed.
    WalletChanged(WalletState),

    /// The host switched color themes.
    ThemeChanged(ThemeMode),

    /// The host asks the app to navigate.
    Navigate {
        /// Target path inside the app.
        path: String,
        /// Query parameters (empty when the host sent none).
        query: Query,
    },

    /// A request reached its terminal outcome: the Shell's answer, or a
    /// timeout.
    RequestSettled {
        /// The request this settles.
        request_id: RequestId,
        /// Response data on success, [`RequestError`] otherwise.
        result: Result<Option<Value>, RequestError>,
    },
}
