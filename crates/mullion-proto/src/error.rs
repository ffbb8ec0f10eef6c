//! Decode failures at the message boundary.

use crate::source::Source;

/// Why an incoming value could not be decoded into an [`crate::Envelope`].
///
/// The first three variants correspond to the structural guard (boundary
/// sniff-test); [`DecodeError::Body`] means the guard passed but the typed
/// decode of the envelope body failed. Receivers treat all of them as
/// "drop the message", but the distinction matters for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The transported value was not a JSON object.
    #[error("message is not a JSON object")]
    NotAnObject,

    /// A required envelope field was absent.
    #[error("message is missing the `{0}` field")]
    MissingField(&'static str),

    /// The `source` field named the wrong role for this receiver.
    #[error("unexpected message source `{found}` (expected `{expected}`)")]
    SourceMismatch {
        /// Role this receiver accepts.
        expected: Source,
        /// What the message actually carried.
        found: String,
    },

    /// Envelope fields or payload did not match the declared `type`.
    #[error("malformed message body: {0}")]
    Body(#[from] serde_json::Error),
}

impl DecodeError {
    /// True when the structural guard itself would have rejected the value.
    pub fn failed_guard(&self) -> bool {
        !matches!(self, Self::Body(_))
    }
}
