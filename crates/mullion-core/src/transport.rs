//! Transport seam over the embedder's cross-document messaging channel.

use serde_json::Value;

/// Posts structured-clone JSON values into the peer frame.
///
/// Production embedders wrap a frame window handle; the test harness
/// records posts into a queue. Either way the endpoint logic is identical.
///
/// `target_origin` is the origin the message is addressed to. An
/// implementation must not deliver to a document whose origin differs -
/// this is the outbound half of the origin discipline ([`crate::origin`]
/// is the inbound half).
pub trait FrameTransport {
    /// Post one message value to the peer frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Detached`] when the peer window no longer
    /// exists (frame torn down between bind and send).
    fn post(&mut self, message: &Value, target_origin: &str) -> Result<(), TransportError>;
}

/// Failure while posting into the peer frame.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer window has been destroyed.
    #[error("peer frame window is detached")]
    Detached,

    /// Embedder-specific failure.
    #[error("transport failure: {0}")]
    Other(String),
}
