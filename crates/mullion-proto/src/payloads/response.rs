//! The shared `RESPONSE` payload.

use serde::{Deserialize, Serialize};

/// Body of a `RESPONSE` message, in either direction.
///
/// Exactly one of `data` or `error` is expected to be populated; an empty
/// body is a bare acknowledgement. The correlating `requestId` lives on the
/// envelope, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Successful result, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Failure description, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseBody {
    /// Successful response carrying `data`.
    pub fn ok(data: serde_json::Value) -> Self {
        Self { data: Some(data), error: None }
    }

    /// Successful response with no data (a bare acknowledgement).
    pub fn ack() -> Self {
        Self::default()
    }

    /// Failed response carrying an error message.
    pub fn err(message: impl Into<String>) -> Self {
        Self { data: None, error: Some(message.into()) }
    }

    /// True when this response reports a failure.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Split into the requester-facing result.
    pub fn into_result(self) -> Result<Option<serde_json::Value>, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ok_omits_error_key() {
        let value = serde_json::to_value(ResponseBody::ok(json!({"n": 1}))).unwrap();
        assert_eq!(value, json!({"data": {"n": 1}}));
    }

    #[test]
    fn err_omits_data_key() {
        let value = serde_json::to_value(ResponseBody::err("nope")).unwrap();
        assert_eq!(value, json!({"error": "nope"}));
    }

    #[test]
    fn ack_is_empty_object() {
        let value = serde_json::to_value(ResponseBody::ack()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn into_result_prefers_error() {
        assert_eq!(ResponseBody::err("boom").into_result(), Err("boom".to_string()));
        assert_eq!(ResponseBody::ok(json!(2)).into_result(), Ok(Some(json!(2))));
        assert_eq!(ResponseBody::ack().into_result(), Ok(None));
    }
}
