//! The message envelope and boundary validation.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::payloads::{AccountPayload, ShellPayload};
use crate::source::Source;
use crate::version::PROTOCOL_VERSION;

/// Correlation id tying a request to its single `RESPONSE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap a caller-supplied id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Common envelope wrapping every protocol message.
///
/// `P` is one of the direction payload enums; its serde representation
/// contributes the `type` and `payload` keys, flattened next to the
/// envelope's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<P> {
    /// Logical sender role.
    pub source: Source,

    /// Protocol version the sender speaks.
    pub version: String,

    /// Correlation id; present on requests and their responses.
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,

    /// Direction-specific message body (`type` + `payload` on the wire).
    #[serde(flatten)]
    pub payload: P,
}

impl Envelope<ShellPayload> {
    /// Shell-sourced envelope at the current protocol version.
    pub fn shell(payload: ShellPayload) -> Self {
        Self {
            source: Source::Shell,
            version: PROTOCOL_VERSION.to_string(),
            request_id: None,
            payload,
        }
    }
}

impl Envelope<AccountPayload> {
    /// Account-App-sourced envelope at the current protocol version.
    pub fn account(payload: AccountPayload) -> Self {
        Self {
            source: Source::AccountApp,
            version: PROTOCOL_VERSION.to_string(),
            request_id: None,
            payload,
        }
    }
}

impl<P> Envelope<P> {
    /// Attach a correlation id.
    pub fn with_request_id(mut self, id: impl Into<RequestId>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

impl<P: Serialize> Envelope<P> {
    /// Serialize to the structured-clone JSON value handed to the
    /// transport.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Boundary sniff-test for messages claiming to come from the Shell.
///
/// True iff `value` is an object whose `source` is exactly the Shell role
/// and which carries `type` and `version` keys. Deliberately shallow: field
/// values beyond `source` are checked by the typed decode, not here.
pub fn is_shell_message(value: &Value) -> bool {
    has_role(value, Source::Shell)
}

/// Boundary sniff-test for messages claiming to come from the Account App.
///
/// Same contract as [`is_shell_message`] with the opposite role.
pub fn is_account_message(value: &Value) -> bool {
    has_role(value, Source::AccountApp)
}

fn has_role(value: &Value, role: Source) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    object.get("source").and_then(Value::as_str) == Some(role.wire_name())
        && object.contains_key("type")
        && object.contains_key("version")
}

/// Decode a Shell-sourced envelope, failing with the precise boundary
/// violation.
pub fn decode_shell(value: &Value) -> Result<Envelope<ShellPayload>, DecodeError> {
    decode_from(value, Source::Shell)
}

/// Decode an Account-App-sourced envelope, failing with the precise
/// boundary violation.
pub fn decode_account(value: &Value) -> Result<Envelope<AccountPayload>, DecodeError> {
    decode_from(value, Source::AccountApp)
}

fn decode_from<P: DeserializeOwned>(
    value: &Value,
    expected: Source,
) -> Result<Envelope<P>, DecodeError> {
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    for field in ["source", "version", "type"] {
        if !object.contains_key(field) {
            return Err(DecodeError::MissingField(field));
        }
    }

    // `source` is the trust gate; report it precisely before serde gets a
    // chance to fold it into a generic error.
    let source = &object["source"];
    if source.as_str() != Some(expected.wire_name()) {
        let found = match source.as_str() {
            Some(role) => role.to_string(),
            None => source.to_string(),
        };
        return Err(DecodeError::SourceMismatch { expected, found });
    }

    Ok(serde_json::from_value(value.clone())?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::payloads::{ResponseBody, WalletState};

    fn ready() -> Value {
        Envelope::account(AccountPayload::AppReady { version: PROTOCOL_VERSION.into() })
            .to_value()
            .unwrap()
    }

    #[test]
    fn guard_accepts_every_account_payload() {
        let payloads = vec![
            AccountPayload::RequestWalletState,
            AccountPayload::RequestConnectWallet,
            AccountPayload::RequestDisconnectWallet,
            AccountPayload::RequestSwitchChain { chain_id: "1".into() },
            AccountPayload::NavigationChanged { path: "/".into(), query: None },
            AccountPayload::AppReady { version: "1.0.0".into() },
            AccountPayload::RpcRequest { method: "eth_call".into(), params: vec![] },
            AccountPayload::Response(ResponseBody::ack()),
        ];
        for payload in payloads {
            let value = Envelope::account(payload).to_value().unwrap();
            assert!(is_account_message(&value), "rejected {value}");
            assert!(!is_shell_message(&value));
        }
    }

    #[test]
    fn guard_requires_all_envelope_keys() {
        for missing in ["source", "version", "type"] {
            let mut value = ready();
            value.as_object_mut().unwrap().remove(missing);
            assert!(!is_account_message(&value), "accepted without `{missing}`");
        }
    }

    #[test]
    fn guard_rejects_non_objects() {
        for value in [json!(null), json!("APP_READY"), json!(42), json!(["shell"])] {
            assert!(!is_account_message(&value));
            assert!(!is_shell_message(&value));
        }
    }

    #[test]
    fn decode_reports_missing_field() {
        let mut value = ready();
        value.as_object_mut().unwrap().remove("version");
        let err = decode_account(&value).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("version")));
        assert!(err.failed_guard());
    }

    #[test]
    fn decode_reports_source_mismatch() {
        let mut value = ready();
        value["source"] = json!("shell");
        let err = decode_account(&value).unwrap_err();
        assert!(matches!(err, DecodeError::SourceMismatch { .. }));
    }

    #[test]
    fn decode_reports_malformed_body() {
        let mut value = ready();
        // APP_READY payload must be an object with a `version` string.
        value["payload"] = json!("soon");
        let err = decode_account(&value).unwrap_err();
        assert!(matches!(err, DecodeError::Body(_)));
        assert!(!err.failed_guard());
    }

    #[test]
    fn decode_preserves_request_id() {
        let value = Envelope::account(AccountPayload::RequestWalletState)
            .with_request_id("req-7")
            .to_value()
            .unwrap();
        let envelope = decode_account(&value).unwrap();
        assert_eq!(envelope.request_id, Some(RequestId::new("req-7")));
    }

    #[test]
    fn request_id_omitted_when_absent() {
        let value = ready();
        assert!(!value.as_object().unwrap().contains_key("requestId"));
    }

    #[test]
    fn shell_envelope_wire_shape() {
        let value = Envelope::shell(ShellPayload::WalletStateChanged(WalletState::disconnected()))
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "source": "shell",
                "version": PROTOCOL_VERSION,
                "type": "WALLET_STATE_CHANGED",
                "payload": {
                    "address": null,
                    "chainId": null,
                    "label": null,
                    "isConnected": false,
                },
            })
        );
    }

    #[test]
    fn response_envelope_wire_shape() {
        let value = Envelope::shell(ShellPayload::Response(ResponseBody::err("Not implemented yet")))
            .with_request_id("abc")
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "source": "shell",
                "version": PROTOCOL_VERSION,
                "requestId": "abc",
                "type": "RESPONSE",
                "payload": {"error": "Not implemented yet"},
            })
        );
    }

    #[test]
    fn decode_tolerates_unknown_extra_keys() {
        let mut value = ready();
        value["debug"] = json!(true);
        assert!(decode_account(&value).is_ok());
    }

    proptest! {
        #[test]
        fn guard_rejects_mutated_sources(source in "[a-zA-Z-]{0,24}") {
            prop_assume!(source != "account-app");
            let mut value = ready();
            value["source"] = json!(source);
            prop_assert!(!is_account_message(&value));
        }

        #[test]
        fn guard_rejects_non_string_sources(source in any::<u32>()) {
            let mut value = ready();
            value["source"] = json!(source);
            prop_assert!(!is_account_message(&value));
        }
    }
}
