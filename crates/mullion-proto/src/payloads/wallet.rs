//! Wallet snapshot and theme payload types.

use serde::{Deserialize, Serialize};

/// Snapshot of the host wallet's connectivity, pushed Shell to Account App.
///
/// Always built fresh from the provider on each wallet tick and pushed
/// eagerly; there is no diffing and no persisted identity. `address`,
/// `chain_id` and `label` are explicit `null`s on the wire when
/// disconnected, while the `ens`/`balance` enrichments disappear from the
/// wire entirely when absent - a stale enrichment must never outlive the
/// connection it described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    /// Connected account address, `null` when disconnected.
    pub address: Option<String>,

    /// Connected chain id, `null` when disconnected.
    pub chain_id: Option<String>,

    /// Wallet label (e.g. the connecting extension's name).
    pub label: Option<String>,

    /// Must agree with the nullability of `address`/`chain_id`.
    pub is_connected: bool,

    /// ENS name enrichment, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ens: Option<String>,

    /// Native balance enrichment, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

impl WalletState {
    /// The canonical disconnected snapshot.
    pub fn disconnected() -> Self {
        Self {
            address: None,
            chain_id: None,
            label: None,
            is_connected: false,
            ens: None,
            balance: None,
        }
    }

    /// Connected snapshot for an address on a chain. Label and enrichments
    /// start empty; callers fill the fields they know.
    pub fn connected(address: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            chain_id: Some(chain_id.into()),
            label: None,
            is_connected: true,
            ens: None,
            balance: None,
        }
    }

    /// Check the connection-flag invariant: `is_connected` holds exactly
    /// when both `address` and `chain_id` are present.
    pub fn is_consistent(&self) -> bool {
        self.is_connected == (self.address.is_some() && self.chain_id.is_some())
    }
}

/// Host color theme, pushed on theme switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn disconnected_wire_shape() {
        // Explicit nulls for identity fields, no enrichment keys at all.
        let value = serde_json::to_value(WalletState::disconnected()).unwrap();
        assert_eq!(
            value,
            json!({
                "address": null,
                "chainId": null,
                "label": null,
                "isConnected": false,
            })
        );
    }

    #[test]
    fn connected_wire_shape() {
        let mut state = WalletState::connected("0xabc", "1");
        state.label = Some("MetaMask".into());
        state.balance = Some("1.5 ETH".into());
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({
                "address": "0xabc",
                "chainId": "1",
                "label": "MetaMask",
                "isConnected": true,
                "balance": "1.5 ETH",
            })
        );
    }

    #[test]
    fn consistency_check() {
        assert!(WalletState::disconnected().is_consistent());
        assert!(WalletState::connected("0xabc", "1").is_consistent());

        let mut torn = WalletState::connected("0xabc", "1");
        torn.chain_id = None;
        assert!(!torn.is_consistent());

        let mut torn = WalletState::disconnected();
        torn.is_connected = true;
        assert!(!torn.is_consistent());
    }
}
