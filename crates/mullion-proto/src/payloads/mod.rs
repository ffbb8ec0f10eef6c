//! Typed payloads for both message directions.
//!
//! Each direction is a closed set: a tagged enum whose serde representation
//! carries the discriminator in `type` and the variant data in `payload`.
//! The per-direction `*Kind` enums are the payload-free discriminators used
//! as handler-registry keys and in diagnostics.

mod response;
mod wallet;

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub use response::ResponseBody;
pub use wallet::{ThemeMode, WalletState};

/// Query parameters attached to a navigation path.
///
/// A sorted map so URL construction from the same router state is
/// deterministic.
pub type Query = BTreeMap<String, String>;

/// Payload types that know their own discriminator.
pub trait Kinded {
    /// Payload-free discriminator for this payload set.
    type Kind: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    /// Discriminator of this payload value.
    fn kind(&self) -> Self::Kind;
}

/// Messages the Shell sends into the embedded Account App.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShellPayload {
    /// Fresh snapshot of the host wallet, pushed on every wallet tick.
    WalletStateChanged(WalletState),

    /// The host switched color themes.
    ThemeChanged {
        /// New theme mode.
        mode: ThemeMode,
    },

    /// The host asks the embedded app to navigate.
    Navigate {
        /// Target path inside the embedded app.
        path: String,
        /// Query parameters, omitted from the wire when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<Query>,
    },

    /// Terminal answer to an Account App request; the envelope carries the
    /// correlating `requestId`.
    Response(ResponseBody),
}

/// Discriminators for [`ShellPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellKind {
    /// `WALLET_STATE_CHANGED`
    WalletStateChanged,
    /// `THEME_CHANGED`
    ThemeChanged,
    /// `NAVIGATE`
    Navigate,
    /// `RESPONSE`
    Response,
}

impl ShellKind {
    /// The `type` string this kind carries on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::WalletStateChanged => "WALLET_STATE_CHANGED",
            Self::ThemeChanged => "THEME_CHANGED",
            Self::Navigate => "NAVIGATE",
            Self::Response => "RESPONSE",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Kinded for ShellPayload {
    type Kind = ShellKind;

    fn kind(&self) -> ShellKind {
        match self {
            Self::WalletStateChanged(_) => ShellKind::WalletStateChanged,
            Self::ThemeChanged { .. } => ShellKind::ThemeChanged,
            Self::Navigate { .. } => ShellKind::Navigate,
            Self::Response(_) => ShellKind::Response,
        }
    }
}

/// Messages the embedded Account App sends up to the Shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountPayload {
    /// Ask for the current wallet snapshot. Expects a `RESPONSE`.
    RequestWalletState,

    /// Ask the host to start its wallet-connection flow. Expects a
    /// `RESPONSE`.
    RequestConnectWallet,

    /// Ask the host to disconnect the current wallet. Expects a `RESPONSE`.
    RequestDisconnectWallet,

    /// Ask the host to switch the connected wallet's chain. Expects a
    /// `RESPONSE`.
    RequestSwitchChain {
        /// Chain to switch to.
        #[serde(rename = "chainId")]
        chain_id: String,
    },

    /// The embedded app's internal route changed; the host mirrors it.
    NavigationChanged {
        /// New path inside the embedded app.
        path: String,
        /// Query parameters, omitted from the wire when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<Query>,
    },

    /// The embedded app finished booting and can receive pushes.
    AppReady {
        /// Protocol version the embedded app speaks.
        version: String,
    },

    /// Proxy a JSON-RPC call through the host's provider. Expects a
    /// `RESPONSE`.
    RpcRequest {
        /// RPC method name.
        method: String,
        /// Positional RPC parameters.
        #[serde(default)]
        params: Vec<serde_json::Value>,
    },

    /// Terminal answer to a Shell request; the envelope carries the
    /// correlating `requestId`.
    Response(ResponseBody),
}

/// Discriminators for [`AccountPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// `REQUEST_WALLET_STATE`
    RequestWalletState,
    /// `REQUEST_CONNECT_WALLET`
    RequestConnectWallet,
    /// `REQUEST_DISCONNECT_WALLET`
    RequestDisconnectWallet,
    /// `REQUEST_SWITCH_CHAIN`
    RequestSwitchChain,
    /// `NAVIGATION_CHANGED`
    NavigationChanged,
    /// `APP_READY`
    AppReady,
    /// `RPC_REQUEST`
    RpcRequest,
    /// `RESPONSE`
    Response,
}

impl AccountKind {
    /// The `type` string this kind carries on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::RequestWalletState => "REQUEST_WALLET_STATE",
            Self::RequestConnectWallet => "REQUEST_CONNECT_WALLET",
            Self::RequestDisconnectWallet => "REQUEST_DISCONNECT_WALLET",
            Self::RequestSwitchChain => "REQUEST_SWITCH_CHAIN",
            Self::NavigationChanged => "NAVIGATION_CHANGED",
            Self::AppReady => "APP_READY",
            Self::RpcRequest => "RPC_REQUEST",
            Self::Response => "RESPONSE",
        }
    }

    /// Whether this kind initiates a request/response exchange and must
    /// receive exactly one `RESPONSE`.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Self::RequestWalletState
                | Self::RequestConnectWallet
                | Self::RequestDisconnectWallet
                | Self::RequestSwitchChain
                | Self::RpcRequest
        )
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Kinded for AccountPayload {
    type Kind = AccountKind;

    fn kind(&self) -> AccountKind {
        match self {
            Self::RequestWalletState => AccountKind::RequestWalletState,
            Self::RequestConnectWallet => AccountKind::RequestConnectWallet,
            Self::RequestDisconnectWallet => AccountKind::RequestDisconnectWallet,
            Self::RequestSwitchChain { .. } => AccountKind::RequestSwitchChain,
            Self::NavigationChanged { .. } => AccountKind::NavigationChanged,
            Self::AppReady { .. } => AccountKind::AppReady,
            Self::RpcRequest { .. } => AccountKind::RpcRequest,
            Self::Response(_) => AccountKind::Response,
        }
    }
}
