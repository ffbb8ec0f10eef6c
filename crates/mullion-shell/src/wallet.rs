//! Host wallet-provider seam.

use mullion_proto::WalletState;

/// A wallet currently connected to the host page.
///
/// This is the host-side domain value; [`WalletState`] is the snapshot
/// that crosses the frame boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedWallet {
    /// Account address.
    pub address: String,
    /// Chain the wallet is connected to.
    pub chain_id: String,
    /// Label of the connecting wallet (extension name etc.).
    pub label: Option<String>,
    /// Resolved ENS name, when known.
    pub ens: Option<String>,
    /// Formatted native balance, when known.
    pub balance: Option<String>,
}

impl ConnectedWallet {
    /// Wallet with just the identity fields set.
    pub fn new(address: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            chain_id: chain_id.into(),
            label: None,
            ens: None,
            balance: None,
        }
    }

    /// The snapshot this wallet crosses the frame boundary as.
    pub fn to_state(&self) -> WalletState {
        let mut state = WalletState::connected(self.address.clone(), self.chain_id.clone());
        state.label.clone_from(&self.label);
        state.ens.clone_from(&self.ens);
        state.balance.clone_from(&self.balance);
        state
    }
}

/// Failure reported by the wallet provider.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// No wallet is connected.
    #[error("no wallet is connected")]
    NotConnected,

    /// The requested chain is not available in the provider.
    #[error("chain `{0}` is not supported")]
    UnsupportedChain(String),

    /// Provider-specific failure.
    #[error("{0}")]
    Provider(String),
}

/// The host page's wallet-connection provider, as seen by the frame host.
///
/// Implemented by the embedder over its onboarding/provider library. The
/// provider is the single source of truth for connectivity; the frame host
/// never caches a snapshot across ticks.
pub trait WalletProvider {
    /// Currently connected wallet, `None` when disconnected.
    fn snapshot(&self) -> Option<ConnectedWallet>;

    /// Disconnect the current wallet. A no-op when already disconnected.
    fn disconnect(&mut self);

    /// Switch the connected wallet to another chain.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotConnected`] with no wallet, or a
    /// provider-specific failure.
    fn switch_chain(&mut self, chain_id: &str) -> Result<(), WalletError>;

    /// The boundary snapshot for the current connectivity.
    fn wallet_state(&self) -> WalletState {
        match self.snapshot() {
            Some(wallet) => wallet.to_state(),
            None => WalletState::disconnected(),
        }
    }
}
