//! Frame host: owns the account frame's lifecycle and wiring.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use mullion_core::registry::HandlerId;
use mullion_core::transport::FrameTransport;
use mullion_proto::{AccountKind, AccountPayload, Query, ResponseBody, ShellPayload, ThemeMode};
use serde_json::Value;
use url::Url;

use crate::communicator::{DispatchOutcome, Reply, ShellCommunicator};
use crate::config::HostConfig;
use crate::frame_url::{self, FrameUrlError};
use crate::router::{RouteLocation, Router};
use crate::wallet::WalletProvider;

/// Owns the account frame: its URL, its transport binding, and the
/// handler group bridging account-app messages to host collaborators.
///
/// Built once at bootstrap with an injected [`ShellCommunicator`] and the
/// embedder's [`WalletProvider`] and [`Router`] implementations. The
/// collaborators are shared single-threaded handles (`Rc<RefCell<_>>`):
/// the page's main thread is the only execution context, matching the
/// environment the protocol runs in.
///
/// Lifecycle: [`FrameHost::mount`] registers the handler group,
/// [`FrameHost::bind_frame`] attaches the frame window once it exists
/// (re-binding after a frame remount is safe), and
/// [`FrameHost::unmount`] tears the group down as one unit.
pub struct FrameHost {
    communicator: ShellCommunicator,
    wallet: Rc<RefCell<dyn WalletProvider>>,
    router: Rc<RefCell<dyn Router>>,
    config: HostConfig,
    subscriptions: Vec<HandlerId>,
}

impl FrameHost {
    /// Assemble a host from its injected parts. No handlers are
    /// registered until [`FrameHost::mount`].
    pub fn new(
        communicator: ShellCommunicator,
        wallet: Rc<RefCell<dyn WalletProvider>>,
        router: Rc<RefCell<dyn Router>>,
        config: HostConfig,
    ) -> Self {
        Self { communicator, wallet, router, config, subscriptions: Vec::new() }
    }

    /// Register the inbound handler group. A second mount without an
    /// intervening unmount is a logged no-op, as is mounting with frame
    /// mode disabled.
    pub fn mount(&mut self) {
        if !self.config.frame_mode {
            tracing::info!("frame mode disabled; not mounting the account frame host");
            return;
        }
        if !self.subscriptions.is_empty() {
            tracing::warn!("frame host already mounted");
            return;
        }

        self.register_app_ready();
        self.register_navigation_changed();
        self.register_request_wallet_state();
        self.register_request_connect();
        self.register_request_disconnect();
        self.register_request_switch_chain();
        self.register_rpc_request();
    }

    /// Remove the handler group registered by [`FrameHost::mount`].
    pub fn unmount(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.communicator.off(id);
        }
    }

    /// Attach the frame window's transport. Safe to call on every render;
    /// re-binding replaces the previous binding.
    pub fn bind_frame(&mut self, transport: Box<dyn FrameTransport>) {
        self.communicator.bind_frame(transport);
    }

    /// Detach the frame transport (frame removed from the page).
    pub fn unbind_frame(&mut self) {
        self.communicator.unbind_frame();
    }

    /// The URL the account frame should currently display: base URL plus
    /// the host route, with the reserved account parameter derived from
    /// the connected wallet.
    pub fn frame_url(&self) -> Result<Url, FrameUrlError> {
        let route = self.router.borrow().current();
        let account = self
            .wallet
            .borrow()
            .snapshot()
            .map(|wallet| format!("{}:{}", wallet.chain_id, wallet.address));
        frame_url::build(&self.config.account_app_url, &route, account.as_deref())
    }

    /// Push the current wallet snapshot. Call on every wallet tick,
    /// including the tick that disconnects.
    pub fn wallet_changed(&mut self) {
        let state = self.wallet.borrow().wallet_state();
        self.communicator.send_wallet_state(&state);
    }

    /// Push a theme change.
    pub fn theme_changed(&mut self, mode: ThemeMode) {
        self.communicator.send_theme_change(mode);
    }

    /// Ask the embedded app to navigate (host-driven navigation).
    pub fn navigate(&mut self, path: impl Into<String>, query: Option<Query>) {
        self.communicator.send_navigation(path, query);
    }

    /// Forward one inbound value from the embedder's message event.
    pub fn receive(&mut self, raw: &Value, origin: &str, now: Instant) -> DispatchOutcome {
        self.communicator.receive(raw, origin, now)
    }

    /// Drive deadlines; see [`ShellCommunicator::tick`].
    pub fn tick(&mut self, now: Instant) -> usize {
        self.communicator.tick(now)
    }

    /// The underlying communicator.
    pub fn communicator(&self) -> &ShellCommunicator {
        &self.communicator
    }

    /// Mutable access to the underlying communicator, for deferred
    /// responses and advanced wiring.
    pub fn communicator_mut(&mut self) -> &mut ShellCommunicator {
        &mut self.communicator
    }

    /// Host configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    fn register_app_ready(&mut self) {
        let wallet = Rc::clone(&self.wallet);
        let id = self.communicator.on(AccountKind::AppReady, move |envelope| {
            if let AccountPayload::AppReady { version } = &envelope.payload {
                tracing::debug!(%version, "embedded account app is ready");
            }
            // The app may boot before the host's first wallet tick; answer
            // the race by pushing the current snapshot immediately.
            let state = wallet.borrow().wallet_state();
            Ok(vec![Reply::Message(ShellPayload::WalletStateChanged(state))])
        });
        self.subscriptions.push(id);
    }

    fn register_navigation_changed(&mut self) {
        let router = Rc::clone(&self.router);
        let id = self.communicator.on(AccountKind::NavigationChanged, move |envelope| {
            if let AccountPayload::NavigationChanged { path, query } = &envelope.payload {
                let location = RouteLocation::new(path.clone())
                    .with_query(query.clone().unwrap_or_default());
                // Shallow replace: the address bar mirrors the child
                // route without growing history.
                router.borrow_mut().replace(location);
            }
            Ok(vec![])
        });
        self.subscriptions.push(id);
    }

    fn register_request_wallet_state(&mut self) {
        let wallet = Rc::clone(&self.wallet);
        let id = self.communicator.on(AccountKind::RequestWalletState, move |_| {
            let state = wallet.borrow().wallet_state();
            Ok(vec![Reply::ok(serde_json::to_value(state)?)])
        });
        self.subscriptions.push(id);
    }

    fn register_request_connect(&mut self) {
        let id = self
            .communicator
            .on(AccountKind::RequestConnectWallet, move |_| {
                Ok(vec![Reply::err("Not implemented yet")])
            });
        self.subscriptions.push(id);
    }

    fn register_request_disconnect(&mut self) {
        let wallet = Rc::clone(&self.wallet);
        let id = self.communicator.on(AccountKind::RequestDisconnectWallet, move |_| {
            wallet.borrow_mut().disconnect();
            let state = wallet.borrow().wallet_state();
            Ok(vec![
                Reply::ack(),
                Reply::Message(ShellPayload::WalletStateChanged(state)),
            ])
        });
        self.subscriptions.push(id);
    }

    fn register_request_switch_chain(&mut self) {
        let wallet = Rc::clone(&self.wallet);
        let id = self.communicator.on(AccountKind::RequestSwitchChain, move |envelope| {
            let AccountPayload::RequestSwitchChain { chain_id } = &envelope.payload else {
                return Ok(vec![]);
            };
            let switched = wallet.borrow_mut().switch_chain(chain_id);
            match switched {
                Ok(()) => {
                    let state = wallet.borrow().wallet_state();
                    Ok(vec![
                        Reply::ack(),
                        Reply::Message(ShellPayload::WalletStateChanged(state)),
                    ])
                },
                Err(error) => Ok(vec![Reply::Response(ResponseBody::err(error.to_string()))]),
            }
        });
        self.subscriptions.push(id);
    }

    fn register_rpc_request(&mut self) {
        let id = self.communicator.on(AccountKind::RpcRequest, move |_| {
            Ok(vec![Reply::err("Not implemented yet")])
        });
        self.subscriptions.push(id);
    }
}
