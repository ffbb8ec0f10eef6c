//! Test doubles for the embedder-implemented seams.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use mullion_core::transport::{FrameTransport, TransportError};
use mullion_shell::router::{RouteLocation, Router};
use mullion_shell::wallet::{ConnectedWallet, WalletError, WalletProvider};
use serde_json::Value;

/// Shared queue of posted messages with their target origins.
pub type PostQueue = Rc<RefCell<VecDeque<(Value, String)>>>;

/// Shared append-only log of posted messages.
pub type PostLog = Rc<RefCell<Vec<Value>>>;

/// Transport that appends every post to a queue (for delivery) and a log
/// (for assertions).
pub struct QueueTransport {
    queue: PostQueue,
    log: PostLog,
}

impl QueueTransport {
    /// Transport writing into the given queue and log.
    pub fn new(queue: PostQueue, log: PostLog) -> Self {
        Self { queue, log }
    }
}

impl FrameTransport for QueueTransport {
    fn post(&mut self, message: &Value, target_origin: &str) -> Result<(), TransportError> {
        self.log.borrow_mut().push(message.clone());
        self.queue.borrow_mut().push_back((message.clone(), target_origin.to_string()));
        Ok(())
    }
}

/// Transport whose peer window is gone; every post fails.
pub struct DeadTransport;

impl FrameTransport for DeadTransport {
    fn post(&mut self, _message: &Value, _target_origin: &str) -> Result<(), TransportError> {
        Err(TransportError::Detached)
    }
}

/// Wallet provider driven entirely by test script.
pub struct ScriptedWallet {
    /// Current connectivity; mutate freely between deliveries.
    pub current: Option<ConnectedWallet>,
}

impl ScriptedWallet {
    /// Provider starting from the given connectivity.
    pub fn new(current: Option<ConnectedWallet>) -> Self {
        Self { current }
    }
}

impl WalletProvider for ScriptedWallet {
    fn snapshot(&self) -> Option<ConnectedWallet> {
        self.current.clone()
    }

    fn disconnect(&mut self) {
        self.current = None;
    }

    fn switch_chain(&mut self, chain_id: &str) -> Result<(), WalletError> {
        match &mut self.current {
            Some(wallet) => {
                wallet.chain_id = chain_id.to_string();
                Ok(())
            },
            None => Err(WalletError::NotConnected),
        }
    }
}

/// Router that records its history so tests can assert that mirrored
/// navigation never grows it.
pub struct RecordingRouter {
    history: Vec<RouteLocation>,
    /// Number of [`Router::push`] calls observed.
    pub pushes: usize,
    /// Number of [`Router::replace`] calls observed.
    pub replaces: usize,
}

impl RecordingRouter {
    /// Router starting at the given location with a one-entry history.
    pub fn new(initial: RouteLocation) -> Self {
        Self { history: vec![initial], pushes: 0, replaces: 0 }
    }

    /// Depth of the history stack.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Router for RecordingRouter {
    fn current(&self) -> RouteLocation {
        self.history.last().cloned().unwrap_or_default()
    }

    fn push(&mut self, location: RouteLocation) {
        self.pushes += 1;
        self.history.push(location);
    }

    fn replace(&mut self, location: RouteLocation) {
        self.replaces += 1;
        match self.history.last_mut() {
            Some(last) => *last = location,
            None => self.history.push(location),
        }
    }
}
