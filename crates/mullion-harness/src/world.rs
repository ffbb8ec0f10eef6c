//! The loopback world: both endpoints, two queues, one clock.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mullion_app::{AccountClient, AccountConfig, AccountEvent};
use mullion_core::policy::VersionPolicy;
use mullion_shell::communicator::{DispatchOutcome, ShellCommunicator};
use mullion_shell::config::HostConfig;
use mullion_shell::host::FrameHost;
use mullion_shell::router::{RouteLocation, Router};
use mullion_shell::wallet::{ConnectedWallet, WalletProvider};
use serde_json::Value;
use url::Url;

use crate::fakes::{PostLog, PostQueue, QueueTransport, RecordingRouter, ScriptedWallet};

/// Origin the harness serves the shell page from.
pub const SHELL_ORIGIN: &str = "https://shell.example.com";

/// Origin the harness serves the account frame from.
pub const ACCOUNT_ORIGIN: &str = "https://account.example.com";

const ACCOUNT_APP_URL: &str = "https://account.example.com/app";

/// A misrouted queue never drains itself; bound the pump.
const MAX_PUMP_ROUNDS: usize = 64;

#[allow(clippy::expect_used)]
fn account_app_url() -> Url {
    Url::parse(ACCOUNT_APP_URL).expect("static URL parses")
}

/// Both endpoints wired back to back with queued delivery and virtual
/// time.
///
/// Construction mounts the frame host, binds both transports, and leaves
/// the clock at "now". Messages posted by either endpoint sit in a queue
/// until [`World::pump`] delivers them, so a test controls exactly when
/// the other side observes them - and can inspect or corrupt traffic in
/// between.
pub struct World {
    /// The shell endpoint under test.
    pub host: FrameHost,
    /// The account endpoint under test.
    pub client: AccountClient,
    /// Every event the client produced, in production order.
    pub events: Vec<AccountEvent>,
    /// Every dispatch outcome the shell reported, in delivery order.
    pub outcomes: Vec<DispatchOutcome>,

    now: Instant,
    to_shell: PostQueue,
    to_account: PostQueue,
    shell_log: PostLog,
    account_log: PostLog,
    misaddressed: usize,
    wallet: Rc<RefCell<ScriptedWallet>>,
    router: Rc<RefCell<RecordingRouter>>,
}

impl World {
    /// World with a disconnected wallet and the lenient version policy.
    pub fn new() -> Self {
        Self::with_config(None, VersionPolicy::default())
    }

    /// World starting from the given wallet connectivity and version
    /// policy (applied to the shell side).
    pub fn with_config(wallet: Option<ConnectedWallet>, version_policy: VersionPolicy) -> Self {
        let wallet = Rc::new(RefCell::new(ScriptedWallet::new(wallet)));
        let router = Rc::new(RefCell::new(RecordingRouter::new(RouteLocation::new("/"))));

        let mut host_config = HostConfig::new(account_app_url());
        host_config.version_policy = version_policy;

        let communicator = match host_config.shell_config() {
            Ok(config) => ShellCommunicator::new(config),
            Err(error) => {
                // Static URL, tuple origin; this arm is unreachable.
                tracing::error!(%error, "harness misconfigured");
                unreachable!()
            },
        };

        let wallet_dyn: Rc<RefCell<dyn WalletProvider>> = wallet.clone();
        let router_dyn: Rc<RefCell<dyn Router>> = router.clone();
        let mut host = FrameHost::new(communicator, wallet_dyn, router_dyn, host_config);
        host.mount();

        let to_shell: PostQueue = Rc::new(RefCell::new(VecDeque::new()));
        let to_account: PostQueue = Rc::new(RefCell::new(VecDeque::new()));
        let shell_log: PostLog = Rc::new(RefCell::new(Vec::new()));
        let account_log: PostLog = Rc::new(RefCell::new(Vec::new()));

        host.bind_frame(Box::new(QueueTransport::new(
            Rc::clone(&to_account),
            Rc::clone(&shell_log),
        )));

        let mut client = AccountClient::new(AccountConfig::for_origin(SHELL_ORIGIN));
        client.attach_shell(Box::new(QueueTransport::new(
            Rc::clone(&to_shell),
            Rc::clone(&account_log),
        )));

        Self {
            host,
            client,
            events: Vec::new(),
            outcomes: Vec::new(),
            now: Instant::now(),
            to_shell,
            to_account,
            shell_log,
            account_log,
            misaddressed: 0,
            wallet,
            router,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Advance the clock and drive both endpoints' deadline ticks.
    ///
    /// Returns how many inbound requests the shell timed out; client
    /// timeouts land in [`World::events`].
    pub fn advance(&mut self, duration: Duration) -> usize {
        self.now += duration;
        let timeouts = self.host.tick(self.now);
        let events = self.client.tick(self.now);
        self.events.extend(events);
        timeouts
    }

    /// Deliver queued messages both ways until quiescent.
    ///
    /// Messages addressed to an origin other than the receiving document's
    /// are dropped, the way the browser refuses a mismatched target
    /// origin; [`World::misaddressed`] counts them.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let to_shell: Vec<(Value, String)> = self.to_shell.borrow_mut().drain(..).collect();
            let to_account: Vec<(Value, String)> =
                self.to_account.borrow_mut().drain(..).collect();
            if to_shell.is_empty() && to_account.is_empty() {
                break;
            }

            for (value, target) in to_shell {
                if target != SHELL_ORIGIN {
                    self.misaddressed += 1;
                    continue;
                }
                let outcome = self.host.receive(&value, ACCOUNT_ORIGIN, self.now);
                self.outcomes.push(outcome);
                delivered += 1;
            }

            for (value, target) in to_account {
                if target != ACCOUNT_ORIGIN {
                    self.misaddressed += 1;
                    continue;
                }
                let events = self.client.receive(&value, SHELL_ORIGIN);
                self.events.extend(events);
                delivered += 1;
            }
        }
        delivered
    }

    /// Inject a raw value straight into the shell endpoint, bypassing the
    /// account client - the fault-injection entry point.
    pub fn deliver_raw_to_shell(&mut self, value: &Value, origin: &str) -> DispatchOutcome {
        let outcome = self.host.receive(value, origin, self.now);
        self.outcomes.push(outcome);
        outcome
    }

    /// Replace the scripted wallet state and push the fresh snapshot,
    /// like a host wallet-subscription tick.
    pub fn set_wallet(&mut self, wallet: Option<ConnectedWallet>) {
        self.wallet.borrow_mut().current = wallet;
        self.host.wallet_changed();
    }

    /// Everything the shell posted, in order.
    pub fn shell_sent(&self) -> Vec<Value> {
        self.shell_log.borrow().clone()
    }

    /// Everything the account client posted, in order.
    pub fn account_sent(&self) -> Vec<Value> {
        self.account_log.borrow().clone()
    }

    /// Take the accumulated client events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<AccountEvent> {
        std::mem::take(&mut self.events)
    }

    /// Messages dropped for a mismatched target origin.
    pub fn misaddressed(&self) -> usize {
        self.misaddressed
    }

    /// Handle on the scripted wallet.
    pub fn wallet(&self) -> Rc<RefCell<ScriptedWallet>> {
        Rc::clone(&self.wallet)
    }

    /// Handle on the recording router.
    pub fn router(&self) -> Rc<RefCell<RecordingRouter>> {
        Rc::clone(&self.router)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
