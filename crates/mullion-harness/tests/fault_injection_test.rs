//! Hostile-frame behavior: spoofed origins, malformed values, version
//! drift, faulty handlers, dead windows.

use std::cell::RefCell;
use std::rc::Rc;

use mullion_core::policy::VersionPolicy;
use mullion_harness::{ACCOUNT_ORIGIN, DeadTransport, World};
use mullion_proto::{AccountKind, AccountPayload, Envelope, PROTOCOL_VERSION};
use mullion_shell::communicator::{DispatchOutcome, DropReason, Reply};
use mullion_shell::wallet::ConnectedWallet;
use proptest::prelude::*;
use serde_json::{Value, json};

fn app_ready(version: &str) -> Value {
    let mut value = Envelope::account(AccountPayload::AppReady { version: version.to_string() })
        .to_value()
        .unwrap();
    value["version"] = json!(version);
    value
}

#[test]
fn spoofed_origin_is_rejected_before_anything_runs() {
    let mut world = World::new();
    let outcome = world.deliver_raw_to_shell(&app_ready(PROTOCOL_VERSION), "https://evil.example");
    assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::Origin));
    assert!(world.shell_sent().is_empty());
    assert_eq!(world.host.communicator().stats().dropped_origin, 1);
}

#[test]
fn structurally_invalid_values_are_dropped_silently() {
    let mut world = World::new();

    for value in [
        json!(null),
        json!("APP_READY"),
        json!({"type": "APP_READY", "version": "1.0.0"}),
        json!({"source": "account-app", "version": "1.0.0"}),
        json!({"source": "account-app", "type": "APP_READY"}),
    ] {
        let outcome = world.deliver_raw_to_shell(&value, ACCOUNT_ORIGIN);
        assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::Shape), "accepted {value}");
    }
    assert!(world.shell_sent().is_empty());
}

#[test]
fn malformed_payload_fails_closed_after_the_guard() {
    let mut world = World::new();
    let mut value = app_ready(PROTOCOL_VERSION);
    value["payload"] = json!(["not", "an", "object"]);

    let outcome = world.deliver_raw_to_shell(&value, ACCOUNT_ORIGIN);
    assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::Malformed));
    assert!(world.shell_sent().is_empty());
}

#[test]
fn lenient_policy_tolerates_version_drift() {
    let mut world = World::new();
    let outcome = world.deliver_raw_to_shell(&app_ready("0.9.9"), ACCOUNT_ORIGIN);

    // The handler still fires: the wallet snapshot goes out.
    assert_eq!(
        outcome,
        DispatchOutcome::Delivered { kind: AccountKind::AppReady, handlers: 1 }
    );
    let sent = world.shell_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["type"], json!("WALLET_STATE_CHANGED"));
    assert_eq!(world.host.communicator().stats().version_warnings, 1);
}

#[test]
fn strict_policy_rejects_major_version_drift() {
    let mut world = World::with_config(None, VersionPolicy::Strict);
    let outcome = world.deliver_raw_to_shell(&app_ready("0.9.9"), ACCOUNT_ORIGIN);

    assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::Version));
    assert!(world.shell_sent().is_empty());
    assert_eq!(world.host.communicator().stats().dropped_version, 1);
}

#[test]
fn strict_policy_still_tolerates_minor_drift() {
    let mut world = World::with_config(None, VersionPolicy::Strict);
    let outcome = world.deliver_raw_to_shell(&app_ready("1.2.0"), ACCOUNT_ORIGIN);
    assert_eq!(
        outcome,
        DispatchOutcome::Delivered { kind: AccountKind::AppReady, handlers: 1 }
    );
}

#[test]
fn failing_handler_does_not_break_its_siblings() {
    let mut world = World::new();
    world.host.unmount();

    let reached = Rc::new(RefCell::new(false));
    world
        .host
        .communicator_mut()
        .on(AccountKind::AppReady, |_| Err("handler exploded".into()));
    {
        let reached = Rc::clone(&reached);
        world.host.communicator_mut().on(AccountKind::AppReady, move |_| {
            *reached.borrow_mut() = true;
            Ok(vec![])
        });
    }

    let outcome = world.deliver_raw_to_shell(&app_ready(PROTOCOL_VERSION), ACCOUNT_ORIGIN);
    assert_eq!(
        outcome,
        DispatchOutcome::Delivered { kind: AccountKind::AppReady, handlers: 2 }
    );
    assert!(*reached.borrow());
    assert_eq!(world.host.communicator().stats().handler_errors, 1);
}

#[test]
fn unsubscribed_handler_never_fires_again() {
    let mut world = World::new();
    world.host.unmount();

    let fired = Rc::new(RefCell::new(0));
    let id = {
        let fired = Rc::clone(&fired);
        world.host.communicator_mut().on(AccountKind::AppReady, move |_| {
            *fired.borrow_mut() += 1;
            Ok(vec![])
        })
    };

    world.deliver_raw_to_shell(&app_ready(PROTOCOL_VERSION), ACCOUNT_ORIGIN);
    assert!(world.host.communicator_mut().off(id));
    world.deliver_raw_to_shell(&app_ready(PROTOCOL_VERSION), ACCOUNT_ORIGIN);

    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn dead_frame_window_is_survivable() {
    let mut world = World::new();
    world.host.bind_frame(Box::new(DeadTransport));

    world.set_wallet(Some(ConnectedWallet::new("0xabc", "1")));
    assert_eq!(world.host.communicator().stats().send_failed, 1);

    // A request still gets its answer attempted, and the endpoint keeps
    // functioning after the failures.
    let raw = Envelope::account(AccountPayload::RequestWalletState)
        .with_request_id("req-dead")
        .to_value()
        .unwrap();
    let outcome = world.deliver_raw_to_shell(&raw, ACCOUNT_ORIGIN);
    assert!(matches!(outcome, DispatchOutcome::Delivered { .. }));
    assert_eq!(world.host.communicator().stats().send_failed, 2);
}

#[test]
fn garbage_reply_handler_output_without_request_id_is_contained() {
    let mut world = World::new();
    world.host.unmount();
    // A handler that answers a non-request message: nothing to correlate
    // with, so the reply is dropped without posting.
    world
        .host
        .communicator_mut()
        .on(AccountKind::AppReady, |_| Ok(vec![Reply::ack()]));

    world.deliver_raw_to_shell(&app_ready(PROTOCOL_VERSION), ACCOUNT_ORIGIN);
    assert!(world.shell_sent().is_empty());
}

proptest! {
    #[test]
    fn mutated_sources_never_reach_handlers(source in "[a-zA-Z -]{0,24}") {
        prop_assume!(source != "account-app");
        let mut world = World::new();
        let mut value = app_ready(PROTOCOL_VERSION);
        value["source"] = json!(source);

        let outcome = world.deliver_raw_to_shell(&value, ACCOUNT_ORIGIN);
        prop_assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::Shape));
        prop_assert!(world.shell_sent().is_empty());
    }
}
