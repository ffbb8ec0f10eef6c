//! Route mirroring between the host address bar and the embedded app.

use mullion_app::AccountEvent;
use mullion_harness::World;
use mullion_proto::Query;
use mullion_shell::router::RouteLocation;
use mullion_shell::Router;
use mullion_shell::wallet::ConnectedWallet;
use serde_json::json;

fn query(pairs: &[(&str, &str)]) -> Query {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

#[test]
fn child_navigation_is_mirrored_with_a_shallow_replace() {
    let mut world = World::new();
    world
        .client
        .notify_navigation("/assets", Some(query(&[("tab", "nfts")])));
    world.pump();

    let router = world.router();
    let router = router.borrow();
    let location = router.current();
    assert_eq!(location.path, "/assets");
    assert_eq!(location.query.get("tab").map(String::as_str), Some("nfts"));

    // Mirroring must not grow history: back-navigation would otherwise
    // revisit the pre-change URL.
    assert_eq!(router.replaces, 1);
    assert_eq!(router.pushes, 0);
    assert_eq!(router.history_len(), 1);
}

#[test]
fn child_navigation_without_query_clears_the_query() {
    let mut world = World::new();
    world.router().borrow_mut().replace(
        RouteLocation::new("/assets").with_query(query(&[("tab", "nfts")])),
    );

    world.client.notify_navigation("/settings", None);
    world.pump();

    let router = world.router();
    let location = router.borrow().current();
    assert_eq!(location.path, "/settings");
    assert!(location.query.is_empty());
}

#[test]
fn host_navigation_reaches_the_embedded_app() {
    let mut world = World::new();
    world.host.navigate("/home", Some(query(&[("view", "grid")])));
    world.pump();

    let events = world.drain_events();
    assert_eq!(
        events,
        vec![AccountEvent::Navigate {
            path: "/home".into(),
            query: query(&[("view", "grid")])
        }]
    );
}

#[test]
fn frame_url_mirrors_route_and_wallet() {
    let mut world = World::new();
    world.set_wallet(Some(ConnectedWallet::new("0xabc", "100")));
    world
        .router()
        .borrow_mut()
        .replace(RouteLocation::new("/assets").with_query(query(&[("tab", "nfts")])));

    let url = world.host.frame_url().unwrap();
    assert_eq!(
        url.as_str(),
        "https://account.example.com/app/assets?tab=nfts&account=100%3A0xabc"
    );

    // Idempotent: recomputing from the same state yields the same URL.
    assert_eq!(world.host.frame_url().unwrap(), url);
}

#[test]
fn frame_url_never_forwards_the_reserved_account_param() {
    let mut world = World::new();
    world.set_wallet(Some(ConnectedWallet::new("0xabc", "1")));
    world.router().borrow_mut().replace(
        RouteLocation::new("/assets").with_query(query(&[("account", "1:0xevil")])),
    );

    let url = world.host.frame_url().unwrap();
    assert_eq!(url.as_str(), "https://account.example.com/app/assets?account=1%3A0xabc");
}

#[test]
fn frame_url_drops_account_param_when_disconnected() {
    let world = World::new();
    world.router().borrow_mut().replace(RouteLocation::new("/assets"));

    let url = world.host.frame_url().unwrap();
    assert_eq!(url.as_str(), "https://account.example.com/app/assets");
}

#[test]
fn child_navigation_updates_the_next_frame_url() {
    let mut world = World::new();
    world.set_wallet(Some(ConnectedWallet::new("0xabc", "1")));

    world
        .client
        .notify_navigation("/transactions", Some(query(&[("page", "2")])));
    world.pump();

    let url = world.host.frame_url().unwrap();
    assert_eq!(
        url.as_str(),
        "https://account.example.com/app/transactions?page=2&account=1%3A0xabc"
    );
}

#[test]
fn wallet_push_message_shape_on_the_wire() {
    let mut world = World::new();
    world.set_wallet(Some(ConnectedWallet::new("0xabc", "1")));

    let sent = world.shell_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["source"], json!("shell"));
    assert_eq!(sent[0]["type"], json!("WALLET_STATE_CHANGED"));
    assert_eq!(sent[0]["payload"]["isConnected"], json!(true));
}
