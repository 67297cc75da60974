//! Cart notifications end to end: fetch, detect, dispatch, store.

mod common;

use std::time::Duration;

use crate::common::*;
use serde_json::json;
use server_core::common::{DispatchReport, NotificationOutcome};
use server_core::domains::carts::{on_cart_changed, CartSnapshot, DetectorPolicy};
use server_core::domains::marketing::Metric;
use server_core::kernel::test_dependencies::{
    MockCommerceGateway, MockMarketingService, MockSnapshotStore, TestDependencies,
};
use server_core::kernel::BaseSnapshotStore;
use test_context::test_context;

const EMAIL: Option<&str> = Some("a@x.com");

#[test_context(TestHarness)]
#[tokio::test]
async fn first_sighting_sends_one_added_to_cart(ctx: &TestHarness) {
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed(DispatchReport { sent: 1, failed: 0 })
    );
    let events = ctx.mocks.marketing.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].metric, Metric::AddedToCart);
    assert_eq!(events[0].properties["quantity"], json!(1));
    assert_eq!(events[0].profile_email, "a@x.com");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn quantity_bump_with_address_adds_delta_then_starts_checkout(ctx: &TestHarness) {
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));
    on_cart_changed("cart_1", &ctx.deps).await;

    ctx.mocks.commerce.set_cart(with_shipping_address(cart(
        "cart_1",
        EMAIL,
        vec![line_item("i1", 3)],
    )));
    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(outcome.report(), Some(DispatchReport { sent: 2, failed: 0 }));
    let events = ctx.mocks.marketing.events();
    assert_eq!(
        ctx.mocks.marketing.sent_metrics(),
        vec![
            Metric::AddedToCart,
            Metric::AddedToCart,
            Metric::StartedCheckout
        ]
    );
    assert_eq!(events[1].properties["quantity"], json!(2));
    assert_eq!(events[2].properties["items"][0]["quantity"], json!(3));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn checkout_is_reported_once(ctx: &TestHarness) {
    let with_address = with_shipping_address(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));
    ctx.mocks.commerce.set_cart(with_address.clone());

    on_cart_changed("cart_1", &ctx.deps).await;
    on_cart_changed("cart_1", &ctx.deps).await;

    let checkouts = ctx
        .mocks
        .marketing
        .sent_metrics()
        .into_iter()
        .filter(|m| *m == Metric::StartedCheckout)
        .count();
    assert_eq!(checkouts, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn becoming_identified_credits_the_last_item(ctx: &TestHarness) {
    ctx.mocks.commerce.set_cart(cart("cart_1", None, vec![]));
    assert_eq!(
        on_cart_changed("cart_1", &ctx.deps).await.report(),
        Some(DispatchReport::default())
    );

    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 2)]));
    on_cart_changed("cart_1", &ctx.deps).await;

    let events = ctx.mocks.marketing.events();
    assert!(!events.is_empty());
    assert!(events
        .iter()
        .all(|e| e.metric == Metric::AddedToCart && e.properties["variantId"] == json!("variant_i1")));
    // Both the new-line rule and the catch-up fire for the same line
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn catch_up_can_be_switched_off() {
    let ctx = TestHarness::with(TestDependencies::new().detector_policy(DetectorPolicy {
        retrospective_catch_up: false,
    }));
    ctx.mocks.commerce.set_cart(cart("cart_1", None, vec![]));
    on_cart_changed("cart_1", &ctx.deps).await;

    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 2)]));
    on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(ctx.mocks.marketing.sent_metrics(), vec![Metric::AddedToCart]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn anonymous_cart_sends_nothing_but_is_remembered(ctx: &TestHarness) {
    ctx.mocks.commerce.set_cart(with_shipping_address(cart(
        "cart_1",
        None,
        vec![line_item("i1", 1)],
    )));

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(outcome.report(), Some(DispatchReport::default()));
    assert_eq!(ctx.mocks.marketing.send_attempts(), 0);
    let stored = ctx.mocks.snapshots.get("cart_1").await.unwrap().unwrap();
    assert!(!stored.has_email);
    assert!(stored.has_shipping_address);
}

#[tokio::test]
async fn failed_send_still_sends_siblings_and_stores_snapshot() {
    let ctx = TestHarness::with(
        TestDependencies::new()
            .mock_marketing(MockMarketingService::new().failing_metric(Metric::AddedToCart)),
    );
    ctx.mocks.commerce.set_cart(with_shipping_address(cart(
        "cart_1",
        EMAIL,
        vec![line_item("i1", 1)],
    )));

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(outcome.report(), Some(DispatchReport { sent: 1, failed: 1 }));
    assert_eq!(ctx.mocks.marketing.sent_metrics(), vec![Metric::StartedCheckout]);
    let stored = ctx.mocks.snapshots.get("cart_1").await.unwrap();
    assert_eq!(
        stored,
        Some(CartSnapshot::observe(&with_shipping_address(cart(
            "cart_1",
            EMAIL,
            vec![line_item("i1", 1)]
        ))))
    );
}

#[tokio::test]
async fn slow_send_is_a_failed_send() {
    let ctx = TestHarness::with(
        TestDependencies::new()
            .mock_marketing(MockMarketingService::new().with_send_delay(Duration::from_millis(300)))
            .call_timeout(Duration::from_millis(30)),
    );
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(outcome.report(), Some(DispatchReport { sent: 0, failed: 1 }));
    assert!(ctx.mocks.snapshots.get("cart_1").await.unwrap().is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn vanished_cart_is_skipped(ctx: &TestHarness) {
    let outcome = on_cart_changed("cart_gone", &ctx.deps).await;

    assert_eq!(outcome, NotificationOutcome::not_found("cart", "cart_gone"));
    assert!(ctx.mocks.snapshots.get("cart_gone").await.unwrap().is_none());
}

#[tokio::test]
async fn host_failure_leaves_snapshot_untouched() {
    let ctx = TestHarness::with(
        TestDependencies::new().mock_commerce(
            MockCommerceGateway::new()
                .with_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]))
                .failing(),
        ),
    );

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert!(matches!(outcome, NotificationOutcome::Failed(_)));
    assert_eq!(ctx.mocks.marketing.send_attempts(), 0);
    assert!(ctx.mocks.snapshots.get("cart_1").await.unwrap().is_none());
}

#[tokio::test]
async fn unreadable_snapshot_store_fails_before_sending() {
    let ctx = TestHarness::with(
        TestDependencies::new().mock_snapshots(MockSnapshotStore::new().failing_get()),
    );
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert!(matches!(outcome, NotificationOutcome::Failed(_)));
    assert_eq!(ctx.mocks.marketing.send_attempts(), 0);
}

#[tokio::test]
async fn unwritable_snapshot_store_fails_after_sending() {
    let ctx = TestHarness::with(
        TestDependencies::new().mock_snapshots(MockSnapshotStore::new().failing_put()),
    );
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));

    let outcome = on_cart_changed("cart_1", &ctx.deps).await;

    assert!(matches!(outcome, NotificationOutcome::Failed(_)));
    assert_eq!(ctx.mocks.marketing.sent_metrics(), vec![Metric::AddedToCart]);
}

#[tokio::test]
async fn unstored_cycle_replays_the_same_events() {
    let ctx = TestHarness::with(
        TestDependencies::new().mock_snapshots(MockSnapshotStore::new().failing_put()),
    );
    ctx.mocks.commerce.set_cart(with_shipping_address(cart(
        "cart_1",
        EMAIL,
        vec![line_item("i1", 2)],
    )));

    on_cart_changed("cart_1", &ctx.deps).await;
    let first = ctx.mocks.marketing.sent_metrics();
    on_cart_changed("cart_1", &ctx.deps).await;

    assert_eq!(first, vec![Metric::AddedToCart, Metric::StartedCheckout]);
    assert_eq!(ctx.mocks.marketing.sent_metrics(), [first.clone(), first].concat());
    let quantities: Vec<_> = ctx
        .mocks
        .marketing
        .events()
        .iter()
        .filter(|e| e.metric == Metric::AddedToCart)
        .map(|e| e.properties["quantity"].clone())
        .collect();
    assert_eq!(quantities, vec![json!(2), json!(2)]);
}

#[tokio::test]
async fn concurrent_notifications_for_one_cart_are_serialized() {
    // The delay keeps the first cycle inside its critical section while the
    // second arrives
    let ctx = TestHarness::with(
        TestDependencies::new()
            .mock_marketing(MockMarketingService::new().with_send_delay(Duration::from_millis(50))),
    );
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));

    let (first, second) = tokio::join!(
        on_cart_changed("cart_1", &ctx.deps),
        on_cart_changed("cart_1", &ctx.deps)
    );

    let sent = first.report().unwrap().sent + second.report().unwrap().sent;
    assert_eq!(sent, 1);
    assert_eq!(ctx.mocks.marketing.sent_metrics(), vec![Metric::AddedToCart]);
    assert!(ctx.deps.cart_locks.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn different_carts_are_tracked_independently(ctx: &TestHarness) {
    ctx.mocks
        .commerce
        .set_cart(cart("cart_1", EMAIL, vec![line_item("i1", 1)]));
    ctx.mocks
        .commerce
        .set_cart(cart("cart_2", Some("b@x.com"), vec![line_item("i9", 4)]));

    let (a, b) = tokio::join!(
        on_cart_changed("cart_1", &ctx.deps),
        on_cart_changed("cart_2", &ctx.deps)
    );

    assert_eq!(a.report().unwrap().sent, 1);
    assert_eq!(b.report().unwrap().sent, 1);
    let mut emails: Vec<String> = ctx
        .mocks
        .marketing
        .events()
        .into_iter()
        .map(|e| e.profile_email)
        .collect();
    emails.sort();
    assert_eq!(emails, vec!["a@x.com".to_string(), "b@x.com".to_string()]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn every_event_gets_its_own_idempotency_key(ctx: &TestHarness) {
    ctx.mocks.commerce.set_cart(with_shipping_address(cart(
        "cart_1",
        EMAIL,
        vec![line_item("i1", 1)],
    )));

    on_cart_changed("cart_1", &ctx.deps).await;

    let events = ctx.mocks.marketing.events();
    assert_eq!(events.len(), 2);
    assert_ne!(events[0].idempotency_key, events[1].idempotency_key);
}
