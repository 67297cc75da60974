//! Order and return notifications: one event each, or a skip.

mod common;

use crate::common::*;
use serde_json::json;
use server_core::common::{DispatchReport, NotificationOutcome};
use server_core::domains::marketing::Metric;
use server_core::domains::orders::{
    on_order_canceled, on_order_completed, on_order_placed, on_order_shipped,
    on_return_received, on_return_requested,
};
use server_core::kernel::test_dependencies::{
    MockCommerceGateway, MockMarketingService, TestDependencies,
};

fn harness(commerce: MockCommerceGateway) -> TestHarness {
    TestHarness::with(TestDependencies::new().mock_commerce(commerce))
}

fn sent_one() -> NotificationOutcome {
    NotificationOutcome::Completed(DispatchReport { sent: 1, failed: 0 })
}

#[tokio::test]
async fn placed_order_is_sent_with_value() {
    let ctx = harness(MockCommerceGateway::new().with_order(order("order_1", Some("a@x.com"))));

    let outcome = on_order_placed("order_1", &ctx.deps).await;

    assert_eq!(outcome, sent_one());
    let events = ctx.mocks.marketing.events();
    assert_eq!(events[0].metric, Metric::PlacedOrder);
    assert_eq!(events[0].value, Some(50.0));
    assert_eq!(events[0].properties["orderId"], json!("order_1"));
}

#[tokio::test]
async fn order_without_any_email_is_dropped() {
    let ctx = harness(MockCommerceGateway::new().with_order(order("order_1", None)));

    let outcome = on_order_placed("order_1", &ctx.deps).await;

    assert_eq!(
        outcome,
        NotificationOutcome::missing_identity("order", "order_1")
    );
    assert_eq!(ctx.mocks.marketing.send_attempts(), 0);
}

#[tokio::test]
async fn customer_email_stands_in_for_order_email() {
    let ctx = harness(
        MockCommerceGateway::new()
            .with_order(with_customer_email(order("order_1", None), "c@x.com")),
    );

    on_order_completed("order_1", &ctx.deps).await;

    let events = ctx.mocks.marketing.events();
    assert_eq!(events[0].metric, Metric::OrderDelivered);
    assert_eq!(events[0].profile_email, "c@x.com");
}

#[tokio::test]
async fn unknown_order_is_skipped() {
    let ctx = harness(MockCommerceGateway::new());

    let outcome = on_order_canceled("order_missing", &ctx.deps).await;

    assert_eq!(
        outcome,
        NotificationOutcome::not_found("order", "order_missing")
    );
}

#[tokio::test]
async fn host_outage_fails_the_notification() {
    let ctx = harness(
        MockCommerceGateway::new()
            .with_order(order("order_1", Some("a@x.com")))
            .failing(),
    );

    let outcome = on_order_placed("order_1", &ctx.deps).await;

    match outcome {
        NotificationOutcome::Failed(reason) => assert!(reason.contains("unavailable")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn shipment_resolves_its_fulfillment() {
    let mut shipped = order("order_1", Some("a@x.com"));
    shipped.fulfillments = vec![
        fulfillment("ful_0", None),
        fulfillment("ful_1", Some(("1Z999", "https://track.example/1Z999"))),
    ];
    let ctx = harness(MockCommerceGateway::new().with_order(shipped));

    let outcome = on_order_shipped("order_1", "ful_1", &ctx.deps).await;

    assert_eq!(outcome, sent_one());
    let events = ctx.mocks.marketing.events();
    assert_eq!(events[0].metric, Metric::OrderShipped);
    assert_eq!(events[0].properties["fulfillmentId"], json!("ful_1"));
    assert_eq!(events[0].properties["trackingNumber"], json!("1Z999"));
}

#[tokio::test]
async fn shipment_for_unknown_fulfillment_is_skipped() {
    let ctx = harness(MockCommerceGateway::new().with_order(order("order_1", Some("a@x.com"))));

    let outcome = on_order_shipped("order_1", "ful_404", &ctx.deps).await;

    assert_eq!(
        outcome,
        NotificationOutcome::not_found("fulfillment", "ful_404")
    );
    assert_eq!(ctx.mocks.marketing.send_attempts(), 0);
}

#[tokio::test]
async fn return_stages_map_to_their_metrics() {
    let ctx = harness(
        MockCommerceGateway::new()
            .with_order(order("order_1", Some("a@x.com")))
            .with_return(order_return("ret_1", "order_1")),
    );

    on_return_requested("order_1", "ret_1", &ctx.deps).await;
    on_return_received("order_1", "ret_1", &ctx.deps).await;

    assert_eq!(
        ctx.mocks.marketing.sent_metrics(),
        vec![Metric::ReturnRequested, Metric::ReturnReceived]
    );
    let events = ctx.mocks.marketing.events();
    assert_eq!(events[0].properties["refundAmount"], json!(25.0));
    assert_eq!(events[0].properties["items"][0]["reason"], json!("damaged"));
}

#[tokio::test]
async fn unknown_return_is_skipped() {
    let ctx = harness(MockCommerceGateway::new().with_order(order("order_1", Some("a@x.com"))));

    let outcome = on_return_requested("order_1", "ret_404", &ctx.deps).await;

    assert_eq!(outcome, NotificationOutcome::not_found("return", "ret_404"));
}

#[tokio::test]
async fn rejected_send_is_reported_not_raised() {
    let ctx = TestHarness::with(
        TestDependencies::new()
            .mock_commerce(MockCommerceGateway::new().with_order(order("order_1", Some("a@x.com"))))
            .mock_marketing(MockMarketingService::new().failing_metric(Metric::OrderCanceled)),
    );

    let outcome = on_order_canceled("order_1", &ctx.deps).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed(DispatchReport { sent: 0, failed: 1 })
    );
}
