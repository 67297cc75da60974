//! Sequential, best-effort delivery of marketing events.

use std::time::Duration;

use tracing::{error, info};

use crate::common::DispatchReport;
use crate::domains::marketing::MarketingEvent;
use crate::kernel::{with_timeout, BaseMarketingService};

/// Send `events` in order, awaiting each before the next.
///
/// A failed or timed-out send is logged and counted; it never stops the
/// remaining sends and is never retried.
pub async fn dispatch_events(
    events: &[MarketingEvent],
    marketing: &dyn BaseMarketingService,
    timeout: Duration,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for event in events {
        match with_timeout(timeout, "send marketing event", marketing.send_event(event)).await {
            Ok(()) => {
                report.sent += 1;
                info!(
                    metric = %event.metric,
                    idempotency_key = %event.idempotency_key,
                    "Marketing event sent"
                );
            }
            Err(e) => {
                report.failed += 1;
                error!(
                    metric = %event.metric,
                    idempotency_key = %event.idempotency_key,
                    error = %format!("{:#}", e),
                    "Failed to send marketing event"
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::marketing::{Metric, Properties};
    use crate::kernel::test_dependencies::MockMarketingService;

    fn event(metric: Metric) -> MarketingEvent {
        MarketingEvent::new(metric, "a@x.com", Properties::new())
    }

    #[tokio::test]
    async fn sends_in_order() {
        let marketing = MockMarketingService::new();
        let events = vec![event(Metric::AddedToCart), event(Metric::StartedCheckout)];

        let report = dispatch_events(&events, &marketing, Duration::from_secs(5)).await;

        assert_eq!(report, DispatchReport { sent: 2, failed: 0 });
        assert_eq!(
            marketing.sent_metrics(),
            vec![Metric::AddedToCart, Metric::StartedCheckout]
        );
    }

    #[tokio::test]
    async fn failed_send_does_not_stop_siblings() {
        let marketing = MockMarketingService::new().failing_metric(Metric::AddedToCart);
        let events = vec![event(Metric::AddedToCart), event(Metric::StartedCheckout)];

        let report = dispatch_events(&events, &marketing, Duration::from_secs(5)).await;

        assert_eq!(report, DispatchReport { sent: 1, failed: 1 });
        assert_eq!(marketing.send_attempts(), 2);
        assert_eq!(marketing.sent_metrics(), vec![Metric::StartedCheckout]);
    }

    #[tokio::test]
    async fn slow_send_counts_as_failure() {
        let marketing = MockMarketingService::new().with_send_delay(Duration::from_millis(200));
        let events = vec![event(Metric::PlacedOrder)];

        let report = dispatch_events(&events, &marketing, Duration::from_millis(20)).await;

        assert_eq!(report, DispatchReport { sent: 0, failed: 1 });
    }

    #[tokio::test]
    async fn nothing_to_send_is_an_empty_report() {
        let marketing = MockMarketingService::new();

        let report = dispatch_events(&[], &marketing, Duration::from_secs(5)).await;

        assert_eq!(report, DispatchReport::default());
        assert_eq!(marketing.send_attempts(), 0);
    }
}
