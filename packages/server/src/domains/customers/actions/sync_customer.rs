use klaviyo_client::{ProfileAttributes, ProfileSubscription};
use medusa_client::Customer;
use serde_json::json;
use tracing::{debug, error, info};

use crate::common::{DispatchReport, NotificationOutcome};
use crate::domains::customers::models::{resolve_consent, subscriptions_for};
use crate::kernel::{with_timeout, ServerDeps};

/// Profile fields mirrored from the host customer record.
pub fn profile_attributes(customer: &Customer) -> ProfileAttributes {
    let mut properties = serde_json::Map::new();
    properties.insert("medusa_customer_id".into(), json!(customer.id));
    properties.insert(
        "created_at".into(),
        json!(customer.created_at.map(|at| at.to_rfc3339())),
    );

    ProfileAttributes {
        email: customer.email.clone(),
        phone_number: customer.phone.clone(),
        external_id: Some(customer.id.clone()),
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        properties,
    }
}

/// Handle `customer.created` and `customer.updated`.
///
/// The profile is always upserted; consent is only granted when the customer
/// opted into a marketing channel. A failed subscription is counted as a
/// failed send, the profile upsert having already succeeded.
pub async fn on_customer_upserted(customer_id: &str, deps: &ServerDeps) -> NotificationOutcome {
    let customer = match with_timeout(
        deps.call_timeout,
        "fetch customer",
        deps.commerce.fetch_customer(customer_id),
    )
    .await
    {
        Ok(Some(customer)) => customer,
        Ok(None) => return NotificationOutcome::not_found("customer", customer_id),
        Err(e) => return NotificationOutcome::failed(&e),
    };

    let profile_id = match with_timeout(
        deps.call_timeout,
        "upsert profile",
        deps.marketing.upsert_profile(&profile_attributes(&customer)),
    )
    .await
    {
        Ok(profile_id) => profile_id,
        Err(e) => return NotificationOutcome::failed(&e),
    };
    info!(customer_id, profile_id = %profile_id, "Marketing profile upserted");

    let mut report = DispatchReport {
        sent: 1,
        failed: 0,
    };

    let subscriptions = resolve_consent(customer_id, customer.metadata.as_ref())
        .and_then(|flags| subscriptions_for(&customer, flags));

    let Some(subscriptions) = subscriptions else {
        debug!(customer_id, "No channel consent to record");
        return NotificationOutcome::Completed(report);
    };

    let subscription = ProfileSubscription {
        profile_id: Some(profile_id),
        email: subscriptions.email.as_ref().and(customer.email.clone()),
        phone_number: subscriptions.sms.as_ref().and(customer.phone.clone()),
        subscriptions,
    };

    match with_timeout(
        deps.call_timeout,
        "subscribe profile",
        deps.marketing.subscribe_profile(&subscription),
    )
    .await
    {
        Ok(()) => {
            report.sent += 1;
            info!(customer_id, "Channel consent recorded");
        }
        Err(e) => {
            report.failed += 1;
            error!(customer_id, error = %format!("{:#}", e), "Failed to record channel consent");
        }
    }

    NotificationOutcome::Completed(report)
}
