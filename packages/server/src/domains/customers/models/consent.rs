use klaviyo_client::{ChannelConsent, EmailSubscription, SmsSubscription, Subscriptions};
use medusa_client::Customer;
use serde_json::{Map, Value};
use tracing::warn;

/// Metadata key the storefront writes consent under
const CONSENT_KEY: &str = "klaviyo";

/// Channel consent captured by the storefront.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentFlags {
    pub email: bool,
    pub sms: bool,
    pub transactional_sms: bool,
}

impl ConsentFlags {
    pub fn any_marketing(&self) -> bool {
        self.email || self.sms
    }
}

/// Read consent from customer metadata.
///
/// `metadata.klaviyo` may be an object or a JSON string holding one. Flag
/// values are read loosely (`1`, `"yes"` and `true` all count). Anything that
/// does not decode to an object is logged and treated as no consent.
pub fn resolve_consent(
    customer_id: &str,
    metadata: Option<&Map<String, Value>>,
) -> Option<ConsentFlags> {
    let raw = metadata?.get(CONSENT_KEY)?;

    let decoded;
    let object = match raw {
        Value::Null => return None,
        Value::Object(object) => object,
        Value::String(text) => {
            decoded = match serde_json::from_str::<Value>(text) {
                Ok(value) => value,
                Err(e) => {
                    warn!(customer_id, error = %e, "Unparseable consent metadata, treating as none");
                    return None;
                }
            };
            match &decoded {
                Value::Object(object) => object,
                _ => {
                    warn!(customer_id, "Consent metadata is not an object, treating as none");
                    return None;
                }
            }
        }
        _ => {
            warn!(customer_id, "Consent metadata is not an object, treating as none");
            return None;
        }
    };

    Some(ConsentFlags {
        email: truthy(object.get("email")),
        sms: truthy(object.get("sms")),
        transactional_sms: truthy(object.get("transactional_sms")),
    })
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Channels to subscribe `customer` to, or `None` when nothing qualifies.
///
/// Transactional SMS alone never triggers a subscription: at least one
/// marketing channel must have been consented to.
pub fn subscriptions_for(customer: &Customer, flags: ConsentFlags) -> Option<Subscriptions> {
    if !flags.any_marketing() {
        return None;
    }

    let mut subscriptions = Subscriptions::default();

    if flags.email && has_value(customer.email.as_deref()) {
        subscriptions.email = Some(EmailSubscription {
            marketing: Some(ChannelConsent::subscribed()),
        });
    }

    if has_value(customer.phone.as_deref()) {
        let sms = SmsSubscription {
            marketing: flags.sms.then(ChannelConsent::subscribed),
            transactional: flags.transactional_sms.then(ChannelConsent::subscribed),
        };
        if sms.marketing.is_some() || sms.transactional.is_some() {
            subscriptions.sms = Some(sms);
        }
    }

    (!subscriptions.is_empty()).then_some(subscriptions)
}

fn has_value(field: Option<&str>) -> bool {
    field.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::fixtures::customer;
    use serde_json::json;

    fn consent_of(klaviyo: Value) -> Option<ConsentFlags> {
        let customer = customer("cus_1", Some("a@x.com"), Some(klaviyo));
        resolve_consent(&customer.id, customer.metadata.as_ref())
    }

    #[test]
    fn reads_object_metadata() {
        let flags = consent_of(json!({"email": true, "sms": false, "transactional_sms": 1}));

        assert_eq!(
            flags,
            Some(ConsentFlags {
                email: true,
                sms: false,
                transactional_sms: true,
            })
        );
    }

    #[test]
    fn reads_json_string_metadata() {
        let flags = consent_of(json!(r#"{"email": true, "sms": "yes"}"#));

        assert_eq!(
            flags,
            Some(ConsentFlags {
                email: true,
                sms: true,
                transactional_sms: false,
            })
        );
    }

    #[test]
    fn malformed_metadata_is_no_consent() {
        assert_eq!(consent_of(json!("{not json")), None);
        assert_eq!(consent_of(json!("[1, 2]")), None);
        assert_eq!(consent_of(json!(42)), None);
    }

    #[test]
    fn missing_metadata_is_no_consent() {
        let customer = customer("cus_1", Some("a@x.com"), None);
        assert_eq!(resolve_consent(&customer.id, customer.metadata.as_ref()), None);
        assert_eq!(consent_of(Value::Null), None);
    }

    #[test]
    fn email_consent_needs_an_email() {
        let flags = ConsentFlags {
            email: true,
            ..Default::default()
        };

        let with_email = customer("cus_1", Some("a@x.com"), None);
        let subscriptions = subscriptions_for(&with_email, flags).unwrap();
        assert!(subscriptions.email.is_some());
        assert!(subscriptions.sms.is_none());

        let without_email = customer("cus_1", None, None);
        assert_eq!(subscriptions_for(&without_email, flags), None);
    }

    #[test]
    fn sms_channels_need_a_phone() {
        let flags = ConsentFlags {
            email: false,
            sms: true,
            transactional_sms: true,
        };
        let mut with_phone = customer("cus_1", Some("a@x.com"), None);
        with_phone.phone = Some("+15555550100".into());

        let sms = subscriptions_for(&with_phone, flags).unwrap().sms.unwrap();
        assert!(sms.marketing.is_some());
        assert!(sms.transactional.is_some());

        let without_phone = customer("cus_1", Some("a@x.com"), None);
        assert_eq!(subscriptions_for(&without_phone, flags), None);
    }

    #[test]
    fn transactional_only_is_not_enough() {
        let flags = ConsentFlags {
            transactional_sms: true,
            ..Default::default()
        };
        let mut with_phone = customer("cus_1", Some("a@x.com"), None);
        with_phone.phone = Some("+15555550100".into());

        assert_eq!(subscriptions_for(&with_phone, flags), None);
    }
}
