use serde::Deserialize;
use thiserror::Error;

/// Facts delivered by the commerce host, one per webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommerceEvent {
    CartUpdated { cart_id: String },
    OrderPlaced { order_id: String },
    OrderFulfillmentCreated { order_id: String, fulfillment_id: String },
    OrderCanceled { order_id: String },
    OrderCompleted { order_id: String },
    ReturnRequested { order_id: String, return_id: String },
    ReturnReceived { order_id: String, return_id: String },
    CustomerCreated { customer_id: String },
    CustomerUpdated { customer_id: String },
}

/// Raw webhook body: `{"event": "order.placed", "data": {"id": "..."}}`
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: EventData,
}

/// Event payload ids. The host is inconsistent about naming, so the
/// specific keys are preferred and `id` is the fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    pub id: Option<String>,
    pub order_id: Option<String>,
    pub fulfillment_id: Option<String>,
    pub return_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("{event} is missing `{field}`")]
    MissingField { event: String, field: &'static str },
}

impl EventData {
    fn require(
        &self,
        event: &str,
        field: &'static str,
        value: Option<&String>,
    ) -> Result<String, EnvelopeError> {
        value
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| EnvelopeError::MissingField {
                event: event.to_string(),
                field,
            })
    }

    fn id(&self, event: &str) -> Result<String, EnvelopeError> {
        self.require(event, "id", self.id.as_ref())
    }

    fn order_id(&self, event: &str) -> Result<String, EnvelopeError> {
        self.require(event, "order_id", self.order_id.as_ref())
    }

    fn order_or_id(&self, event: &str) -> Result<String, EnvelopeError> {
        self.require(event, "id", self.order_id.as_ref().or(self.id.as_ref()))
    }

    fn fulfillment_id(&self, event: &str) -> Result<String, EnvelopeError> {
        self.require(
            event,
            "fulfillment_id",
            self.fulfillment_id.as_ref().or(self.id.as_ref()),
        )
    }

    fn return_id(&self, event: &str) -> Result<String, EnvelopeError> {
        self.require(
            event,
            "return_id",
            self.return_id.as_ref().or(self.id.as_ref()),
        )
    }
}

impl CommerceEvent {
    /// `Ok(None)` for events this bridge does not handle.
    pub fn from_envelope(envelope: &WebhookEnvelope) -> Result<Option<Self>, EnvelopeError> {
        let name = envelope.event.as_str();
        let data = &envelope.data;

        let event = match name {
            "cart.updated" => Self::CartUpdated {
                cart_id: data.id(name)?,
            },
            "order.placed" => Self::OrderPlaced {
                order_id: data.order_or_id(name)?,
            },
            "order.fulfillment_created" => Self::OrderFulfillmentCreated {
                order_id: data.order_id(name)?,
                fulfillment_id: data.fulfillment_id(name)?,
            },
            "order.canceled" => Self::OrderCanceled {
                order_id: data.order_or_id(name)?,
            },
            "order.completed" => Self::OrderCompleted {
                order_id: data.order_or_id(name)?,
            },
            "order.return_requested" => Self::ReturnRequested {
                order_id: data.order_id(name)?,
                return_id: data.return_id(name)?,
            },
            "order.return_received" => Self::ReturnReceived {
                order_id: data.order_id(name)?,
                return_id: data.return_id(name)?,
            },
            "customer.created" => Self::CustomerCreated {
                customer_id: data.id(name)?,
            },
            "customer.updated" => Self::CustomerUpdated {
                customer_id: data.id(name)?,
            },
            _ => return Ok(None),
        };

        Ok(Some(event))
    }

    /// Host event name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::CartUpdated { .. } => "cart.updated",
            Self::OrderPlaced { .. } => "order.placed",
            Self::OrderFulfillmentCreated { .. } => "order.fulfillment_created",
            Self::OrderCanceled { .. } => "order.canceled",
            Self::OrderCompleted { .. } => "order.completed",
            Self::ReturnRequested { .. } => "order.return_requested",
            Self::ReturnReceived { .. } => "order.return_received",
            Self::CustomerCreated { .. } => "customer.created",
            Self::CustomerUpdated { .. } => "customer.updated",
        }
    }

    /// Id of the entity the event is about
    pub fn subject_id(&self) -> &str {
        match self {
            Self::CartUpdated { cart_id } => cart_id,
            Self::OrderPlaced { order_id }
            | Self::OrderFulfillmentCreated { order_id, .. }
            | Self::OrderCanceled { order_id }
            | Self::OrderCompleted { order_id }
            | Self::ReturnRequested { order_id, .. }
            | Self::ReturnReceived { order_id, .. } => order_id,
            Self::CustomerCreated { customer_id } | Self::CustomerUpdated { customer_id } => {
                customer_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> Result<Option<CommerceEvent>, EnvelopeError> {
        let envelope: WebhookEnvelope = serde_json::from_value(body).unwrap();
        CommerceEvent::from_envelope(&envelope)
    }

    #[test]
    fn cart_updated_uses_id() {
        let event = parse(json!({"event": "cart.updated", "data": {"id": "cart_1"}}));

        assert_eq!(
            event,
            Ok(Some(CommerceEvent::CartUpdated {
                cart_id: "cart_1".into()
            }))
        );
    }

    #[test]
    fn fulfillment_accepts_either_id_shape() {
        let legacy = parse(json!({
            "event": "order.fulfillment_created",
            "data": {"id": "ful_1", "order_id": "order_1"}
        }));
        let explicit = parse(json!({
            "event": "order.fulfillment_created",
            "data": {"fulfillment_id": "ful_1", "order_id": "order_1"}
        }));

        let expected = Ok(Some(CommerceEvent::OrderFulfillmentCreated {
            order_id: "order_1".into(),
            fulfillment_id: "ful_1".into(),
        }));
        assert_eq!(legacy, expected);
        assert_eq!(explicit, expected);
    }

    #[test]
    fn return_requires_order_id() {
        let err = parse(json!({"event": "order.return_requested", "data": {"id": "ret_1"}}))
            .unwrap_err();

        assert_eq!(err.to_string(), "order.return_requested is missing `order_id`");
    }

    #[test]
    fn unknown_events_are_ignored() {
        assert_eq!(
            parse(json!({"event": "product.updated", "data": {"id": "prod_1"}})),
            Ok(None)
        );
    }

    #[test]
    fn subject_id_is_the_primary_entity() {
        let event = CommerceEvent::ReturnReceived {
            order_id: "order_1".into(),
            return_id: "ret_1".into(),
        };

        assert_eq!(event.subject_id(), "order_1");
        assert_eq!(event.name(), "order.return_received");
    }
}
