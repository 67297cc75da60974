use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A metric event to record against a profile identified by email.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub metric: String,
    pub email: String,
    pub properties: Map<String, Value>,
    /// Klaviyo deduplicates events sharing a `unique_id`.
    pub unique_id: String,
    pub value: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

/// Attributes accepted by the profile import (create-or-update) endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

/// Consent state sent for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consent {
    Subscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelConsent {
    pub consent: Consent,
}

impl ChannelConsent {
    pub fn subscribed() -> Self {
        Self {
            consent: Consent::Subscribed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing: Option<ChannelConsent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmsSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing: Option<ChannelConsent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactional: Option<ChannelConsent>,
}

/// Channels a profile is being subscribed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subscriptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSubscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsSubscription>,
}

impl Subscriptions {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.sms.is_none()
    }
}

/// One profile inside a bulk subscribe job.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSubscription {
    pub profile_id: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub subscriptions: Subscriptions,
}

/// A bulk subscribe job request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionJob {
    pub profiles: Vec<ProfileSubscription>,
    pub custom_source: String,
    pub list_id: Option<String>,
}

// =============================================================================
// JSON:API wire shapes
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct Document<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct Resource<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,
}

impl<A> Resource<A> {
    pub fn new(kind: &'static str, attributes: A) -> Self {
        Self {
            kind,
            id: None,
            attributes,
            relationships: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NamedAttributes<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailAttributes<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EventAttributes<'a> {
    pub properties: &'a Map<String, Value>,
    pub metric: Document<Resource<NamedAttributes<'a>>>,
    pub profile: Document<Resource<EmailAttributes<'a>>>,
    pub unique_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubscriberAttributes<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<&'a str>,
    pub subscriptions: &'a Subscriptions,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubscriptionJobAttributes<'a> {
    pub custom_source: &'a str,
    pub profiles: Document<Vec<Resource<SubscriberAttributes<'a>>>>,
}

/// Response body of the profile import endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub data: ProfileData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileData {
    pub id: String,
}
