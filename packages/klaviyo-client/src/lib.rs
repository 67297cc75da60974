//! Pure Klaviyo REST API client.
//!
//! Covers the three calls a commerce integration needs: recording metric
//! events, creating-or-updating profiles, and bulk subscribing profiles to
//! marketing channels. All requests use the JSON:API envelope and a pinned
//! API revision.
//!
//! # Example
//!
//! ```rust,ignore
//! use klaviyo_client::{KlaviyoClient, NewEvent};
//!
//! let client = KlaviyoClient::new("pk_live_xxx".into());
//! client.create_event(&NewEvent {
//!     metric: "Added to Cart".into(),
//!     email: "shopper@example.com".into(),
//!     properties: Default::default(),
//!     unique_id: uuid::Uuid::new_v4().to_string(),
//!     value: None,
//!     time: None,
//! }).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{KlaviyoError, Result};
pub use types::{
    ChannelConsent, Consent, EmailSubscription, NewEvent, ProfileAttributes, ProfileResponse,
    ProfileSubscription, SmsSubscription, SubscriptionJob, Subscriptions,
};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::json;
use types::{
    Document, EmailAttributes, EventAttributes, NamedAttributes, Resource, SubscriberAttributes,
    SubscriptionJobAttributes,
};

const BASE_URL: &str = "https://a.klaviyo.com";

/// Dated API revision sent with every request.
pub const API_REVISION: &str = "2024-10-15";

const JSON_API: &str = "application/vnd.api+json";

#[derive(Debug, Clone)]
pub struct KlaviyoClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl KlaviyoClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Record a metric event. Klaviyo answers `202 Accepted` with no body.
    pub async fn create_event(&self, event: &NewEvent) -> Result<()> {
        tracing::debug!(metric = %event.metric, unique_id = %event.unique_id, "Creating Klaviyo event");
        self.post("/api/events/", &event_document(event)).await?;
        Ok(())
    }

    /// Create or update a profile, returning its Klaviyo id.
    pub async fn upsert_profile(&self, attributes: &ProfileAttributes) -> Result<String> {
        let body = Document {
            data: Resource::new("profile", attributes),
        };
        let resp = self.post("/api/profile-import/", &body).await?;
        let text = resp.text().await?;
        let profile: ProfileResponse =
            serde_json::from_str(&text).map_err(|e| KlaviyoError::Parse(e.to_string()))?;
        Ok(profile.data.id)
    }

    /// Start a bulk subscribe job. Processing is asynchronous on Klaviyo's side.
    pub async fn bulk_subscribe(&self, job: &SubscriptionJob) -> Result<()> {
        tracing::debug!(
            profiles = job.profiles.len(),
            list_id = ?job.list_id,
            "Submitting Klaviyo bulk subscribe job"
        );
        self.post(
            "/api/profile-subscription-bulk-create-jobs/",
            &subscription_document(job),
        )
        .await?;
        Ok(())
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Klaviyo-API-Key {}", self.api_key))
            .header("revision", API_REVISION)
            .header(ACCEPT, JSON_API)
            .header(CONTENT_TYPE, JSON_API)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(KlaviyoError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp)
    }
}

fn event_document(event: &NewEvent) -> Document<Resource<EventAttributes<'_>>> {
    Document {
        data: Resource::new(
            "event",
            EventAttributes {
                properties: &event.properties,
                metric: Document {
                    data: Resource::new("metric", NamedAttributes { name: &event.metric }),
                },
                profile: Document {
                    data: Resource::new("profile", EmailAttributes { email: &event.email }),
                },
                unique_id: &event.unique_id,
                value: event.value,
                time: event.time,
            },
        ),
    }
}

fn subscription_document(job: &SubscriptionJob) -> Document<Resource<SubscriptionJobAttributes<'_>>> {
    let profiles = job
        .profiles
        .iter()
        .map(|p| Resource {
            kind: "profile",
            id: p.profile_id.clone(),
            attributes: SubscriberAttributes {
                email: p.email.as_deref(),
                phone_number: p.phone_number.as_deref(),
                subscriptions: &p.subscriptions,
            },
            relationships: None,
        })
        .collect();

    let mut resource = Resource::new(
        "profile-subscription-bulk-create-job",
        SubscriptionJobAttributes {
            custom_source: &job.custom_source,
            profiles: Document { data: profiles },
        },
    );
    resource.relationships = job
        .list_id
        .as_ref()
        .map(|id| json!({ "list": { "data": { "type": "list", "id": id } } }));

    Document { data: resource }
}
