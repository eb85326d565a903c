//! Client for the hosted document index (Wetro collections).
//!
//! The service ingests raw resources and answers questions against them; it
//! never sees locally produced chunks.

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_COLLECTION_BASE_URL: &str = "https://api.wetrocloud.com/v1";
pub const DEFAULT_QUERY_MODEL: &str = "llama-3.3-70b";
pub const API_TOKEN_ENV: &str = "WETRO_API_TOKEN";
pub const COLLECTION_ID_ENV: &str = "WETRO_COLLECTION_ID";

/// Text returned when a query response has no `response` field.
pub const NO_RESPONSE: &str = "No response";

pub struct CollectionClient {
    token: String,
    base_url: String,
    timeout: Duration,
}

impl CollectionClient {
    pub fn new(token: String) -> Self {
        Self {
            token,
            base_url: DEFAULT_COLLECTION_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from environment variable WETRO_API_TOKEN
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(API_TOKEN_ENV)
            .context("WETRO_API_TOKEN environment variable not set")?;
        Ok(Self::new(token))
    }

    /// Add a resource (usually a document URL) to a collection. Returns the
    /// service's JSON reply.
    pub fn insert_resource(
        &self,
        collection_id: &str,
        resource: &str,
        resource_type: &str,
    ) -> Result<Value> {
        info!("Inserting {} resource into collection {}", resource_type, collection_id);
        self.post_form(
            "resource/insert/",
            &[
                ("collection_id", collection_id),
                ("resource", resource),
                ("type", resource_type),
            ],
        )
    }

    /// Ask a question against a collection and return the answer text.
    pub fn query(&self, collection_id: &str, request_query: &str, model: &str) -> Result<String> {
        info!("Querying collection {} with {}", collection_id, model);
        let body = self.post_form(
            "collection/query/",
            &[
                ("collection_id", collection_id),
                ("request_query", request_query),
                ("model", model),
            ],
        )?;
        Ok(response_text(&body))
    }

    fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("POST {}", url);

        let response = ureq::post(&url)
            .set("Authorization", &format!("Token {}", self.token))
            .timeout(self.timeout)
            .send_form(form)
            .with_context(|| format!("Failed to call collection API: {url}"))?;

        response
            .into_json()
            .context("Failed to parse collection API response")
    }
}

/// The answer text of a query reply: the `response` field as a string, or
/// rendered as JSON when it is structured.
pub fn response_text(body: &Value) -> String {
    match body.get("response") {
        None | Some(Value::Null) => NO_RESPONSE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
