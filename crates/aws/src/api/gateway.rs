//! HTTP gateway transport.
//!
//! Every provider call is POSTed as one JSON envelope to a signing gateway
//! which holds the credentials and talks to AWS:
//!
//! ```json
//! { "service": "ec2", "call": "RunInstances", "region": "eu-west-1",
//!   "profile": "default", "input": { ... } }
//! ```
//!
//! A 2xx response body is the call output. Any other status carries
//! `{ "code": "...", "message": "..." }`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use stratus_core::ProviderError;

use super::Transport;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    region: String,
    profile: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    service: &'a str,
    call: &'a str,
    region: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a str>,
    input: Json,
}

#[derive(Deserialize, Default)]
struct GatewayError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, region: impl Into<String>) -> Self {
        HttpTransport {
            endpoint: endpoint.into(),
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(
        &self,
        service: &'static str,
        call: &'static str,
        input: Json,
    ) -> Result<Json, ProviderError> {
        let endpoint = self.endpoint.clone();
        let region = self.region.clone();
        let profile = self.profile.clone();

        // ureq is synchronous, so wrap in spawn_blocking
        tokio::task::spawn_blocking(move || {
            let envelope = Envelope {
                service,
                call,
                region: &region,
                profile: profile.as_deref(),
                input,
            };
            post(&endpoint, call, &envelope)
        })
        .await
        .map_err(|e| ProviderError::new(call, format!("task join error: {}", e)))?
    }
}

fn post(endpoint: &str, call: &str, envelope: &Envelope<'_>) -> Result<Json, ProviderError> {
    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build();
    let agent = ureq::Agent::new_with_config(config);
    let response = agent
        .post(endpoint)
        .header("content-type", "application/json")
        .send_json(envelope)
        .map_err(|e| ProviderError::new(call, format!("gateway request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return response
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::new(call, format!("invalid gateway response: {}", e)));
    }

    let body: GatewayError = response.into_body().read_json().unwrap_or_default();
    let message = if body.message.is_empty() {
        format!("gateway returned status {}", status.as_u16())
    } else {
        body.message
    };
    let err = ProviderError::new(call, message);
    Err(match body.code {
        Some(code) => err.with_code(code),
        None => err,
    })
}
