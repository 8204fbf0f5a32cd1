use super::{ApiConfig, CollaboratorError};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::trace;

/// A JSON HTTP client bound to one service's base URL and key.
#[derive(Debug, Clone)]
pub struct ApiClient {
    service: &'static str,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(service: &'static str, config: &ApiConfig) -> Result<Self, CollaboratorError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CollaboratorError::MissingApiKey { service })?
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| CollaboratorError::Transport { service, source })?;
        Ok(Self {
            service,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(endpoint))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    /// Sends the request and decodes a JSON body, mapping 4xx/5xx answers to
    /// [`CollaboratorError::Rejected`].
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value, CollaboratorError> {
        let service = self.service;
        let response = request
            .send()
            .await
            .map_err(|source| CollaboratorError::Transport { service, source })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| CollaboratorError::Transport { service, source })?;
        trace!(service, status, "Received response");

        if status >= 400 {
            return Err(CollaboratorError::Rejected {
                service,
                status,
                body,
            });
        }
        parse_json(service, &body)
    }
}

pub fn parse_json(service: &'static str, body: &str) -> Result<Value, CollaboratorError> {
    serde_json::from_str(body).map_err(|e| CollaboratorError::InvalidResponse {
        service,
        reason: e.to_string(),
    })
}
