//! HTTP client for the backend leads API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::RemoteLead;

use super::wire::{self, UpdateStatusRequest};
use super::LeadStore;

/// HTTP client for the leads API
pub struct HttpLeadStore {
    config: ApiConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpLeadStore {
    /// Create a new client from configuration
    ///
    /// Returns an error if the base URL is empty or the token is not a valid header value.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("api.base_url is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    fn list_url(&self) -> String {
        format!("{}/api/leads?limit={}", self.base_url, self.config.list_limit)
    }

    fn lead_url(&self, id: &str) -> String {
        format!("{}/api/leads/{}", self.base_url, urlencoding::encode(id))
    }

    /// Read the body of a response, turning non-2xx into [`Error::Api`].
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(Error::Http(format!("failed to read response: {}", e)));
            }
            Err(_) => "unknown".to_string(),
        };
        check_status(status, body)
    }
}

fn check_status(status: StatusCode, body: String) -> Result<String> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::Api {
            status: status.as_u16(),
            message: body,
        })
    }
}

#[async_trait]
impl LeadStore for HttpLeadStore {
    async fn list_leads(&self) -> Result<Vec<RemoteLead>> {
        let url = self.list_url();

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let leads = wire::parse_list_body(&body)?;
        tracing::debug!(count = leads.len(), "Listed leads");
        Ok(leads)
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<()> {
        let url = self.lead_url(id);

        let response = self
            .http_client
            .put(&url)
            .json(&UpdateStatusRequest { status })
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let body = match Self::read_body(response).await {
            Err(Error::Api { status: 404, .. }) => {
                return Err(Error::LeadNotFound(id.to_string()));
            }
            other => other?,
        };
        wire::parse_update_body(&body)?;
        tracing::debug!(lead_id = %id, status = %status, "Updated lead status");
        Ok(())
    }
}
