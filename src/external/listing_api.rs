use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config::UpstreamConfig;
use crate::external::quote_provider::{QuotePage, QuoteProvider, QuoteProviderError};

/// HTTP client for the upstream stock listing API.
pub struct ListingApiProvider {
    client: reqwest::Client,
    list_url: String,
    activation_url: String,
    api_token: String,
    activation_timeout: Duration,
    list_timeout: Duration,
}

impl ListingApiProvider {
    pub fn new(config: &UpstreamConfig) -> Self {
        if config.api_token.is_empty() {
            warn!("UPSTREAM_API_TOKEN is not set; upstream requests will likely be rejected");
        }

        Self {
            client: reqwest::Client::new(),
            list_url: config.list_url.clone(),
            activation_url: config.activation_url.clone(),
            api_token: config.api_token.clone(),
            activation_timeout: config.activation_timeout,
            list_timeout: config.list_timeout,
        }
    }
}

#[async_trait]
impl QuoteProvider for ListingApiProvider {
    async fn activate(&self) -> Result<(), QuoteProviderError> {
        info!("Sending activation signal to {}", self.activation_url);

        let resp = self
            .client
            .post(&self.activation_url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.activation_timeout)
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            info!("Activation signal accepted ({})", status);
        } else {
            warn!("Activation signal returned status {}. Continuing anyway", status);
        }

        Ok(())
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<QuotePage, QuoteProviderError> {
        let mut request = self
            .client
            .get(&self.list_url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.list_timeout);

        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            request = request.query(&[("next_page", cursor)]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(QuoteProviderError::BadStatus(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let page: QuotePage =
            serde_json::from_str(&body).map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

        debug!(
            "Fetched {} quotes (next page: {:?})",
            page.items.len(),
            page.next_cursor()
        );

        Ok(page)
    }
}
