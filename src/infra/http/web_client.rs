use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::core::moderation::{LinkProber, LinkStatus};
use crate::core::platform::PlatformError;

/// Plain HTTP access for the bot: probing links posted in chat and
/// downloading uploaded attachments.
pub struct WebClient {
    /// Never follows redirects, so a 3xx is visible to the link probe.
    probe_client: Client,
    client: Client,
}

impl WebClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let probe_client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .user_agent("CommunityBot/1.0")
            .build()?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("CommunityBot/1.0")
            .build()?;

        Ok(Self {
            probe_client,
            client,
        })
    }

    pub fn classify(status: StatusCode) -> LinkStatus {
        if status.is_success() {
            LinkStatus::Valid
        } else if status.is_redirection() {
            LinkStatus::Redirect
        } else {
            LinkStatus::Invalid
        }
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String, PlatformError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Request(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))
    }
}

#[async_trait]
impl LinkProber for WebClient {
    async fn probe(&self, url: &str) -> LinkStatus {
        match self.probe_client.head(url).send().await {
            Ok(response) => Self::classify(response.status()),
            Err(e) => {
                tracing::debug!(url, error = %e, "Link probe failed");
                LinkStatus::Invalid
            }
        }
    }
}
