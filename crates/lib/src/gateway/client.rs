//! Gateway client: the session manager's seam to the relay.
//!
//! `Relay` is the trait the session manager sends through; `GatewayClient`
//! implements it over HTTP against a running gateway.

use crate::config::Config;
use crate::gateway::protocol::{ChatReply, ChatRequest};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gateway error: {0}")]
    Api(String),
}

/// Forwards one message and yields the reply. Ok(None) means the provider
/// answered without usable text; any transport, status, or shape problem is
/// an error (the session manager treats all three identically).
#[async_trait]
pub trait Relay: Send + Sync {
    async fn relay(&self, text: &str) -> Result<Option<String>, GatewayError>;
}

/// HTTP client for the gateway's /api/chat relay.
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Client for the gateway address in the config.
    pub fn for_config(config: &Config) -> Self {
        Self::new(format!(
            "http://{}:{}",
            config.gateway.bind.trim(),
            config.gateway.port
        ))
    }
}

#[async_trait]
impl Relay for GatewayClient {
    async fn relay(&self, text: &str) -> Result<Option<String>, GatewayError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            message: text.to_string(),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GatewayError::Api(format!("{} {}", status, body)));
        }
        let data: ChatReply = res.json().await?;
        Ok(data.reply)
    }
}
