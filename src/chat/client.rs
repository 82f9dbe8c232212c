use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::ChatConfig;

/// Outbound chat-completion API, object-safe so tests can stub it.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<Value>;
}

/// HTTP client for an OpenAI-style chat-completions endpoint.
pub struct ChatClient {
    config: ChatConfig,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> anyhow::Result<Self> {
        if config.api_key.is_none() {
            warn!("CHAT_API_KEY not set; chat completions will be rejected upstream");
        }
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { config, http })
    }
}

/// Two-message chat-completions body: the caller's context as the system
/// message, the question as the user message.
pub(crate) fn build_payload(model: &str, system: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": prompt },
        ],
    })
}

#[async_trait]
impl ChatApi for ChatClient {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<Value> {
        let payload = build_payload(&self.config.model, system, prompt);

        let mut request = self.http.post(&self.config.api_url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completion failed ({status}): {body}");
        }

        // Returned verbatim; the upstream response shape is not ours to model.
        Ok(resp.json().await?)
    }
}
