use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::models::DEFAULT_BASE_URL;
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

/// Gemini REST transport for caption generation.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`);
    /// a leading `models/` segment is stripped.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at another API host.
    ///
    /// Public because `Config::base_url` (`GEMINI_BASE_URL`) is applied through
    /// it by `App::new`, which is how proxies and the integration tests' mock
    /// server are reached. A trailing `/` is dropped.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one caption request to `generateContent` and decode the envelope.
    ///
    /// Every failure names the model, so a misrouted or misnamed model shows
    /// up directly in the logs.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Caption request to Gemini model {} not sent: {}", self.model, e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                "Gemini model {} rejected caption request (status {}): {}",
                self.model,
                status,
                body
            );
            return Err(Error::AiProvider(format!(
                "Gemini model {} rejected caption request (status {}): {}",
                self.model, status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Unreadable caption envelope from Gemini model {}: {}\nBody: {}",
                self.model,
                e,
                body
            );
            Error::AiProvider(format!(
                "Unreadable caption envelope from Gemini model {}: {}",
                self.model, e
            ))
        })
    }
}
