//! Gemini caption client.
//!
//! Sends the encoded media followed by the composed prompt in a single user
//! turn, with a JSON response schema naming the three caption tones.

use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, Schema,
    SchemaType,
};
use crate::ai::CaptionService;
use crate::models::{CaptionRequest, CaptionTone};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Response schema requiring exactly the three tone properties as strings.
pub fn caption_schema() -> Schema {
    let keys: Vec<String> = CaptionTone::ALL
        .iter()
        .map(|tone| tone.key().to_string())
        .collect();

    Schema {
        schema_type: SchemaType::Object,
        description: None,
        properties: CaptionTone::ALL
            .iter()
            .map(|tone| (tone.key().to_string(), Schema::string(tone.description())))
            .collect(),
        required: keys.clone(),
        property_ordering: keys,
    }
}

/// Media parts in request order, then the prompt as the final text part.
fn build_request(request: CaptionRequest) -> GenerateContentRequest {
    let (media, prompt) = request.into_parts();

    let mut parts: Vec<Part> = media.into_iter().map(Part::from).collect();
    parts.push(Part::Text { text: prompt });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(caption_schema()),
        }),
    }
}

pub struct GeminiCaptionClient {
    http: GeminiHttpClient,
}

impl GeminiCaptionClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    /// Route requests to `base_url`; see [`GeminiHttpClient::with_base_url`].
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    /// Concatenated text parts of the first candidate.
    fn extract_text(response: &GenerateContentResponse) -> Result<String> {
        let candidate = response.candidates.first().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            Error::AiProvider(format!("Gemini returned no caption candidate: {}", reason))
        })?;

        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if text.is_empty() {
            return Err(Error::AiProvider(format!(
                "No text in Gemini caption response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl CaptionService for GeminiCaptionClient {
    async fn request_captions(&self, request: CaptionRequest) -> Result<String> {
        let media_count = request.media().len();
        tracing::debug!(
            "Requesting captions from {} with {} media part(s)",
            self.http.model(),
            media_count
        );

        let body = build_request(request);
        let response: GenerateContentResponse = self.http.generate_content(&body).await?;

        Self::extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::error::ErrorKind;
    use crate::media::MediaPart;
    use crate::prompts::PromptSettings;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    const CAPTIONS_JSON: &str = r#"{"informative":"I","friendly":"F","professional":"P"}"#;

    fn make_client(server: &MockServer, api_key: &str, model: &str) -> GeminiCaptionClient {
        GeminiCaptionClient::new(api_key.to_string(), model.to_string(), Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    fn make_request(audio: bool) -> CaptionRequest {
        CaptionRequest::build(
            vec![
                MediaPart::new("image/png", "AAAA"),
                MediaPart::new("image/jpeg", "BBBB"),
            ],
            audio.then(|| MediaPart::new("audio/mp3", "SUQz")),
            None,
            &PromptSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_schema_requires_three_string_fields() {
        let schema = serde_json::to_value(caption_schema()).unwrap();

        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(
            schema["required"],
            serde_json::json!(["informative", "friendly", "professional"])
        );
        assert_eq!(
            schema["propertyOrdering"],
            serde_json::json!(["informative", "friendly", "professional"])
        );
        for key in ["informative", "friendly", "professional"] {
            assert_eq!(schema["properties"][key]["type"], "STRING");
        }
        assert_eq!(schema["properties"].as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_build_request_orders_media_before_prompt() {
        let request = make_request(true);
        let prompt = request.prompt().to_string();
        let body = serde_json::to_value(build_request(request)).unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["inlineData"]["mimeType"], "audio/mp3");
        assert_eq!(parts[3]["text"], prompt.as_str());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_request_captions_returns_raw_text() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response(CAPTIONS_JSON)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let raw = client.request_captions(make_request(false)).await.unwrap();
        assert_eq!(raw, CAPTIONS_JSON);
    }

    #[tokio::test]
    async fn test_request_body_carries_schema_and_inline_media() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response(CAPTIONS_JSON)),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        client.request_captions(make_request(false)).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let body: serde_json::Value = received[0].body_json().unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            serde_json::json!(["informative", "friendly", "professional"])
        );
    }

    #[tokio::test]
    async fn test_concatenates_split_text_parts() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "text": "{\"informative\":\"I\"," },
                            { "text": "\"friendly\":\"F\",\"professional\":\"P\"}" }
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let raw = client.request_captions(make_request(false)).await.unwrap();
        assert_eq!(raw, CAPTIONS_JSON);
    }

    #[tokio::test]
    async fn test_api_error_returns_transport_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key", DEFAULT_MODEL);
        let err = client.request_captions(make_request(false)).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_blocked_prompt_reports_block_reason() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "key", DEFAULT_MODEL);
        let err = client.request_captions(make_request(false)).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_candidate_without_text_is_rejected() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "key", DEFAULT_MODEL);
        let err = client.request_captions(make_request(false)).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response(CAPTIONS_JSON)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", "models/gemini-2.5-flash");
        assert_eq!(client.model(), "gemini-2.5-flash");

        client.request_captions(make_request(false)).await.unwrap();
    }
}
