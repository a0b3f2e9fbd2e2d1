//! Caption generation orchestration.
//!
//! [`App`] turns uploaded media and an optional style sample into a decoded
//! [`CaptionResult`], one request at a time.

use crate::ai::{CaptionService, GeminiCaptionClient};
use crate::media::{MediaKind, MediaPart};
use crate::models::{CaptionRequest, CaptionResult, Config};
use crate::prompts::PromptSettings;
use crate::{Error, Result};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub struct App {
    captions: Box<dyn CaptionService>,
    prompt: PromptSettings,
    request_timeout: Duration,
    in_flight: Semaphore,
}

impl App {
    /// Build an app around any caption service.
    ///
    /// Integration tests use this to inject [`crate::ai::MockCaptionClient`].
    pub fn with_services(
        captions: Box<dyn CaptionService>,
        prompt: PromptSettings,
        request_timeout: Duration,
    ) -> Self {
        Self {
            captions,
            prompt,
            request_timeout,
            in_flight: Semaphore::new(1),
        }
    }

    /// Construct an app talking to Gemini with the credential from `config`.
    pub fn new(config: &Config) -> Self {
        info!(
            "Caption provider: Gemini (model: {}, timeout: {:?})",
            config.model, config.request_timeout
        );

        let captions = GeminiCaptionClient::new(
            config.gemini_api_key.clone(),
            config.model.clone(),
            config.request_timeout,
        )
        .with_base_url(config.base_url.clone());

        Self::with_services(
            Box::new(captions),
            config.prompt.clone(),
            config.request_timeout,
        )
    }

    /// Generate captions from data-URI (or bare base64) strings.
    pub async fn generate_captions(
        &self,
        images: &[String],
        user_text: Option<&str>,
        audio: Option<&str>,
    ) -> Result<CaptionResult> {
        if images.is_empty() {
            return Err(Self::missing_images());
        }

        let images = images
            .iter()
            .map(|uri| MediaPart::from_data_uri(uri, MediaKind::Image))
            .collect::<Result<Vec<_>>>()?;
        let audio = audio
            .map(|uri| MediaPart::from_data_uri(uri, MediaKind::Audio))
            .transpose()?;

        self.generate_from_parts(images, audio, user_text).await
    }

    /// Generate captions from already encoded media.
    pub async fn generate_from_parts(
        &self,
        images: Vec<MediaPart>,
        audio: Option<MediaPart>,
        user_text: Option<&str>,
    ) -> Result<CaptionResult> {
        if images.is_empty() {
            return Err(Self::missing_images());
        }

        let _permit = self.in_flight.try_acquire().map_err(|_| {
            warn!("Rejecting caption request: another generation is in flight");
            Error::Busy
        })?;

        let image_count = images.len();
        let has_audio = audio.is_some();
        let request = CaptionRequest::build(images, audio, user_text, &self.prompt)?;

        info!(
            "Generating captions ({} image(s), audio: {}, style sample: {})",
            image_count,
            has_audio,
            user_text.is_some_and(|t| !t.is_empty())
        );

        let raw = tokio::time::timeout(
            self.request_timeout,
            self.captions.request_captions(request),
        )
        .await
        .map_err(|_| {
            error!(
                "Caption generation timed out after {:?}",
                self.request_timeout
            );
            Error::Timeout(self.request_timeout)
        })??;

        let captions = CaptionResult::from_response_text(&raw).map_err(|e| {
            error!("Failed to parse caption response: {}\nRaw: {}", e, raw);
            e
        })?;

        info!("Captions generated");
        Ok(captions)
    }

    fn missing_images() -> Error {
        Error::Precondition("please upload at least one image".to_string())
    }
}
