//! Data models and structures
//!
//! Defines the caption request/result types exchanged with the generative
//! model, plus runtime configuration.

use crate::media::MediaPart;
use crate::prompts::{self, PromptOptions, PromptSettings};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The three fixed caption voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionTone {
    Informative,
    Friendly,
    Professional,
}

impl CaptionTone {
    pub const ALL: [CaptionTone; 3] = [
        CaptionTone::Informative,
        CaptionTone::Friendly,
        CaptionTone::Professional,
    ];

    /// JSON property name used in the response schema.
    pub fn key(self) -> &'static str {
        match self {
            CaptionTone::Informative => "informative",
            CaptionTone::Friendly => "friendly",
            CaptionTone::Professional => "professional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptionTone::Informative => "Informative tone",
            CaptionTone::Friendly => "Friendly tone",
            CaptionTone::Professional => "Professional tone",
        }
    }

    /// Schema description handed to the model for this property.
    pub fn description(self) -> &'static str {
        match self {
            CaptionTone::Informative => "The informative caption.",
            CaptionTone::Friendly => "The friendly caption.",
            CaptionTone::Professional => "The professional caption.",
        }
    }
}

/// Three-tone caption set returned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionResult {
    pub informative: String,
    pub friendly: String,
    pub professional: String,
}

impl CaptionResult {
    /// Decode the model's raw reply.
    ///
    /// The text is trimmed and must be a JSON object whose `informative`,
    /// `friendly` and `professional` members are all strings. Anything else is
    /// rejected whole; the offending text travels with the error.
    pub fn from_response_text(raw: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidResponse {
            reason,
            raw: raw.to_string(),
        };

        let value: serde_json::Value =
            serde_json::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;

        // Guard against serde accepting `["a","b","c"]` as a struct.
        if !value.is_object() {
            return Err(invalid(format!("expected a JSON object, got {}", value)));
        }

        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }

    pub fn get(&self, tone: CaptionTone) -> &str {
        match tone {
            CaptionTone::Informative => &self.informative,
            CaptionTone::Friendly => &self.friendly,
            CaptionTone::Professional => &self.professional,
        }
    }

    /// Captions paired with their tone, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CaptionTone, &str)> {
        CaptionTone::ALL.into_iter().map(move |tone| (tone, self.get(tone)))
    }
}

/// A single generation attempt: media first, then one text instruction.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    media: Vec<MediaPart>,
    prompt: String,
}

impl CaptionRequest {
    /// Assemble a request from encoded media and an optional style sample.
    ///
    /// At least one image is required; an audio clip on its own is not enough.
    pub fn build(
        images: Vec<MediaPart>,
        audio: Option<MediaPart>,
        style_sample: Option<&str>,
        settings: &PromptSettings,
    ) -> Result<Self> {
        if images.is_empty() {
            return Err(Error::Precondition(
                "at least one image is required to generate captions".to_string(),
            ));
        }

        let prompt = prompts::compose_caption_prompt(
            &PromptOptions {
                has_images: true,
                has_audio: audio.is_some(),
                style_sample,
            },
            settings,
        );

        let mut media = images;
        media.extend(audio);

        Ok(Self { media, prompt })
    }

    pub fn media(&self) -> &[MediaPart] {
        &self.media
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Hand the media and prompt over to a transport; the request is spent.
    pub fn into_parts(self) -> (Vec<MediaPart>, String) {
        (self.media, self.prompt)
    }
}

// Configuration
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub prompt: PromptSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let request_timeout = match non_empty("CAPTION_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::Config(format!(
                        "CAPTION_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let defaults = PromptSettings::default();

        Ok(Self {
            gemini_api_key,
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
            prompt: PromptSettings {
                clinic_name: non_empty("CLINIC_NAME").unwrap_or(defaults.clinic_name),
                language: non_empty("CAPTION_LANGUAGE").unwrap_or(defaults.language),
            },
        })
    }
}
