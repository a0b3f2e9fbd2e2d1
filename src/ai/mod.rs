//! Generative model integration for caption requests
//!
//! [`CaptionService`] is the seam between request assembly and the remote
//! model; Gemini is the production implementation.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiCaptionClient;
pub use mock::MockCaptionClient;

use crate::models::CaptionRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Submit one request and return the model's raw text reply, undecoded.
    async fn request_captions(&self, request: CaptionRequest) -> Result<String>;
}
