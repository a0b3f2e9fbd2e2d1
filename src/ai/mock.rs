use super::CaptionService;
use crate::models::CaptionRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_RESPONSE: &str = r#"{"informative":"Mock informative caption #implants","friendly":"Mock friendly caption 😊","professional":"Mock professional caption"}"#;

/// In-memory [`CaptionService`] that replays canned raw responses.
///
/// Clones share state, so a clone kept by a test can observe calls made
/// through the original.
#[derive(Clone)]
pub struct MockCaptionClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<CaptionRequest>>>,
}

impl MockCaptionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a raw reply; replies are served in order and then cycle.
    pub fn with_raw_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Make every call fail as the remote service would.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.failure.lock().unwrap() = Some(message.into());
        self
    }

    /// Hold each call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Most recent request received, if any.
    pub fn last_request(&self) -> Option<CaptionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockCaptionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionService for MockCaptionClient {
    async fn request_captions(&self, request: CaptionRequest) -> Result<String> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        *self.last_request.lock().unwrap() = Some(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(DEFAULT_RESPONSE.to_string())
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
