//! Media encoding for multimodal requests
//!
//! Turns uploaded images and audio clips into base64 payloads tagged with a
//! MIME type, either from raw bytes on disk or from browser-style data URIs.

pub mod mime;

use crate::{Error, Result};
use base64::Engine as _;
use futures::future::try_join_all;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Upper bound for a single inline payload; Gemini rejects larger inline requests.
pub const MAX_MEDIA_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// MIME type assumed when none can be determined.
    pub fn default_mime(self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Audio => "audio/mp3",
        }
    }
}

/// One encoded unit of input media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    mime_type: String,
    data: String,
}

impl MediaPart {
    /// Wrap an already base64-encoded payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes. The MIME hint wins, then magic-byte sniffing, then
    /// the kind's default.
    pub fn from_bytes(kind: MediaKind, mime_hint: Option<&str>, bytes: &[u8]) -> Self {
        let mime_type = mime_hint
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .or_else(|| mime::detect_mime(kind, bytes).map(str::to_string))
            .unwrap_or_else(|| kind.default_mime().to_string());

        Self {
            mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// Without the `data:` scheme, anything up to the first comma is still read
    /// as the header, and a string with no comma is taken as a bare base64
    /// payload.
    pub fn from_data_uri(uri: &str, kind: MediaKind) -> Result<Self> {
        let uri = uri.trim();

        let (header, data) = match uri.strip_prefix("data:") {
            Some(rest) => rest.split_once(',').ok_or_else(|| {
                Error::Encoding("data URI has no ',' separating the payload".to_string())
            })?,
            None => uri.split_once(',').unwrap_or(("", uri)),
        };

        let mime_type = header
            .split_once(';')
            .map(|(mime, _)| mime.trim())
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| kind.default_mime());

        if data.is_empty() {
            return Err(Error::Encoding(format!(
                "{:?} data URI carries an empty payload",
                kind
            )));
        }

        Ok(Self::new(mime_type, data))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload without any data-URI prefix.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub(crate) fn into_parts(self) -> (String, String) {
        (self.mime_type, self.data)
    }
}

/// Read and encode one file without blocking the runtime.
pub async fn encode_file(path: &Path, kind: MediaKind) -> Result<MediaPart> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_MEDIA_BYTES as u64 {
        return Err(Error::Encoding(format!(
            "{} is {} bytes, above the {} byte inline limit",
            path.display(),
            metadata.len(),
            MAX_MEDIA_BYTES
        )));
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", path.display(), e);
        e
    })?;

    let part = MediaPart::from_bytes(kind, None, &bytes);
    tracing::debug!(
        "Encoded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        part.mime_type()
    );
    Ok(part)
}

/// Await a batch of encodes concurrently, keeping input order.
///
/// The first failure fails the whole batch.
pub async fn encode_all<I, F>(encodes: I) -> Result<Vec<MediaPart>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<MediaPart>>,
{
    try_join_all(encodes).await
}

pub async fn encode_files(paths: &[PathBuf], kind: MediaKind) -> Result<Vec<MediaPart>> {
    encode_all(paths.iter().map(|path| encode_file(path, kind))).await
}
