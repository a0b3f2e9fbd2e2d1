use super::MediaKind;

/// Sniff a MIME type from leading magic bytes.
///
/// Returns `None` for unrecognised input so callers can apply the default for
/// the kind of media they expected.
pub fn detect_mime(kind: MediaKind, bytes: &[u8]) -> Option<&'static str> {
    let detected = match kind {
        MediaKind::Image => detect_image_mime(bytes),
        MediaKind::Audio => detect_audio_mime(bytes),
    };

    if detected.is_none() {
        tracing::warn!(
            "Unrecognized {:?} format (first 4 bytes: {:02X?}), falling back to {}",
            kind,
            &bytes[..bytes.len().min(4)],
            kind.default_mime()
        );
    }

    detected
}

fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c', ..] => Some("image/heic"),
        _ => None,
    }
}

fn detect_audio_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [b'I', b'D', b'3', ..] => Some("audio/mp3"),
        [0xFF, second, ..] if second & 0xF6 == 0xF0 => Some("audio/aac"),
        [0xFF, second, ..] if second & 0xE0 == 0xE0 => Some("audio/mp3"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some("audio/wav"),
        [b'O', b'g', b'g', b'S', ..] => Some("audio/ogg"),
        [b'f', b'L', b'a', b'C', ..] => Some("audio/flac"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'M', b'4', b'A', ..] => Some("audio/m4a"),
        _ => None,
    }
}
