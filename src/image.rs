//! Image normalization.
//!
//! Turns the heterogeneous image inputs callers hold (inline base64, data
//! URLs, local paths, `file://` URIs, remote URLs) into one canonical base64
//! payload that every backend accepts.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use tracing::debug;

use crate::{Result, SuggestError};

const DATA_URL_SCHEME: &str = "data:";
const IMAGE_DATA_URL_PREFIX: &str = "data:image/";

/// Resolves image references into base64 payloads.
#[derive(Clone)]
pub struct ImageNormalizer {
    http: Client,
}

impl ImageNormalizer {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Produce the base64 payload for an image.
    ///
    /// Precedence: non-empty `inline_base64` verbatim, then the payload of a
    /// data-URL reference, then the bytes behind a remote URL or local path.
    pub async fn normalize(&self, reference: &str, inline_base64: Option<&str>) -> Result<String> {
        if let Some(inline) = inline_base64.map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(inline.to_string());
        }

        let reference = reference.trim();
        if reference.is_empty() {
            return Err(SuggestError::MissingImage);
        }

        if reference.starts_with(DATA_URL_SCHEME) {
            return data_url_payload(reference)
                .map(str::to_string)
                .ok_or_else(|| SuggestError::Image("malformed data URL".to_string()));
        }

        let bytes = if is_remote(reference) {
            self.fetch(reference).await?
        } else {
            let path = reference.strip_prefix("file://").unwrap_or(reference);
            debug!(path, "reading local image");
            tokio::fs::read(path)
                .await
                .map_err(|e| SuggestError::Image(format!("Failed to read image {path}: {e}")))?
        };

        Ok(STANDARD.encode(bytes))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "fetching remote image");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SuggestError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::Image(format!(
                "Failed to fetch image: HTTP {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SuggestError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// The payload segment of a data URL (everything after the first comma).
pub fn data_url_payload(data_url: &str) -> Option<&str> {
    if !data_url.starts_with(DATA_URL_SCHEME) {
        return None;
    }
    data_url.find(',').map(|comma| &data_url[comma + 1..])
}

/// Wrap a base64 payload as a JPEG data URL, leaving image data URLs as-is.
pub fn to_data_url(payload: &str) -> String {
    if payload.starts_with(IMAGE_DATA_URL_PREFIX) {
        payload.to_string()
    } else {
        format!("data:image/jpeg;base64,{payload}")
    }
}

/// Decode raw base64 or a data URL into image bytes.
pub fn decode(payload: &str) -> Result<Vec<u8>> {
    let raw = payload
        .find(',')
        .map_or(payload, |comma| &payload[comma + 1..])
        .trim();
    STANDARD
        .decode(raw)
        .map_err(|e| SuggestError::Image(format!("invalid base64 image: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ImageNormalizer {
        ImageNormalizer::new(Client::new())
    }

    #[tokio::test]
    async fn inline_base64_wins_over_reference() {
        let payload = normalizer()
            .normalize("/does/not/exist.jpg", Some("  QUJD  "))
            .await
            .unwrap();
        assert_eq!(payload, "QUJD");
    }

    #[tokio::test]
    async fn blank_inline_falls_through_to_data_url() {
        let payload = normalizer()
            .normalize("data:image/png;base64,QUJD", Some("   "))
            .await
            .unwrap();
        assert_eq!(payload, "QUJD");
    }

    #[tokio::test]
    async fn empty_reference_is_a_precondition_failure() {
        let err = normalizer().normalize("  ", None).await.unwrap_err();
        assert!(matches!(err, SuggestError::MissingImage));
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn local_file_is_base64_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"ABC").unwrap();

        let plain = normalizer()
            .normalize(path.to_str().unwrap(), None)
            .await
            .unwrap();
        assert_eq!(plain, "QUJD");

        let uri = format!("file://{}", path.display());
        let from_uri = normalizer().normalize(&uri, None).await.unwrap();
        assert_eq!(from_uri, "QUJD");
    }

    #[tokio::test]
    async fn missing_file_is_an_image_error() {
        let err = normalizer()
            .normalize("/definitely/not/here.jpg", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::Image(_)));
    }

    #[test]
    fn data_url_helpers() {
        assert_eq!(data_url_payload("data:image/jpeg;base64,AAAA"), Some("AAAA"));
        assert_eq!(data_url_payload("AAAA"), None);
        assert_eq!(to_data_url("AAAA"), "data:image/jpeg;base64,AAAA");
        assert_eq!(
            to_data_url("data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
        assert_eq!(decode("data:image/png;base64,QUJD").unwrap(), b"ABC");
        assert_eq!(decode("QUJD").unwrap(), b"ABC");
        assert!(decode("not base64!!").is_err());
    }
}
