// ABOUTME: Error types for the map download and decode pipeline
// ABOUTME: Separates transport, decode, and configuration failures with user-facing hints

use image::error::{ImageError, UnsupportedErrorKind};
use thiserror::Error;

/// Failures while downloading the map payload
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network transport unavailable{}", detail_suffix(.0))]
    TransportUnavailable(Option<String>),

    #[error("Map request failed{}", detail_suffix(.0))]
    RequestFailed(Option<String>),

    #[error("Out of memory while buffering the map payload")]
    OutOfMemory,
}

/// Failures while turning a payload into a bitmap
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No image data was received")]
    EmptyPayload,

    #[error("Image contains no frames")]
    NoFrames,

    #[error("Unsupported or corrupt image: {0}")]
    UnsupportedOrCorrupt(String),

    #[error("Pixel format conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Could not create the destination bitmap: {0}")]
    SurfaceCreationFailed(String),

    #[error("Copying pixels into the bitmap failed: {0}")]
    CopyFailed(String),
}

/// Any failure surfaced by `MapClient::get_map`
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!(": {}", detail),
        _ => String::new(),
    }
}

impl MapError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            MapError::Fetch(FetchError::TransportUnavailable(_)) => {
                Some("Check that TLS support is available on this system")
            }
            MapError::Fetch(FetchError::RequestFailed(_)) => {
                Some("Check your internet connection and that STATICMAP_API_KEY is valid")
            }
            MapError::Fetch(FetchError::OutOfMemory) => {
                Some("Request a smaller map or free memory and try again")
            }
            MapError::Decode(DecodeError::EmptyPayload) => {
                Some("The imagery service returned an empty response")
            }
            MapError::Configuration(_) => Some(
                "Set STATICMAP_API_KEY to your imagery API key (and optionally STATICMAP_BASE_URL)",
            ),
            _ => None,
        }
    }

    /// True when the failure happened before any bytes reached the decoder
    pub fn is_network(&self) -> bool {
        matches!(self, MapError::Fetch(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key
        let err = err.without_url();
        if let Some(status) = err.status() {
            FetchError::RequestFailed(Some(format!("HTTP {}", status)))
        } else {
            FetchError::RequestFailed(Some(err.to_string()))
        }
    }
}

impl From<ImageError> for DecodeError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Limits(e) => DecodeError::SurfaceCreationFailed(e.to_string()),
            ImageError::Unsupported(e) => match e.kind() {
                UnsupportedErrorKind::Color(_) => DecodeError::ConversionFailed(e.to_string()),
                _ => DecodeError::UnsupportedOrCorrupt(e.to_string()),
            },
            ImageError::Parameter(e) => DecodeError::ConversionFailed(e.to_string()),
            ImageError::Encoding(e) => DecodeError::ConversionFailed(e.to_string()),
            other => DecodeError::UnsupportedOrCorrupt(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::error::{LimitError, LimitErrorKind};

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(
            FetchError::TransportUnavailable(None).to_string(),
            "Network transport unavailable"
        );
        assert_eq!(
            FetchError::RequestFailed(Some("HTTP 404 Not Found".to_string())).to_string(),
            "Map request failed: HTTP 404 Not Found"
        );
        assert_eq!(
            FetchError::RequestFailed(Some(String::new())).to_string(),
            "Map request failed"
        );
        assert_eq!(
            FetchError::OutOfMemory.to_string(),
            "Out of memory while buffering the map payload"
        );
    }

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(DecodeError::NoFrames.to_string(), "Image contains no frames");
        assert_eq!(
            DecodeError::EmptyPayload.to_string(),
            "No image data was received"
        );
        assert_eq!(
            DecodeError::CopyFailed("row 3".to_string()).to_string(),
            "Copying pixels into the bitmap failed: row 3"
        );
    }

    #[test]
    fn test_map_error_is_transparent() {
        let err = MapError::from(FetchError::RequestFailed(Some("timed out".to_string())));
        assert_eq!(err.to_string(), "Map request failed: timed out");

        let err = MapError::from(DecodeError::NoFrames);
        assert_eq!(err.to_string(), "Image contains no frames");
    }

    #[test]
    fn test_help_text() {
        assert!(MapError::Configuration("missing key".to_string())
            .help_text()
            .unwrap()
            .contains("STATICMAP_API_KEY"));
        assert!(MapError::from(FetchError::RequestFailed(None))
            .help_text()
            .is_some());
        assert_eq!(MapError::from(DecodeError::NoFrames).help_text(), None);
    }

    #[test]
    fn test_is_network() {
        assert!(MapError::from(FetchError::OutOfMemory).is_network());
        assert!(!MapError::from(DecodeError::NoFrames).is_network());
        assert!(!MapError::Configuration("x".to_string()).is_network());
    }

    #[test]
    fn test_limit_errors_map_to_surface_creation() {
        let err = ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError));
        assert!(matches!(
            DecodeError::from(err),
            DecodeError::SurfaceCreationFailed(_)
        ));
    }
}
