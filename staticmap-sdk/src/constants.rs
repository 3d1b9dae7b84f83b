// ABOUTME: Centralized constants for the static map SDK
// ABOUTME: Contains request defaults, transfer sizes, codec limits, URLs, and environment names

/// Request parameter defaults
pub mod request {
    /// City requested when the caller passes an empty name
    pub const DEFAULT_CITY: &str = "Seattle";

    /// Requested dimensions at or below this value fall back to the defaults
    pub const DIMENSION_FLOOR: u32 = 50;

    /// Default map width in pixels
    pub const DEFAULT_WIDTH: u32 = 500;

    /// Default map height in pixels
    pub const DEFAULT_HEIGHT: u32 = 400;
}

/// Response body transfer
pub mod transfer {
    /// Bytes requested per body read. The size of a UDP or DNS payload.
    pub const READ_CHUNK_SIZE: usize = 512;

    /// Longest diagnostic text kept from a failed response
    pub const MAX_DIAGNOSTIC_LEN: usize = 256;

    /// Maximum number of redirects followed for a single request
    pub const MAX_REDIRECTS: usize = 3;
}

/// Decoder limits
pub mod codec {
    /// Widest frame the decoder will accept
    pub const MAX_IMAGE_WIDTH: u32 = 8192;

    /// Tallest frame the decoder will accept
    pub const MAX_IMAGE_HEIGHT: u32 = 8192;

    /// Largest single allocation the codec may make while decoding
    pub const MAX_ALLOC_BYTES: u64 = 512 * 1024 * 1024;

    /// Opaque value written into the unused fourth byte of each pixel
    pub const OPAQUE: u8 = 0xFF;
}

/// HTTP and request timeouts
pub mod timeouts {
    use std::time::Duration;

    /// Default timeout for HTTP requests
    pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Imagery service URLs
pub mod urls {
    /// Static map endpoint for aerial imagery with labels
    pub const IMAGERY_MAP_BASE: &str =
        "https://dev.virtualearth.net/REST/v1/Imagery/Map/AerialWithLabels";

    /// Default User-Agent header value
    pub const USER_AGENT: &str = concat!("staticmap-sdk/", env!("CARGO_PKG_VERSION"));
}

/// Environment variables read by `MapClient::from_env`
pub mod env {
    /// Imagery service API key
    pub const API_KEY: &str = "STATICMAP_API_KEY";

    /// Optional override for the imagery endpoint
    pub const BASE_URL: &str = "STATICMAP_BASE_URL";
}
