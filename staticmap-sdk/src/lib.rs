// ABOUTME: Static map SDK downloading map imagery and decoding it into display-ready bitmaps
// ABOUTME: Blocking chunked fetch, format-detecting decode to 32bpp BGRX, and a caller-owned cache

pub mod bitmap;
pub mod builder;
pub mod cache;
pub mod client;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod fetcher;
pub mod request;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use bitmap::{stride_for, DecodedImage, PixelFormat};
pub use builder::MapClientConfig;
pub use cache::MapCache;
pub use client::MapClient;
pub use decoder::{decode, CodecLimits, ImageCodecContext, MapDecoder};
pub use error::{DecodeError, FetchError, MapError};
pub use fetcher::{fetch, read_chunked};
pub use request::{redact_key, MapPreset, MapRequest};
pub use transport::{HttpTransport, Transport};

pub type Result<T> = std::result::Result<T, MapError>;
