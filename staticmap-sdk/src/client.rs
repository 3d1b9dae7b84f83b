// ABOUTME: MapClient orchestrates request normalization, chunked fetch, and decode
// ABOUTME: Single blocking attempt per call; any stage failure aborts with its own error

use crate::bitmap::DecodedImage;
use crate::builder::MapClientConfig;
use crate::decoder::MapDecoder;
use crate::error::MapError;
use crate::fetcher::fetch;
use crate::request::{redact_key, MapRequest};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use secrecy::SecretString;
use std::sync::Arc;
use url::Url;

/// Downloads static maps and decodes them into display-ready bitmaps.
///
/// Holds only read-only configuration, so one client may serve many threads.
#[derive(Clone)]
pub struct MapClient {
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn MapDecoder>,
    base_url: Url,
    api_key: Arc<SecretString>,
}

impl MapClient {
    pub fn from_config(config: MapClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            MapError::Configuration(format!("Invalid base URL {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MapError::Configuration(format!(
                "Invalid base URL {}: cannot carry a path",
                config.base_url
            )));
        }

        let transport: Arc<dyn Transport> = match config.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(config.timeout, &config.user_agent)?),
        };
        let decoder: Arc<dyn MapDecoder> = match config.decoder {
            Some(decoder) => decoder,
            None => Arc::new(config.codec),
        };

        Ok(Self {
            transport,
            decoder,
            base_url,
            api_key: Arc::new(config.api_key),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch and decode the map of `city` at the requested size.
    ///
    /// An empty city means Seattle; a dimension at or below 50 falls back to
    /// 500 wide or 400 high.
    pub fn get_map(
        &self,
        city: &str,
        requested_width: i32,
        requested_height: i32,
    ) -> Result<DecodedImage> {
        self.get_request(&MapRequest::new(city, requested_width, requested_height))
    }

    pub fn get_request(&self, request: &MapRequest) -> Result<DecodedImage> {
        let url = request.url(&self.base_url, &self.api_key)?;
        log::info!(
            "Requesting {}x{} map of {}",
            request.width(),
            request.height(),
            request.city()
        );

        let payload = fetch(self.transport.as_ref(), url.as_str()).inspect_err(|e| {
            log::warn!("Map download failed for {}: {}", redact_key(url.as_str()), e)
        })?;
        let image = self.decoder.decode(&payload)?;

        if (image.width(), image.height()) != request.size() {
            log::warn!(
                "Requested {}x{} map of {} but received {}x{}",
                request.width(),
                request.height(),
                request.city(),
                image.width(),
                image.height()
            );
        }
        Ok(image)
    }
}
