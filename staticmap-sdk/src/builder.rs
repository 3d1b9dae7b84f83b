// ABOUTME: Builder pattern implementation for MapClient configuration
// ABOUTME: Typed builder with defaults for endpoint, timeout, user agent, and codec limits

use crate::client::MapClient;
use crate::constants::{env, timeouts, urls};
use crate::decoder::{ImageCodecContext, MapDecoder};
use crate::error::MapError;
use crate::transport::Transport;
use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
#[builder(build_method(into = Result<MapClient, MapError>))]
pub struct MapClientConfig {
    pub api_key: SecretString,

    #[builder(default = urls::IMAGERY_MAP_BASE.to_string(), setter(into))]
    pub base_url: String,

    #[builder(default = timeouts::HTTP_REQUEST_TIMEOUT)]
    pub timeout: Duration,

    #[builder(default = urls::USER_AGENT.to_string(), setter(into))]
    pub user_agent: String,

    #[builder(default)]
    pub codec: ImageCodecContext,

    /// Replaces the HTTP transport
    #[builder(default, setter(strip_option))]
    pub transport: Option<Arc<dyn Transport>>,

    /// Replaces the image codec
    #[builder(default, setter(strip_option))]
    pub decoder: Option<Arc<dyn MapDecoder>>,
}

impl From<MapClientConfig> for Result<MapClient, MapError> {
    fn from(config: MapClientConfig) -> Self {
        MapClient::from_config(config)
    }
}

impl fmt::Debug for MapClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapClientConfig")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("codec", &self.codec)
            .field("transport", &self.transport.as_ref().map(|_| "custom"))
            .field("decoder", &self.decoder.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl MapClient {
    pub fn builder() -> MapClientConfigBuilder<((), (), (), (), (), (), ())> {
        MapClientConfig::builder()
    }

    /// Build a client from `STATICMAP_API_KEY` and, when set, `STATICMAP_BASE_URL`
    pub fn from_env() -> crate::Result<MapClient> {
        let api_key = std::env::var(env::API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MapError::Configuration(format!("{} is not set", env::API_KEY)))?;
        let api_key = SecretString::new(api_key.into_boxed_str());

        match std::env::var(env::BASE_URL) {
            Ok(base_url) if !base_url.trim().is_empty() => MapClient::builder()
                .api_key(api_key)
                .base_url(base_url)
                .build(),
            _ => MapClient::builder().api_key(api_key).build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_key() -> SecretString {
        SecretString::new("test-api-key".to_string().into_boxed_str())
    }

    #[test]
    fn test_builder_with_minimal_config() {
        let client = MapClient::builder().api_key(test_key()).build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_builder_with_all_options() {
        let client = MapClient::builder()
            .api_key(test_key())
            .base_url("http://127.0.0.1:8080/maps")
            .timeout(Duration::from_secs(5))
            .user_agent("map-viewer/2.0")
            .codec(ImageCodecContext::new())
            .build();

        let client = client.unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8080/maps");
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = MapClient::builder()
            .api_key(test_key())
            .base_url("not a url")
            .build();

        match result {
            Err(MapError::Configuration(msg)) => assert!(msg.contains("Invalid base URL")),
            Err(other) => panic!("Expected configuration error, got {:?}", other),
            Ok(_) => panic!("Expected configuration error"),
        }
    }

    #[test]
    fn test_config_debug_hides_api_key() {
        let config = MapClientConfig {
            api_key: test_key(),
            base_url: urls::IMAGERY_MAP_BASE.to_string(),
            timeout: timeouts::HTTP_REQUEST_TIMEOUT,
            user_agent: urls::USER_AGENT.to_string(),
            codec: ImageCodecContext::new(),
            transport: None,
            decoder: None,
        };

        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-api-key"));
        assert!(debug.contains("AerialWithLabels"));
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        unsafe {
            std::env::remove_var(env::API_KEY);
            std::env::remove_var(env::BASE_URL);
        }

        match MapClient::from_env() {
            Err(MapError::Configuration(msg)) => assert!(msg.contains("STATICMAP_API_KEY")),
            Err(other) => panic!("Expected configuration error, got {:?}", other),
            Ok(_) => panic!("Expected configuration error"),
        }
    }

    #[test]
    #[serial]
    fn test_from_env_reads_key_and_base_url() {
        unsafe {
            std::env::set_var(env::API_KEY, "env-key");
            std::env::set_var(env::BASE_URL, "http://127.0.0.1:9999/imagery");
        }

        let client = MapClient::from_env().unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9999/imagery");

        unsafe {
            std::env::remove_var(env::API_KEY);
            std::env::remove_var(env::BASE_URL);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_base_url() {
        unsafe {
            std::env::set_var(env::API_KEY, "env-key");
            std::env::remove_var(env::BASE_URL);
        }

        let client = MapClient::from_env().unwrap();
        assert_eq!(client.base_url().as_str(), urls::IMAGERY_MAP_BASE);

        unsafe {
            std::env::remove_var(env::API_KEY);
        }
    }
}
