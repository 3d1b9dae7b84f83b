// ABOUTME: Map request parameters, input normalization, and URL construction
// ABOUTME: Also defines the preset cities and key redaction for log-safe URLs

use crate::constants::request::{DEFAULT_CITY, DEFAULT_HEIGHT, DEFAULT_WIDTH, DIMENSION_FLOOR};
use crate::error::MapError;
use secrecy::{ExposeSecret, SecretString};
use url::{form_urlencoded, Url};

/// A normalized static map request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapRequest {
    city: String,
    width: u32,
    height: u32,
}

impl MapRequest {
    /// Build a request, substituting defaults for an empty city and for
    /// each dimension at or below the floor.
    pub fn new(city: &str, requested_width: i32, requested_height: i32) -> Self {
        Self {
            city: normalize_city(city).to_string(),
            width: normalize_dimension(requested_width, DEFAULT_WIDTH),
            height: normalize_dimension(requested_height, DEFAULT_HEIGHT),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `{base}/{city}?mapSize={width},{height}&key={api_key}`
    pub fn url(&self, base_url: &Url, api_key: &SecretString) -> Result<Url, MapError> {
        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MapError::Configuration(format!("Base URL cannot take a path: {}", base_url))
            })?
            .pop_if_empty()
            .push(&self.city);

        let key: String =
            form_urlencoded::byte_serialize(api_key.expose_secret().as_bytes()).collect();
        url.set_query(Some(&format!(
            "mapSize={},{}&key={}",
            self.width, self.height, key
        )));
        Ok(url)
    }
}

/// City name actually requested for `city`
pub fn normalize_city(city: &str) -> &str {
    if city.trim().is_empty() {
        DEFAULT_CITY
    } else {
        city
    }
}

fn normalize_dimension(requested: i32, default: u32) -> u32 {
    u32::try_from(requested)
        .ok()
        .filter(|&dimension| dimension > DIMENSION_FLOOR)
        .unwrap_or(default)
}

/// The cities offered by the sample map viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapPreset {
    Seattle,
    Portland,
    SanFrancisco,
}

impl MapPreset {
    pub const ALL: [MapPreset; 3] = [
        MapPreset::Seattle,
        MapPreset::Portland,
        MapPreset::SanFrancisco,
    ];

    pub fn city(self) -> &'static str {
        match self {
            MapPreset::Seattle => "Seattle",
            MapPreset::Portland => "Portland",
            MapPreset::SanFrancisco => "San Francisco",
        }
    }

    /// Requested (width, height) in pixels
    pub fn size(self) -> (i32, i32) {
        match self {
            MapPreset::Seattle => (800, 500),
            MapPreset::Portland => (600, 600),
            MapPreset::SanFrancisco => (500, 400),
        }
    }

    pub fn request(self) -> MapRequest {
        let (width, height) = self.size();
        MapRequest::new(self.city(), width, height)
    }
}

/// Replace the value of every `key=` query parameter in `text` with `***`.
///
/// Works on full URLs and on error messages that embed one.
pub fn redact_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = find_key_param(rest) {
        let value_start = pos + "key=".len();
        out.push_str(&rest[..value_start]);
        let value_len = rest[value_start..]
            .find(|c: char| matches!(c, '&' | '#' | ' ' | ')' | '"' | '\''))
            .unwrap_or(rest.len() - value_start);
        if value_len > 0 {
            out.push_str("***");
        }
        rest = &rest[value_start + value_len..];
    }

    out.push_str(rest);
    out
}

fn find_key_param(text: &str) -> Option<usize> {
    text.match_indices("key=")
        .find(|(pos, _)| *pos > 0 && matches!(text.as_bytes()[pos - 1], b'?' | b'&'))
        .map(|(pos, _)| pos)
}
