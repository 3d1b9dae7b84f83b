// ABOUTME: Caller-owned in-memory cache of decoded maps keyed by city
// ABOUTME: Empty slots are reserved or failed cities that get fetched on next use

use crate::bitmap::DecodedImage;
use crate::client::MapClient;
use crate::request::{normalize_city, MapPreset};
use std::collections::HashMap;

/// Decoded maps held by the presentation layer between repaints.
///
/// Keys are normalized city names, so `""` and `"Seattle"` share a slot.
#[derive(Debug, Default)]
pub struct MapCache {
    entries: HashMap<String, Option<DecodedImage>>,
}

impl MapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache with an empty slot for each preset city
    pub fn with_presets() -> Self {
        let mut cache = Self::new();
        for preset in MapPreset::ALL {
            cache.reserve(preset.city());
        }
        cache
    }

    /// Add an empty slot for `city` if it has none
    pub fn reserve(&mut self, city: &str) {
        self.entries
            .entry(normalize_city(city).to_string())
            .or_insert(None);
    }

    pub fn get(&self, city: &str) -> Option<&DecodedImage> {
        self.entries.get(normalize_city(city))?.as_ref()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.get(city).is_some()
    }

    /// Store `image` for `city`, returning the image it replaced
    pub fn insert(&mut self, city: &str, image: DecodedImage) -> Option<DecodedImage> {
        self.entries
            .insert(normalize_city(city).to_string(), Some(image))
            .flatten()
    }

    /// Remove the image for `city`, leaving its slot empty
    pub fn take(&mut self, city: &str) -> Option<DecodedImage> {
        self.entries.get_mut(normalize_city(city))?.take()
    }

    /// Return the cached image for `city`, or load and cache it.
    ///
    /// A failed load leaves the slot empty so the next call tries again.
    pub fn get_or_insert_with<F, E>(&mut self, city: &str, load: F) -> Result<&DecodedImage, E>
    where
        F: FnOnce(&str) -> Result<DecodedImage, E>,
    {
        let city = normalize_city(city);
        let slot = self.entries.entry(city.to_string()).or_default();
        let image = match slot.take() {
            Some(image) => image,
            None => load(city)?,
        };
        Ok(slot.insert(image))
    }

    /// `get_or_insert_with` backed by `client.get_map`
    pub fn get_or_fetch(
        &mut self,
        client: &MapClient,
        city: &str,
        requested_width: i32,
        requested_height: i32,
    ) -> crate::Result<&DecodedImage> {
        self.get_or_insert_with(city, |city| {
            log::debug!("Map cache miss for {}", city);
            client.get_map(city, requested_width, requested_height)
        })
    }

    /// `get_or_fetch` with the preset's city and size
    pub fn get_or_fetch_preset(
        &mut self,
        client: &MapClient,
        preset: MapPreset,
    ) -> crate::Result<&DecodedImage> {
        let (width, height) = preset.size();
        self.get_or_fetch(client, preset.city(), width, height)
    }

    /// Number of cities with a loaded image
    pub fn len(&self) -> usize {
        self.entries.values().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every image and forget every slot
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
