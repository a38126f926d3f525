use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::{GenericImageView, RgbaImage};
use log::debug;

use crate::AsciiError;

/// Natural pixel size of a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
}

/// A decoded source image, normalized to RGBA8.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pixels: RgbaImage,
    meta: ImageMeta,
}

impl DecodedImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self { pixels, meta: ImageMeta { width, height } }
    }

    /// Decodes an encoded image, guessing the format from its contents.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AsciiError> {
        let image = image::load_from_memory(bytes).map_err(AsciiError::Decode)?;
        Ok(Self::from_rgba(image.into_rgba8()))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AsciiError> {
        let image = image::open(path.as_ref()).map_err(AsciiError::Decode)?;
        let (width, height) = image.dimensions();
        debug!("decoded {} ({width}x{height})", path.as_ref().display());
        Ok(Self::from_rgba(image.into_rgba8()))
    }

    pub fn meta(&self) -> ImageMeta {
        self.meta
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decoded images keyed by the identifier of the source they came from.
///
/// Entries live until the owner of the source calls [`ImageCache::release`].
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, Arc<DecodedImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<DecodedImage>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: impl Into<String>, image: Arc<DecodedImage>) {
        self.entries.insert(key.into(), image);
    }

    /// Drops the image cached for `key`. Returns whether anything was evicted.
    pub fn release(&mut self, key: &str) -> bool {
        let evicted = self.entries.remove(key).is_some();
        if evicted {
            debug!("released cached image {key:?}");
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
