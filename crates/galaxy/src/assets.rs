//! Memory images, decoded once and downscaled for half-block display.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{RgbImage, imageops::FilterType};

/// Decoded images are capped to this many pixels per side.
const MAX_SOURCE_SIDE: u32 = 256;

/// Cache of decoded images keyed by path.
///
/// Failed loads are cached too, so a missing file is reported once.
#[derive(Debug, Default)]
pub struct ImageCache {
    sources: HashMap<PathBuf, Option<RgbImage>>,
    fitted: HashMap<(PathBuf, u32, u32), RgbImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn source(&mut self, path: &Path) -> Option<&RgbImage> {
        self.sources
            .entry(path.to_path_buf())
            .or_insert_with(|| load(path))
            .as_ref()
    }

    /// The image at `path` scaled to fit within `width` x `height` pixels,
    /// keeping its aspect ratio. `None` if it cannot be loaded.
    pub fn fitted(&mut self, path: &Path, width: u32, height: u32) -> Option<&RgbImage> {
        if width == 0 || height == 0 {
            return None;
        }
        let key = (path.to_path_buf(), width, height);
        if !self.fitted.contains_key(&key) {
            let source = self.source(path)?;
            let scale = (width as f32 / source.width() as f32)
                .min(height as f32 / source.height() as f32);
            let w = ((source.width() as f32 * scale).round() as u32).clamp(1, width);
            let h = ((source.height() as f32 * scale).round() as u32).clamp(1, height);
            let image = image::imageops::resize(source, w, h, FilterType::Triangle);
            self.fitted.insert(key.clone(), image);
        }
        self.fitted.get(&key)
    }
}

fn load(path: &Path) -> Option<RgbImage> {
    match image::open(path) {
        Ok(image) => {
            let image = if image.width() > MAX_SOURCE_SIDE || image.height() > MAX_SOURCE_SIDE {
                image.thumbnail(MAX_SOURCE_SIDE, MAX_SOURCE_SIDE)
            } else {
                image
            };
            log::debug!(
                "loaded {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            Some(image.to_rgb8())
        }
        Err(err) => {
            log::warn!("could not load image {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("galaxy-{}-{name}", std::process::id()));
        let image = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_fitted_keeps_aspect() {
        let path = write_png("wide.png", 40, 20);
        let mut cache = ImageCache::new();

        let fitted = cache.fitted(&path, 20, 20).unwrap();
        assert_eq!(fitted.dimensions(), (20, 10));
        assert_eq!(fitted.get_pixel(0, 0), &image::Rgb([255, 0, 0]));
        assert_eq!(fitted.get_pixel(19, 9), &image::Rgb([0, 0, 255]));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_image_is_none() {
        let path = Path::new("/definitely/not/here.jpeg");
        let mut cache = ImageCache::new();
        assert!(cache.fitted(path, 10, 10).is_none());
        assert!(cache.fitted(path, 20, 20).is_none());
        assert_eq!(cache.sources.len(), 1);
    }

    #[test]
    fn test_zero_area_is_none() {
        let path = write_png("zero.png", 4, 4);
        let mut cache = ImageCache::new();
        assert!(cache.fitted(&path, 0, 10).is_none());
        assert!(cache.sources.is_empty());
        std::fs::remove_file(path).unwrap();
    }
}
