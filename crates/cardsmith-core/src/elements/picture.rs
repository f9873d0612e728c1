//! Raster pictures: stamps, stickers, backgrounds and imported images.

use super::LocalGeometry;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from a MIME type such as `image/png`.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A raster image drawn at its natural size, centered on its placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    /// Asset path or `data:` origin the pixels came from.
    pub source: String,
    pub natural_width: u32,
    pub natural_height: u32,
    pub format: ImageFormat,
    /// Encoded image bytes as base64 so snapshots stay plain JSON.
    pub data_base64: String,
}

impl Picture {
    pub fn new(
        source: impl Into<String>,
        data: &[u8],
        natural_width: u32,
        natural_height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            source: source.into(),
            natural_width,
            natural_height,
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Decode the stored image bytes.
    pub fn data(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data_base64)
    }

    /// Uniform scale that makes the larger side equal `size`.
    pub fn scale_to_fit(&self, size: f64) -> f64 {
        let larger = self.natural_width.max(self.natural_height) as f64;
        if larger <= 0.0 { 0.0 } else { size / larger }
    }

    /// Uniform scale so that the picture covers a `width` x `height` area.
    pub fn scale_to_cover(&self, width: f64, height: f64) -> f64 {
        let (iw, ih) = (self.natural_width as f64, self.natural_height as f64);
        if iw <= 0.0 || ih <= 0.0 {
            return 0.0;
        }
        (width / iw).max(height / ih)
    }

    /// Uniform scale so that neither side exceeds `max` (never zero-divides).
    pub fn scale_to_within(&self, max: f64) -> f64 {
        let (iw, ih) = (self.natural_width as f64, self.natural_height as f64);
        if iw <= 0.0 || ih <= 0.0 {
            return 0.0;
        }
        (max / iw).min(max / ih)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data_base64)
    }
}

impl LocalGeometry for Picture {
    fn local_bounds(&self) -> Rect {
        let (w, h) = (self.natural_width as f64, self.natural_height as f64);
        Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
    }

    fn hit_local(&self, point: Point, tolerance: f64) -> bool {
        self.local_bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn local_path(&self) -> BezPath {
        self.local_bounds().to_path(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(w: u32, h: u32) -> Picture {
        Picture::new("/stamps/test.png", &[0x89, 0x50, 0x4E, 0x47], w, h, ImageFormat::Png)
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF8"), None);
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime_type("image/webp"), Some(ImageFormat::WebP));
    }

    #[test]
    fn test_scales() {
        let p = picture(400, 200);
        assert!((p.scale_to_fit(100.0) - 0.25).abs() < f64::EPSILON);
        assert!((p.scale_to_cover(800.0, 600.0) - 3.0).abs() < f64::EPSILON);
        assert!((p.scale_to_within(200.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(picture(0, 0).scale_to_fit(100.0), 0.0);
    }

    #[test]
    fn test_data_roundtrip() {
        let p = picture(1, 1);
        assert_eq!(p.data().ok(), Some(vec![0x89, 0x50, 0x4E, 0x47]));
        assert!(p.data_url().starts_with("data:image/png;base64,"));
    }
}
