//! Shared helpers for integration tests.

#![allow(dead_code)]

use cardsmith_core::MemoryAssetLoader;
use cardsmith_core::assets::all_paths;
use std::io::Cursor;

/// Encode a solid PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 20, 147, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

/// A loader with a small picture behind every library path.
pub fn library_loader() -> MemoryAssetLoader {
    let mut loader = MemoryAssetLoader::new();
    for path in all_paths() {
        let (w, h) = if path.starts_with("/backgrounds/") { (80, 60) } else { (20, 30) };
        loader.insert(path, png_bytes(w, h));
    }
    loader
}
