//! Decorative asset library and image loading.

use crate::elements::{ImageFormat, Picture, SerializableColor};
use crate::scene::BoxFuture;
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

/// Asset loading errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Could not decode {source_path}: {message}")]
    Decode { source_path: String, message: String },
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Encoded image bytes plus the dimensions read from their header.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl LoadedImage {
    /// Detect the format and read dimensions from encoded bytes.
    pub fn from_bytes(source: impl Into<String>, data: Vec<u8>) -> AssetResult<Self> {
        let source = source.into();
        let format = ImageFormat::from_magic_bytes(&data)
            .ok_or_else(|| AssetError::UnsupportedFormat(source.clone()))?;
        let (width, height) = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| AssetError::Io(e.to_string()))?
            .into_dimensions()
            .map_err(|e| AssetError::Decode {
                source_path: source.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            source,
            width,
            height,
            format,
            data,
        })
    }

    pub fn into_picture(self) -> Picture {
        Picture::new(self.source, &self.data, self.width, self.height, self.format)
    }
}

/// Source of image assets, addressed by their library path.
///
/// Loads are asynchronous and may fail; callers log and skip failures.
pub trait AssetLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<LoadedImage>>;
}

/// In-memory asset loader, mostly for tests and embedded asset packs.
#[derive(Debug, Default)]
pub struct MemoryAssetLoader {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.images.insert(path.into(), data);
    }

    pub fn with(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<LoadedImage>> {
        Box::pin(async move {
            let data = self
                .images
                .get(path)
                .cloned()
                .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
            LoadedImage::from_bytes(path, data)
        })
    }
}

impl<L: AssetLoader + ?Sized> AssetLoader for std::rc::Rc<L> {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<LoadedImage>> {
        (**self).load(path)
    }
}

/// A background picture and the caption colors that read well on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundAsset {
    pub path: &'static str,
    pub text_colors: [&'static str; 3],
}

impl BackgroundAsset {
    pub fn text_color(&self, index: usize) -> SerializableColor {
        self.text_colors
            .get(index)
            .and_then(|hex| SerializableColor::from_hex(hex))
            .unwrap_or(SerializableColor::white())
    }
}

pub const BACKGROUNDS: [BackgroundAsset; 8] = [
    BackgroundAsset { path: "/backgrounds/Party.png", text_colors: ["#ffffff", "#ffd700", "#00ffff"] },
    BackgroundAsset { path: "/backgrounds/Pink-Heart-Clouds.png", text_colors: ["#4a0080", "#ff1493", "#ffffff"] },
    BackgroundAsset { path: "/backgrounds/Rainbow-Cloud.png", text_colors: ["#ff1493", "#4a0080", "#ffffff"] },
    BackgroundAsset { path: "/backgrounds/Glam.png", text_colors: ["#ffd700", "#ffffff", "#00ffff"] },
    BackgroundAsset { path: "/backgrounds/Purple.png", text_colors: ["#ffd700", "#ffffff", "#ff69b4"] },
    BackgroundAsset { path: "/backgrounds/Rosey-Wallpaper.png", text_colors: ["#4a0080", "#c71585", "#ffffff"] },
    BackgroundAsset { path: "/backgrounds/rainbow.png", text_colors: ["#ffffff", "#ff1493", "#4a0080"] },
    BackgroundAsset { path: "/backgrounds/barbie.png", text_colors: ["#ffffff", "#ffd700", "#ff69b4"] },
];

pub const BALLOONS: [&str; 15] = [
    "/images/decorations/balloons.png",
    "/images/decorations/balloons-2.png",
    "/images/decorations/balloons-3.png",
    "/images/decorations/balloons-4.png",
    "/images/decorations/balloons-5.png",
    "/images/decorations/balloons-6.png",
    "/images/decorations/balloons-7.png",
    "/images/decorations/balloons-8.png",
    "/images/decorations/balloons-9.png",
    "/images/decorations/balloons-10.png",
    "/images/decorations/balloons-11.png",
    "/images/decorations/balloons-12.png",
    "/images/decorations/balloons-13.png",
    "/images/decorations/blue-balloon.png",
    "/images/decorations/flower-balloon.png",
];

pub const DECORATIONS: [&str; 5] = [
    "/images/decorations/party-hat.png",
    "/images/decorations/present.png",
    "/images/decorations/candle.png",
    "/images/decorations/airhorn.png",
    "/images/decorations/bday-cake.png",
];

pub const CHARACTERS: [&str; 20] = [
    "/images/characters/hello-kitty.png",
    "/images/characters/my-melody.png",
    "/images/characters/barbie-1.png",
    "/images/characters/barbie-2.png",
    "/images/characters/barbie-3.png",
    "/images/characters/barbie-4.png",
    "/images/characters/barbie-5.png",
    "/images/characters/barbie-6.png",
    "/images/characters/barbie-7.png",
    "/images/characters/shortcake1.png",
    "/images/characters/shortcake2.png",
    "/images/characters/strawberry-shortcake.png",
    "/images/characters/grimace.png",
    "/images/characters/spongebob.png",
    "/images/characters/patrick.png",
    "/images/characters/shrek.png",
    "/images/characters/fiona.png",
    "/images/characters/donkey.png",
    "/images/characters/puss.png",
    "/images/characters/gummybear.png",
];

pub const CAKES: [&str; 8] = [
    "/images/cake-food/cake.png",
    "/images/cake-food/cake01.png",
    "/images/cake-food/cake02.png",
    "/images/cake-food/cupcake.png",
    "/images/cake-food/brat-cake.png",
    "/images/cake-food/chocolate-cake.png",
    "/images/cake-food/flan.png",
    "/images/cake-food/pancake.png",
];

pub const STAMPS: [&str; 30] = [
    "/stamps/kidpix-spritesheet-0-1.png",
    "/stamps/kidpix-spritesheet-0-2.png",
    "/stamps/kidpix-spritesheet-0-3.png",
    "/stamps/kidpix-spritesheet-0-4.png",
    "/stamps/kidpix-spritesheet-0-5.png",
    "/stamps/kidpix-spritesheet-0-6.png",
    "/stamps/kidpix-spritesheet-0-7.png",
    "/stamps/kidpix-spritesheet-0-8.png",
    "/stamps/kidpix-spritesheet-0-9.png",
    "/stamps/kidpix-spritesheet-0-10.png",
    "/stamps/kidpix-spritesheet-0-11.png",
    "/stamps/kidpix-spritesheet-0-12.png",
    "/stamps/kidpix-spritesheet-0-13.png",
    "/stamps/kidpix-spritesheet-0-14.png",
    "/stamps/kidpix-spritesheet-0-15.png",
    "/stamps/kidpix-spritesheet-0-21.png",
    "/stamps/kidpix-spritesheet-0-22.png",
    "/stamps/kidpix-spritesheet-0-23.png",
    "/stamps/kidpix-spritesheet-0-24.png",
    "/stamps/kidpix-spritesheet-0-25.png",
    "/stamps/kidpix-spritesheet-0-30.png",
    "/stamps/kidpix-spritesheet-0-31.png",
    "/stamps/kidpix-spritesheet-0-32.png",
    "/stamps/kidpix-spritesheet-0-40.png",
    "/stamps/kidpix-spritesheet-0-50.png",
    "/stamps/kidpix-spritesheet-0-60.png",
    "/stamps/kidpix-spritesheet-0-70.png",
    "/stamps/kidpix-spritesheet-0-80.png",
    "/stamps/kidpix-spritesheet-0-90.png",
    "/stamps/kidpix-spritesheet-0-100.png",
];

/// Captions the random design picks from.
pub const CAPTIONS: [&str; 6] = [
    "Happy Birthday!",
    "Happy 30th!",
    "Dirty 30!",
    "30 & Fabulous!",
    "Cheers to 30!",
    "Forever 21 + 9",
];

/// Quick-add phrases offered next to the text tool.
pub const SPECIAL_TEXTS: [&str; 3] = ["Happy 30th!", "Dirty 30!", "Forever 21 + 9"];

/// Every distinct asset path in the library.
pub fn all_paths() -> impl Iterator<Item = &'static str> {
    BACKGROUNDS
        .iter()
        .map(|b| b.path)
        .chain(BALLOONS)
        .chain(DECORATIONS)
        .chain(CHARACTERS)
        .chain(CAKES)
        .chain(STAMPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::png_bytes;
    use std::collections::HashSet;

    #[test]
    fn test_library_sizes() {
        assert_eq!(BACKGROUNDS.len(), 8);
        assert_eq!(BALLOONS.len(), 15);
        assert_eq!(DECORATIONS.len(), 5);
        assert_eq!(CHARACTERS.len(), 20);
        assert_eq!(CAKES.len(), 8);
        assert_eq!(STAMPS.len(), 30);
        let unique: HashSet<_> = all_paths().collect();
        assert_eq!(unique.len(), 8 + 15 + 5 + 20 + 8 + 30);
    }

    #[test]
    fn test_text_colors_parse() {
        for bg in BACKGROUNDS {
            for hex in bg.text_colors {
                assert!(SerializableColor::from_hex(hex).is_some(), "{hex}");
            }
        }
        assert_eq!(BACKGROUNDS[1].text_color(0).to_hex(), "#4a0080");
    }

    #[test]
    fn test_reads_png_header() {
        let loaded = LoadedImage::from_bytes("/stamps/a.png", png_bytes(7, 3)).expect("header");
        assert_eq!((loaded.width, loaded.height), (7, 3));
        assert_eq!(loaded.format, ImageFormat::Png);
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = LoadedImage::from_bytes("/x.gif", b"GIF89a....".to_vec());
        assert!(matches!(result, Err(AssetError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryAssetLoader::new().with("/images/cake-food/cake.png", png_bytes(4, 4));
        let loaded = pollster::block_on(loader.load("/images/cake-food/cake.png")).expect("load");
        assert_eq!(loaded.width, 4);
        let missing = pollster::block_on(loader.load("/nope.png"));
        assert!(matches!(missing, Err(AssetError::NotFound(_))));
    }
}
