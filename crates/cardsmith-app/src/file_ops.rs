//! Filesystem-backed asset loading, card saving and font discovery.

use cardsmith_core::elements::CardFont;
use cardsmith_core::{AssetError, AssetLoader, AssetResult, BoxFuture, CardSink, ExportError, LoadedImage};
use cardsmith_render::{FontBook, RenderError};
use std::path::{Component, Path, PathBuf};

/// Loads library assets (`/stamps/cat.png`, ...) from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryAssetLoader {
    root: PathBuf,
}

impl DirectoryAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a library path under the root. Paths escaping the root resolve to nothing.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl AssetLoader for DirectoryAssetLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<LoadedImage>> {
        Box::pin(async move {
            let file = self
                .resolve(path)
                .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
            let data = std::fs::read(&file).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AssetError::NotFound(path.to_string()),
                _ => AssetError::Io(format!("{}: {}", file.display(), e)),
            })?;
            log::debug!("Loaded {} ({} bytes)", path, data.len());
            LoadedImage::from_bytes(path, data)
        })
    }
}

/// Writes exported cards into an output directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CardSink for FileSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let sink_error = |e: std::io::Error| ExportError::Sink {
            filename: filename.to_string(),
            message: e.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(sink_error)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(sink_error)?;
        log::info!("Saved card to: {:?}", path);
        Ok(())
    }
}

/// Register `<name>.ttf` or `<name>.otf` for every card font found in `dir`.
pub fn load_fonts(dir: &Path) -> Result<FontBook, RenderError> {
    let mut book = FontBook::new();
    for font in CardFont::ALL {
        let found = ["ttf", "otf"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", font.name(), ext)))
            .find(|path| path.is_file());
        let Some(path) = found else {
            log::warn!("No font file for {} in {:?}", font.family(), dir);
            continue;
        };
        match std::fs::read(&path) {
            Ok(bytes) => book.register(font, bytes)?,
            Err(e) => log::warn!("Failed to read font {:?}: {}", path, e),
        }
    }
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsmith_core::SerializableColor;
    use cardsmith_render::{CardImage, encode_png};

    fn png(width: u16, height: u16) -> Vec<u8> {
        encode_png(&CardImage::solid(width, height, SerializableColor::white())).expect("encode")
    }

    #[test]
    fn test_loads_library_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("stamps")).expect("mkdir");
        std::fs::write(dir.path().join("stamps/cat.png"), png(6, 4)).expect("write");

        let loader = DirectoryAssetLoader::new(dir.path());
        let image = pollster::block_on(loader.load("/stamps/cat.png")).expect("load");
        assert_eq!((image.width, image.height), (6, 4));
        assert_eq!(image.source, "/stamps/cat.png");
    }

    #[test]
    fn test_missing_and_escaping_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = DirectoryAssetLoader::new(dir.path());
        assert!(matches!(
            pollster::block_on(loader.load("/stamps/none.png")),
            Err(AssetError::NotFound(_))
        ));
        assert!(matches!(
            pollster::block_on(loader.load("/../secret.png")),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_non_image_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("notes.png"), b"hello").expect("write");
        let loader = DirectoryAssetLoader::new(dir.path());
        assert!(matches!(
            pollster::block_on(loader.load("/notes.png")),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_sink_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("cards/today");
        let sink = FileSink::new(&out);
        sink.save("card-1.png", b"png").expect("save");
        assert_eq!(std::fs::read(out.join("card-1.png")).expect("read"), b"png");
    }

    #[test]
    fn test_sink_error_names_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").expect("write");
        let sink = FileSink::new(&blocker);
        match sink.save("card.png", b"png") {
            Err(ExportError::Sink { filename, .. }) => assert_eq!(filename, "card.png"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_fonts_missing_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let book = load_fonts(dir.path()).expect("fonts");
        assert!(book.is_empty());
    }

    #[test]
    fn test_invalid_font_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("bubble.ttf"), b"garbage").expect("write");
        assert!(matches!(load_fonts(dir.path()), Err(RenderError::InvalidFont(_))));
    }
}
