//! Importing user pictures from `data:` URLs.

use crate::assets::{AssetError, LoadedImage};
use crate::data_url::{DataUrl, DataUrlError};
use crate::elements::{Element, ElementId, ElementKind, ElementTag, Placement};
use crate::scene::CardScene;
use kurbo::Point;
use thiserror::Error;

/// Default largest side of an imported picture.
pub const IMPORT_MAX_DIMENSION: f64 = 200.0;

/// Top-left corner imported pictures are anchored at.
pub const IMPORT_ORIGIN: Point = Point::new(100.0, 100.0);

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid image data: {0}")]
    DataUrl(#[from] DataUrlError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Decode an image data URL and add it to the scene.
///
/// The picture is scaled so neither side exceeds `max_dimension` and its
/// top-left corner sits at [`IMPORT_ORIGIN`].
pub fn import_data_url(scene: &mut CardScene, data_url: &str, max_dimension: f64) -> Result<ElementId, ImportError> {
    let decoded = DataUrl::parse(data_url)?;
    let image = LoadedImage::from_bytes("data:upload", decoded.data)?;
    let mut picture = image.into_picture();
    // A picture without a size is sized as if it were square.
    if picture.natural_width == 0 || picture.natural_height == 0 {
        picture.natural_width = picture.natural_width.max(1);
        picture.natural_height = picture.natural_height.max(1);
    }

    let scale = picture.scale_to_within(max_dimension);
    let center = Point::new(
        IMPORT_ORIGIN.x + picture.natural_width as f64 * scale / 2.0,
        IMPORT_ORIGIN.y + picture.natural_height as f64 * scale / 2.0,
    );
    let element = Element::new(ElementTag::Image, Placement::at(center).with_scale(scale), ElementKind::Picture(picture));
    let id = scene.add(element);
    scene.bring_to_front(id);
    log::info!("Imported picture at scale {scale:.3}");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::png_bytes;

    fn png_url(width: u32, height: u32) -> String {
        DataUrl::encode("image/png", &png_bytes(width, height))
    }

    #[test]
    fn test_square_import() {
        let mut scene = CardScene::new(800.0, 600.0);
        let id = import_data_url(&mut scene, &png_url(500, 500), IMPORT_MAX_DIMENSION).expect("import");
        let element = scene.get(id).expect("element");
        let bounds = element.bounds();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 200.0).abs() < 1e-9);
        assert!((bounds.x0 - 100.0).abs() < 1e-9);
        assert!((bounds.y0 - 100.0).abs() < 1e-9);
        assert_eq!(element.tag, ElementTag::Image);
        assert_eq!(scene.topmost(), Some(id));
    }

    #[test]
    fn test_wide_import_keeps_aspect() {
        let mut scene = CardScene::new(800.0, 600.0);
        let id = import_data_url(&mut scene, &png_url(400, 100), IMPORT_MAX_DIMENSION).expect("import");
        let bounds = scene.get(id).expect("element").bounds();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_image_is_upscaled() {
        let mut scene = CardScene::new(800.0, 600.0);
        let id = import_data_url(&mut scene, &png_url(50, 100), IMPORT_MAX_DIMENSION).expect("import");
        let bounds = scene.get(id).expect("element").bounds();
        assert!((bounds.height() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_input_leaves_scene() {
        let mut scene = CardScene::new(800.0, 600.0);
        assert!(matches!(
            import_data_url(&mut scene, "data:,", IMPORT_MAX_DIMENSION),
            Err(ImportError::DataUrl(DataUrlError::Empty))
        ));
        let gif = DataUrl::encode("image/gif", b"GIF89a");
        assert!(matches!(
            import_data_url(&mut scene, &gif, IMPORT_MAX_DIMENSION),
            Err(ImportError::Asset(_))
        ));
        assert!(scene.is_empty());
    }
}
