//! PNG encoding of rendered cards.

use crate::{RenderError, RenderResult};
use crate::card_image::CardImage;

/// Encode a rendered card as 8-bit straight-alpha RGBA PNG bytes.
pub fn encode_png(image: &CardImage) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(|e| {
            log::error!("Failed to write PNG header: {:?}", e);
            RenderError::Encode(e.to_string())
        })?;

        writer.write_image_data(&image.to_rgba8()).map_err(|e| {
            log::error!("Failed to write PNG data: {:?}", e);
            RenderError::Encode(e.to_string())
        })?;
    }

    Ok(png_data)
}
