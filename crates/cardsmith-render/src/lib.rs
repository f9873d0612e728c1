//! Cardsmith Render Library
//!
//! CPU rendering of card scenes with `vello_cpu`, and PNG export.

mod card_image;
mod encode;
mod fonts;
mod rasterizer;

pub use card_image::CardImage;
pub use encode::encode_png;
pub use fonts::FontBook;
pub use rasterizer::SoftwareRasterizer;

use thiserror::Error;

/// Render errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid font data for {0}")]
    InvalidFont(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
