//! Rendered card pixels.

use cardsmith_core::SerializableColor;
use kurbo::Rect;
use peniko::Color;
use peniko::color::PremulRgba8;
use vello_cpu::{Pixmap, RenderContext};

/// A rendered card, stored as premultiplied RGBA8.
pub struct CardImage {
    pixmap: Pixmap,
}

impl std::fmt::Debug for CardImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardImage")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl CardImage {
    /// Flush `ctx` into a new image of the same size.
    pub(crate) fn from_context(mut ctx: RenderContext, width: u16, height: u16) -> Self {
        let mut pixmap = Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Self { pixmap }
    }

    /// An image filled with a single color.
    pub fn solid(width: u16, height: u16, color: SerializableColor) -> Self {
        let mut ctx = RenderContext::new(width, height);
        ctx.set_paint(Color::from(color));
        ctx.fill_rect(&Rect::new(0.0, 0.0, width as f64, height as f64));
        Self::from_context(ctx, width, height)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height() as u32
    }

    /// Straight-alpha color at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<SerializableColor> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let index = (y * self.width() + x) as usize;
        self.pixmap.data().get(index).map(|p| unpremultiply(*p))
    }

    /// Straight-alpha RGBA8 bytes in row-major order.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .data()
            .iter()
            .flat_map(|p| {
                let c = unpremultiply(*p);
                [c.r, c.g, c.b, c.a]
            })
            .collect()
    }
}

fn unpremultiply(p: PremulRgba8) -> SerializableColor {
    if p.a == 0 {
        return SerializableColor::transparent();
    }
    let a = p.a as u32;
    let channel = |c: u8| ((c as u32 * 255 + a / 2) / a).min(255) as u8;
    SerializableColor::new(channel(p.r), channel(p.g), channel(p.b), p.a)
}

/// Premultiply decoded image pixels for use as a paint source.
pub(crate) fn premultiply(image: &image::RgbaImage) -> Vec<PremulRgba8> {
    image
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            let scale = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
            PremulRgba8 {
                r: scale(r),
                g: scale(g),
                b: scale(b),
                a,
            }
        })
        .collect()
}
