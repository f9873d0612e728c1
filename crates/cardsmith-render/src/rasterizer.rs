//! CPU renderer that turns a card scene into a PNG data URL.

use cardsmith_core::elements::{Backdrop, Figure, LineCap, LineJoin, Picture, Stroke, Text};
use cardsmith_core::fill::TilePaint;
use cardsmith_core::{
    CardScene, DataUrl, EMPTY_DATA_URL, Element, ElementId, ElementKind, ExportError, Rasterizer, SerializableColor,
};
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape as KurboShape};
use peniko::{Color, ImageQuality, ImageSampler};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use vello_cpu::{Image, ImageSource, Pixmap, RenderContext};

use crate::card_image::{CardImage, premultiply};
use crate::encode::encode_png;
use crate::fonts::FontBook;

/// Gray drawn where a picture fails to decode.
const PLACEHOLDER_COLOR: SerializableColor = SerializableColor::new(200, 200, 200, 255);

/// CPU renderer for card scenes.
#[derive(Default)]
pub struct SoftwareRasterizer {
    fonts: FontBook,
    /// Decoded pictures keyed by element id.
    images: RefCell<HashMap<ElementId, Arc<Pixmap>>>,
}

impl std::fmt::Debug for SoftwareRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareRasterizer")
            .field("fonts", &self.fonts)
            .field("cached_images", &self.images.borrow().len())
            .finish()
    }
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontBook) -> Self {
        Self {
            fonts,
            images: RefCell::default(),
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Render the scene at `multiplier` times its size.
    ///
    /// Returns `None` when the output would have no pixels or exceeds the
    /// largest supported size.
    pub fn render(&self, scene: &CardScene, multiplier: f64) -> Option<CardImage> {
        if multiplier.is_nan() || multiplier <= 0.0 {
            return None;
        }
        let width = (scene.width() * multiplier).round();
        let height = (scene.height() * multiplier).round();
        if width < 1.0 || height < 1.0 {
            return None;
        }
        if width > u16::MAX as f64 || height > u16::MAX as f64 {
            log::warn!("Card too large to render: {}x{}", width, height);
            return None;
        }
        let (width, height) = (width as u16, height as u16);

        self.images.borrow_mut().retain(|id, _| scene.contains(*id));

        let mut ctx = RenderContext::new(width, height);
        ctx.set_paint(Color::from(scene.background()));
        ctx.fill_rect(&Rect::new(0.0, 0.0, width as f64, height as f64));
        let view = Affine::scale(multiplier);
        for element in scene.elements_ordered() {
            self.draw_element(&mut ctx, element, view);
        }
        log::debug!("Rendered {} elements at {}x{}", scene.len(), width, height);
        Some(CardImage::from_context(ctx, width, height))
    }

    fn draw_element(&self, ctx: &mut RenderContext, element: &Element, view: Affine) {
        let opacity = element.opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let layered = opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(opacity as f32);
        }

        let transform = view * element.placement.affine();
        ctx.set_transform(transform);
        match &element.kind {
            ElementKind::Stroke(stroke) => draw_stroke(ctx, stroke),
            ElementKind::Figure(figure) => draw_figure(ctx, figure),
            ElementKind::Text(text) => self.draw_text(ctx, text, transform),
            ElementKind::Picture(picture) => self.draw_picture(ctx, element.id(), picture, transform),
            ElementKind::Backdrop(backdrop) => draw_backdrop(ctx, backdrop, transform),
        }

        if layered {
            ctx.pop_layer();
        }
        ctx.reset_transform();
    }

    fn draw_text(&self, ctx: &mut RenderContext, text: &Text, transform: Affine) {
        let Some(glyphs) = self.fonts.layout(text) else {
            log::warn!("No font registered for {}; skipping text", text.font.family());
            return;
        };

        if let Some(shadow) = text.shadow {
            ctx.set_transform(transform * Affine::translate((shadow.offset_x, shadow.offset_y)));
            ctx.set_paint(Color::from(shadow.color));
            ctx.fill_path(&glyphs);
            ctx.set_transform(transform);
        }
        ctx.set_paint(Color::from(text.fill));
        ctx.fill_path(&glyphs);
        if let Some(outline) = text.outline {
            ctx.set_stroke(kurbo::Stroke::new(outline.width).with_join(Join::Round));
            ctx.set_paint(Color::from(outline.color));
            ctx.stroke_path(&glyphs);
        }
    }

    fn decoded(&self, id: ElementId, picture: &Picture) -> Option<Arc<Pixmap>> {
        if let Some(cached) = self.images.borrow().get(&id) {
            return Some(cached.clone());
        }
        let bytes = match picture.data() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Picture {} has invalid base64: {}", picture.source, e);
                return None;
            }
        };
        let rgba = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(e) => {
                log::warn!("Failed to decode picture {}: {}", picture.source, e);
                return None;
            }
        };
        let (Ok(width), Ok(height)) = (u16::try_from(rgba.width()), u16::try_from(rgba.height())) else {
            log::warn!("Picture {} is too large: {:?}", picture.source, rgba.dimensions());
            return None;
        };
        if width == 0 || height == 0 {
            return None;
        }
        let pixmap = Arc::new(Pixmap::from_parts(premultiply(&rgba), width, height));
        self.images.borrow_mut().insert(id, pixmap.clone());
        Some(pixmap)
    }

    fn draw_picture(&self, ctx: &mut RenderContext, id: ElementId, picture: &Picture, transform: Affine) {
        let (nw, nh) = (picture.natural_width as f64, picture.natural_height as f64);
        let local = Rect::new(-nw / 2.0, -nh / 2.0, nw / 2.0, nh / 2.0);
        let Some(pixmap) = self.decoded(id, picture) else {
            ctx.set_paint(Color::from(PLACEHOLDER_COLOR));
            ctx.fill_rect(&local);
            return;
        };
        if transform.determinant().abs() < f64::EPSILON {
            return;
        }

        // Map image pixels onto the picture's natural size.
        let (iw, ih) = (pixmap.width() as f64, pixmap.height() as f64);
        ctx.set_transform(
            transform * Affine::translate((local.x0, local.y0)) * Affine::scale_non_uniform(nw / iw, nh / ih),
        );
        ctx.set_paint(Image {
            image: ImageSource::Pixmap(pixmap),
            sampler: ImageSampler {
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        });
        ctx.fill_rect(&Rect::new(0.0, 0.0, iw, ih));
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn to_data_url(&self, scene: &CardScene, multiplier: f64) -> Result<String, ExportError> {
        let Some(image) = self.render(scene, multiplier) else {
            return Ok(EMPTY_DATA_URL.to_string());
        };
        let png = encode_png(&image).map_err(|e| ExportError::Render(e.to_string()))?;
        Ok(DataUrl::encode("image/png", &png))
    }
}

fn cap(cap: LineCap) -> Cap {
    match cap {
        LineCap::Round => Cap::Round,
        LineCap::Square => Cap::Square,
    }
}

fn join(join: LineJoin) -> Join {
    match join {
        LineJoin::Round => Join::Round,
        LineJoin::Miter => Join::Miter,
    }
}

fn draw_stroke(ctx: &mut RenderContext, stroke: &Stroke) {
    let brush = stroke.brush;
    ctx.set_paint(Color::from(brush.color));
    if brush.spray {
        for dot in stroke.spray_dots() {
            ctx.fill_path(&dot.to_path(0.1));
        }
        return;
    }

    match stroke.points.as_slice() {
        [] => {}
        [only] => match brush.cap {
            LineCap::Round => ctx.fill_path(&kurbo::Circle::new(*only, brush.width / 2.0).to_path(0.1)),
            LineCap::Square => ctx.fill_rect(&Rect::from_center_size(*only, (brush.width, brush.width))),
        },
        [first, rest @ ..] => {
            let mut path = BezPath::new();
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
            ctx.set_stroke(
                kurbo::Stroke::new(brush.width)
                    .with_caps(cap(brush.cap))
                    .with_join(join(brush.join)),
            );
            ctx.stroke_path(&path);
        }
    }
}

fn draw_figure(ctx: &mut RenderContext, figure: &Figure) {
    let path = figure.shape.path(figure.size);
    ctx.set_paint(Color::from(figure.fill));
    ctx.fill_path(&path);
    if let Some(outline) = figure.outline {
        ctx.set_stroke(kurbo::Stroke::new(outline.width).with_join(Join::Round));
        ctx.set_paint(Color::from(outline.color));
        ctx.stroke_path(&path);
    }
}

/// Paint the base color, then repeat the pattern marks in clipped tiles.
fn draw_backdrop(ctx: &mut RenderContext, backdrop: &Backdrop, transform: Affine) {
    let local = Rect::new(
        -backdrop.width / 2.0,
        -backdrop.height / 2.0,
        backdrop.width / 2.0,
        backdrop.height / 2.0,
    );
    let tile = backdrop.tile();
    ctx.set_paint(Color::from(tile.base));
    ctx.fill_rect(&local);
    if tile.marks.is_empty() || tile.size <= 0.0 {
        return;
    }

    let columns = (backdrop.width / tile.size).ceil() as usize;
    let rows = (backdrop.height / tile.size).ceil() as usize;
    for row in 0..rows {
        for column in 0..columns {
            let origin = Point::new(local.x0 + column as f64 * tile.size, local.y0 + row as f64 * tile.size);
            let clip = Rect::from_origin_size(origin, (tile.size, tile.size)).intersect(local);
            ctx.set_transform(transform);
            ctx.push_clip_layer(&clip.to_path(0.1));
            ctx.set_transform(transform * Affine::translate(origin.to_vec2()));
            for mark in &tile.marks {
                match mark.paint {
                    TilePaint::Fill(color) => {
                        ctx.set_paint(Color::from(color));
                        ctx.fill_path(&mark.path);
                    }
                    TilePaint::Stroke { color, width } => {
                        ctx.set_stroke(kurbo::Stroke::new(width).with_caps(Cap::Butt));
                        ctx.set_paint(Color::from(color));
                        ctx.stroke_path(&mark.path);
                    }
                }
            }
            ctx.pop_layer();
        }
    }
}
