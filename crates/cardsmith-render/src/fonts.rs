//! Font registry and glyph outline layout.

use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, PxScaleFont, ScaleFont};
use cardsmith_core::elements::{CardFont, Text};
use kurbo::{BezPath, Point};
use std::collections::HashMap;

use crate::RenderError;

/// Fonts available to the rasterizer, keyed by card font.
#[derive(Clone, Default)]
pub struct FontBook {
    fonts: HashMap<CardFont, FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("fonts", &self.fonts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register TrueType/OpenType bytes for a card font.
    pub fn register(&mut self, font: CardFont, bytes: Vec<u8>) -> Result<(), RenderError> {
        let parsed = FontArc::try_from_vec(bytes).map_err(|_| RenderError::InvalidFont(font.family().to_string()))?;
        log::debug!("Registered font {}", font.family());
        self.fonts.insert(font, parsed);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn contains(&self, font: CardFont) -> bool {
        self.fonts.contains_key(&font)
    }

    /// The requested font, or any registered font as a fallback.
    pub fn resolve(&self, font: CardFont) -> Option<&FontArc> {
        self.fonts
            .get(&font)
            .or_else(|| CardFont::ALL.iter().find_map(|f| self.fonts.get(f)))
    }

    /// Lay out `text` as glyph outlines centered on the origin.
    ///
    /// Lines are centered horizontally and stacked using the text line height.
    pub fn layout(&self, text: &Text) -> Option<BezPath> {
        let font = self.resolve(text.font)?;
        let scaled = font.as_scaled(PxScale::from(text.font_size as f32));
        let (hs, vs) = (scaled.h_scale_factor() as f64, scaled.v_scale_factor() as f64);
        let line_height = text.font_size * Text::LINE_HEIGHT;
        let ascent = scaled.ascent() as f64;
        let glyph_height = ascent - scaled.descent() as f64;
        let lines: Vec<&str> = text.lines().collect();
        let top = -(lines.len() as f64 * line_height) / 2.0;

        let mut path = BezPath::new();
        for (i, line) in lines.iter().enumerate() {
            let ids: Vec<GlyphId> = line.chars().map(|c| font.glyph_id(c)).collect();
            let width = line_width(&scaled, &ids);
            let baseline = top + i as f64 * line_height + (line_height - glyph_height) / 2.0 + ascent;
            let mut pen = -width / 2.0;
            let mut previous: Option<GlyphId> = None;
            for id in ids {
                if let Some(prev) = previous {
                    pen += scaled.kern(prev, id) as f64;
                }
                if let Some(outline) = font.outline(id) {
                    let origin = Point::new(pen, baseline);
                    append_outline(&mut path, &outline.curves, origin, hs, vs);
                }
                pen += scaled.h_advance(id) as f64;
                previous = Some(id);
            }
        }
        Some(path)
    }
}

fn line_width(scaled: &PxScaleFont<&FontArc>, ids: &[GlyphId]) -> f64 {
    let mut width = 0.0;
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            width += scaled.kern(ids[i - 1], *id) as f64;
        }
        width += scaled.h_advance(*id) as f64;
    }
    width
}

/// Append font-unit curves (y up) to `path` at `origin`, starting a new
/// subpath whenever a curve does not continue the previous one.
fn append_outline(path: &mut BezPath, curves: &[OutlineCurve], origin: Point, hs: f64, vs: f64) {
    let map = |p: ab_glyph::Point| Point::new(origin.x + p.x as f64 * hs, origin.y - p.y as f64 * vs);
    let mut last: Option<Point> = None;
    for curve in curves {
        let (start, end) = match curve {
            OutlineCurve::Line(a, b) => (map(*a), map(*b)),
            OutlineCurve::Quad(a, _, b) => (map(*a), map(*b)),
            OutlineCurve::Cubic(a, _, _, b) => (map(*a), map(*b)),
        };
        let continues = last.is_some_and(|p| (p - start).hypot() < 1e-6);
        if !continues {
            if last.is_some() {
                path.close_path();
            }
            path.move_to(start);
        }
        match curve {
            OutlineCurve::Line(_, _) => path.line_to(end),
            OutlineCurve::Quad(_, c, _) => path.quad_to(map(*c), end),
            OutlineCurve::Cubic(_, c1, c2, _) => path.curve_to(map(*c1), map(*c2), end),
        }
        last = Some(end);
    }
    if last.is_some() {
        path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsmith_core::SerializableColor;

    #[test]
    fn test_empty_book_has_no_layout() {
        let book = FontBook::new();
        let text = Text::new("Party", CardFont::Bubble, 40.0, SerializableColor::black());
        assert!(book.is_empty());
        assert!(book.layout(&text).is_none());
    }

    #[test]
    fn test_invalid_font_rejected() {
        let mut book = FontBook::new();
        let result = book.register(CardFont::Pixel, b"not a font".to_vec());
        assert!(matches!(result, Err(RenderError::InvalidFont(_))));
        assert!(!book.contains(CardFont::Pixel));
    }

    #[test]
    fn test_outline_subpaths() {
        let p = |x: f32, y: f32| ab_glyph::point(x, y);
        let curves = [
            OutlineCurve::Line(p(0.0, 0.0), p(10.0, 0.0)),
            OutlineCurve::Line(p(10.0, 0.0), p(0.0, 10.0)),
            OutlineCurve::Line(p(20.0, 0.0), p(30.0, 0.0)),
        ];
        let mut path = BezPath::new();
        append_outline(&mut path, &curves, Point::new(5.0, 50.0), 1.0, 1.0);
        let moves = path.elements().iter().filter(|e| matches!(e, kurbo::PathEl::MoveTo(_))).count();
        assert_eq!(moves, 2);
        assert_eq!(path.elements()[0], kurbo::PathEl::MoveTo(Point::new(5.0, 50.0)));
        assert_eq!(path.elements()[2], kurbo::PathEl::LineTo(Point::new(5.0, 40.0)));
    }
}
