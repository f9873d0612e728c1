//! Text elements.

use super::{LocalGeometry, SerializableColor};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Font choices available on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CardFont {
    /// Pixel-art font (default).
    #[default]
    Pixel,
    /// Chunky rounded display font.
    Bubble,
    /// Cursive script font.
    Script,
    /// Condensed serif font.
    Narrow,
}

impl CardFont {
    pub const ALL: [CardFont; 4] = [CardFont::Pixel, CardFont::Bubble, CardFont::Script, CardFont::Narrow];

    /// Fonts the random design picks captions from.
    pub const CAPTION_FONTS: [CardFont; 3] = [CardFont::Bubble, CardFont::Pixel, CardFont::Script];

    /// Family name as registered with the renderer.
    pub fn family(&self) -> &'static str {
        match self {
            CardFont::Pixel => "Pixelify Sans",
            CardFont::Bubble => "Bagel Fat One",
            CardFont::Script => "Imperial Script",
            CardFont::Narrow => "Instrument Serif",
        }
    }

    /// CSS font stack, including the generic fallback.
    pub fn css_stack(&self) -> &'static str {
        match self {
            CardFont::Pixel => "Pixelify Sans, monospace",
            CardFont::Bubble => "Bagel Fat One, cursive",
            CardFont::Script => "Imperial Script, cursive",
            CardFont::Narrow => "Instrument Serif, serif",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CardFont::Pixel => "pixel",
            CardFont::Bubble => "bubble",
            CardFont::Script => "script",
            CardFont::Narrow => "narrow",
        }
    }
}

/// Stroke drawn around each glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextOutline {
    pub color: SerializableColor,
    pub width: f64,
}

/// Drop shadow behind text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextShadow {
    pub color: SerializableColor,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            color: SerializableColor::new(0, 0, 0, 102),
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 4.0,
        }
    }
}

/// A block of text centered on its placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    pub font: CardFont,
    /// Font size in pixels.
    pub font_size: f64,
    pub fill: SerializableColor,
    #[serde(default)]
    pub outline: Option<TextOutline>,
    #[serde(default)]
    pub shadow: Option<TextShadow>,
}

impl Text {
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.2;
    /// Average glyph advance as a multiple of the font size.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    pub fn new(content: impl Into<String>, font: CardFont, font_size: f64, fill: SerializableColor) -> Self {
        Self {
            content: content.into(),
            font,
            font_size,
            fill,
            outline: None,
            shadow: None,
        }
    }

    pub fn with_outline(mut self, color: SerializableColor, width: f64) -> Self {
        self.outline = Some(TextOutline { color, width });
        self
    }

    pub fn with_shadow(mut self, shadow: TextShadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Approximate layout size (width, height) without shaping.
    pub fn approximate_size(&self) -> (f64, f64) {
        let line_count = self.lines().count().max(1);
        let max_chars = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = (max_chars as f64 * self.font_size * Self::CHAR_WIDTH_FACTOR).max(self.font_size * 0.5);
        let height = line_count as f64 * self.font_size * Self::LINE_HEIGHT;
        (width, height)
    }
}

impl LocalGeometry for Text {
    fn local_bounds(&self) -> Rect {
        let (w, h) = self.approximate_size();
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

    #[test]
    fn test_approximate_size() {
        let text = Text::new("Hello\nHi", CardFont::Pixel, 20.0, SerializableColor::black());
        let (w, h) = text.approximate_size();
        assert!((w - 5.0 * 20.0 * 0.55).abs() < 1e-9);
        assert!((h - 2.0 * 20.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_has_width() {
        let text = Text::new("", CardFont::Script, 40.0, SerializableColor::black());
        let (w, _) = text.approximate_size();
        assert!(w > 0.0);
    }

    #[test]
    fn test_font_families() {
        assert_eq!(CardFont::Bubble.family(), "Bagel Fat One");
        assert_eq!(CardFont::Pixel.css_stack(), "Pixelify Sans, monospace");
        assert!(!CardFont::CAPTION_FONTS.contains(&CardFont::Narrow));
    }

    #[test]
    fn test_hit_inside_box() {
        let text = Text::new("Party", CardFont::Bubble, 72.0, SerializableColor::white());
        assert!(text.hit_local(Point::new(10.0, 10.0), 0.0));
        assert!(!text.hit_local(Point::new(0.0, 100.0), 0.0));
    }
}
