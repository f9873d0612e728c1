//! Element definitions for the card scene.
//!
//! Every placed element carries a center-anchored [`Placement`], a first-class
//! [`ElementTag`] describing what created it, and an [`ElementKind`] holding
//! its local geometry.

mod backdrop;
mod figure;
mod picture;
mod stroke;
mod text;

pub use backdrop::Backdrop;
pub use figure::{Figure, Outline, ShapeKind, heart_path, star_path};
pub use picture::{ImageFormat, Picture};
pub use stroke::{Brush, BrushShape, LineCap, LineJoin, Stroke};
pub use text::{CardFont, Text, TextOutline, TextShadow};

use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS hex color like `#ff1493` or `#fff`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 16 + v;
                }
                Some(Self::new(rgb[0], rgb[1], rgb[2], 255))
            }
            _ => None,
        }
    }

    /// Format as a lowercase `#rrggbb` string (alpha dropped).
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build an opaque color from HSL (hue in degrees, saturation and lightness in 0..=1).
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to_u8(r), to_u8(g), to_u8(b), 255)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Role of an element placed by the random design composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignRole {
    Balloon,
    /// Template decoration slot.
    Decoration,
    Character,
    /// Scattered library stamp.
    Stamp,
    Centerpiece,
    Caption,
}

/// Category an element was created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementTag {
    /// Brush stroke.
    Stroke,
    /// Eraser stroke (painted in the background color).
    Eraser,
    Stamp,
    Shape,
    Text,
    /// User-imported image.
    Image,
    /// Output of a wacky effect.
    Effect,
    /// Canvas-covering background (pattern fill or background picture).
    Background,
    /// Placed by the random design composer.
    Design(DesignRole),
}

impl ElementTag {
    pub fn is_background(&self) -> bool {
        matches!(self, ElementTag::Background)
    }
}

/// Center-anchored transform shared by every element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Center of the element in canvas coordinates.
    pub center: Point,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation around the center, in radians.
    #[serde(default)]
    pub rotation: f64,
    /// Horizontal flip applied before rotation.
    #[serde(default)]
    pub flip_x: bool,
}

impl Placement {
    /// Unscaled, unrotated placement at a point.
    pub fn at(center: Point) -> Self {
        Self {
            center,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            flip_x: false,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    pub fn with_rotation_degrees(mut self, degrees: f64) -> Self {
        self.rotation = degrees.to_radians();
        self
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }

    /// Local-to-canvas transform.
    pub fn affine(&self) -> Affine {
        let flip = if self.flip_x { -1.0 } else { 1.0 };
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale_x * flip, self.scale_y)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point::ZERO)
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    if let [only] = points {
        return (point - *only).hypot();
    }
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Geometry of an element in its own local (center-origin) coordinates.
pub trait LocalGeometry {
    /// Bounding box in local coordinates.
    fn local_bounds(&self) -> Rect;

    /// Check if a local-space point hits this element.
    fn hit_local(&self, point: Point, tolerance: f64) -> bool;

    /// Outline path in local coordinates.
    fn local_path(&self) -> BezPath;
}

/// Enum wrapper for all element kinds (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Stroke(Stroke),
    Figure(Figure),
    Text(Text),
    Picture(Picture),
    Backdrop(Backdrop),
}

impl ElementKind {
    fn geometry(&self) -> &dyn LocalGeometry {
        match self {
            ElementKind::Stroke(s) => s,
            ElementKind::Figure(s) => s,
            ElementKind::Text(s) => s,
            ElementKind::Picture(s) => s,
            ElementKind::Backdrop(s) => s,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&Picture> {
        match self {
            ElementKind::Picture(p) => Some(p),
            _ => None,
        }
    }
}

/// A drawable unit placed on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    pub tag: ElementTag,
    pub placement: Placement,
    /// Whether the move tool may pick this element.
    pub selectable: bool,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub kind: ElementKind,
}

fn default_opacity() -> f64 {
    1.0
}

impl Element {
    /// Create an element with a fresh identifier.
    pub fn new(tag: ElementTag, placement: Placement, kind: ElementKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag,
            placement,
            selectable: !tag.is_background(),
            opacity: 1.0,
            kind,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        self.placement
            .affine()
            .transform_rect_bbox(self.kind.geometry().local_bounds())
    }

    /// Check if a canvas-space point hits this element.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let affine = self.placement.affine();
        if affine.determinant().abs() < f64::EPSILON {
            return false;
        }
        let local = affine.inverse() * point;
        let scale = self.placement.scale_x.abs().max(self.placement.scale_y.abs());
        self.kind.geometry().hit_local(local, tolerance / scale)
    }

    /// Outline path in canvas coordinates.
    pub fn to_path(&self) -> BezPath {
        self.placement.affine() * self.kind.geometry().local_path()
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.placement.center += delta;
    }

    /// Reflect horizontally across the vertical line `x = axis_x`.
    pub fn mirror_across(&mut self, axis_x: f64) {
        self.placement.center.x = 2.0 * axis_x - self.placement.center.x;
        self.placement.flip_x = !self.placement.flip_x;
        self.placement.rotation = -self.placement.rotation;
    }

    /// Uniformly scale around the element's center.
    pub fn scale_by(&mut self, factor: f64) {
        self.placement.scale_x *= factor;
        self.placement.scale_y *= factor;
    }
}
