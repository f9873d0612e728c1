//! Tool selection, tool settings and freehand stroke capture.

use crate::effects::WackyEffect;
use crate::elements::{
    Brush, BrushShape, CardFont, Element, ElementKind, ElementTag, Placement, SerializableColor, ShapeKind, Stroke,
};
use crate::fill::FillPattern;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Stroke simplification tolerance in canvas pixels.
const SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Brush sizes offered in the toolbar.
pub const BRUSH_SIZES: [f64; 5] = [2.0, 5.0, 10.0, 15.0, 20.0];

/// Stamp sizes offered in the toolbar.
pub const STAMP_SIZES: [f64; 5] = [20.0, 32.0, 48.0, 64.0, 80.0];

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Fill,
    Stamp,
    Text,
    Shapes,
    Wacky,
    Move,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Fill,
        ToolKind::Stamp,
        ToolKind::Text,
        ToolKind::Shapes,
        ToolKind::Wacky,
        ToolKind::Move,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Brush => "brush",
            ToolKind::Eraser => "eraser",
            ToolKind::Fill => "fill",
            ToolKind::Stamp => "stamp",
            ToolKind::Text => "text",
            ToolKind::Shapes => "shapes",
            ToolKind::Wacky => "wacky",
            ToolKind::Move => "move",
        }
    }

    /// Tools that capture a freehand stroke while dragging.
    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Brush | ToolKind::Eraser)
    }
}

/// Current tool and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub pattern: FillPattern,
    pub brush_size: f64,
    pub brush_shape: BrushShape,
    pub eraser_size: f64,
    pub eraser_shape: BrushShape,
    /// Stamp asset path, or a literal glyph for text stamps.
    pub stamp: String,
    pub stamp_size: f64,
    pub shape: ShapeKind,
    pub font: CardFont,
    pub wacky_effect: WackyEffect,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Brush,
            color: SerializableColor::new(0xff, 0x14, 0x93, 255),
            pattern: FillPattern::Solid,
            brush_size: 5.0,
            brush_shape: BrushShape::Round,
            eraser_size: 10.0,
            eraser_shape: BrushShape::Round,
            stamp: "/stamps/kidpix-spritesheet-0-1.png".to_string(),
            stamp_size: 48.0,
            shape: ShapeKind::Heart,
            font: CardFont::Pixel,
            wacky_effect: WackyEffect::Smear,
        }
    }
}

impl ToolSettings {
    /// Brush for the current brush tool.
    pub fn brush(&self) -> Brush {
        Brush::for_shape(self.brush_shape, self.brush_size, self.color)
    }

    /// Eraser brush; it paints with the card background color.
    pub fn eraser(&self, background: SerializableColor) -> Brush {
        Brush::for_shape(self.eraser_shape, self.eraser_size, background)
    }

    /// Size used for shapes and typed text.
    pub fn figure_size(&self) -> f64 {
        self.brush_size * 4.0
    }
}

/// State of a freehand capture.
#[derive(Debug, Clone, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing {
        brush: Brush,
        tag: ElementTag,
    },
}

/// Accumulates pointer samples into a stroke element.
#[derive(Debug, Clone, Default)]
pub struct StrokeBuilder {
    state: StrokeState,
    points: Vec<Point>,
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `point`.
    pub fn begin(&mut self, point: Point, brush: Brush, tag: ElementTag) {
        self.points.clear();
        self.points.push(point);
        self.state = StrokeState::Drawing { brush, tag };
    }

    pub fn update(&mut self, point: Point) {
        if !self.is_active() {
            return;
        }
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Finish the stroke and build its element. A press without movement
    /// still yields a single-point dot.
    pub fn end(&mut self, point: Point) -> Option<Element> {
        self.update(point);
        let StrokeState::Drawing { brush, tag } = std::mem::take(&mut self.state) else {
            return None;
        };
        let points = std::mem::take(&mut self.points);
        if points.is_empty() {
            return None;
        }
        let (mut stroke, center) = Stroke::from_canvas_points(&points, brush);
        stroke.simplify(SIMPLIFY_TOLERANCE);
        Some(Element::new(tag, Placement::at(center), ElementKind::Stroke(stroke)))
    }

    pub fn cancel(&mut self) {
        self.state = StrokeState::Idle;
        self.points.clear();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Points captured so far, in canvas coordinates.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}
