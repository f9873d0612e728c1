//! Canvas-sized pattern backgrounds.

use super::{LocalGeometry, SerializableColor};
use crate::fill::{FillPattern, PatternTile};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Rectangle covering the canvas, painted with a repeating pattern tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    pub width: f64,
    pub height: f64,
    pub pattern: FillPattern,
    /// Accent color the tile is drawn with.
    pub color: SerializableColor,
}

impl Backdrop {
    pub fn new(width: f64, height: f64, pattern: FillPattern, color: SerializableColor) -> Self {
        Self {
            width,
            height,
            pattern,
            color,
        }
    }

    pub fn tile(&self) -> PatternTile {
        PatternTile::build(self.color, self.pattern)
    }
}

impl LocalGeometry for Backdrop {
    fn local_bounds(&self) -> Rect {
        Rect::new(-self.width / 2.0, -self.height / 2.0, self.width / 2.0, self.height / 2.0)
    }

    fn hit_local(&self, point: Point, tolerance: f64) -> bool {
        self.local_bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn local_path(&self) -> BezPath {
        self.local_bounds().to_path(0.1)
    }
}
