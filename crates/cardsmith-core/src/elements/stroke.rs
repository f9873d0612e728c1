//! Freehand brush strokes.

use super::{LocalGeometry, SerializableColor, point_to_polyline_dist};
use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Brush tip shape chosen in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushShape {
    #[default]
    Round,
    Square,
    /// Dotted circle brush.
    Spray,
}

impl BrushShape {
    pub const ALL: [BrushShape; 3] = [BrushShape::Round, BrushShape::Square, BrushShape::Spray];

    pub fn name(&self) -> &'static str {
        match self {
            BrushShape::Round => "round",
            BrushShape::Square => "square",
            BrushShape::Spray => "spray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineJoin {
    Round,
    Miter,
}

/// Paint settings applied to a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub width: f64,
    pub color: SerializableColor,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Render as a trail of dots instead of a continuous line.
    pub spray: bool,
}

impl Brush {
    /// Build a brush for the given tip and size.
    pub fn for_shape(shape: BrushShape, size: f64, color: SerializableColor) -> Self {
        match shape {
            BrushShape::Round => Self {
                width: size,
                color,
                cap: LineCap::Round,
                join: LineJoin::Round,
                spray: false,
            },
            BrushShape::Square => Self {
                width: size,
                color,
                cap: LineCap::Square,
                join: LineJoin::Miter,
                spray: false,
            },
            BrushShape::Spray => Self {
                width: size * 3.0,
                color,
                cap: LineCap::Round,
                join: LineJoin::Round,
                spray: true,
            },
        }
    }
}

/// A freehand stroke. Points are relative to the element center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub brush: Brush,
}

impl Stroke {
    pub fn new(points: Vec<Point>, brush: Brush) -> Self {
        Self { points, brush }
    }

    /// Build from canvas-space points, returning the stroke recentered on its
    /// bounding box and the center it should be placed at.
    pub fn from_canvas_points(points: &[Point], brush: Brush) -> (Self, Point) {
        let bounds = points_bounds(points);
        let center = bounds.center();
        let local = points.iter().map(|p| *p - center.to_vec2()).collect();
        (Self::new(local, brush), center)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop redundant points, keeping the outline within `tolerance`.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 || self.brush.spray {
            return;
        }
        self.points = rdp_simplify(&self.points, tolerance);
    }

    /// Dots painted by a spray brush.
    pub fn spray_dots(&self) -> impl Iterator<Item = Circle> + '_ {
        let radius = self.brush.width / 2.0;
        self.points.iter().map(move |p| Circle::new(*p, radius))
    }
}

/// Ramer-Douglas-Peucker line simplification.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Perpendicular distance from a point to the infinite line through two points.
fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        return (point - line_start).hypot();
    }
    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}

fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

impl LocalGeometry for Stroke {
    fn local_bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }
        points_bounds(&self.points).inflate(self.brush.width / 2.0, self.brush.width / 2.0)
    }

    fn hit_local(&self, point: Point, tolerance: f64) -> bool {
        if self.points.is_empty() {
            return false;
        }
        point_to_polyline_dist(point, &self.points) <= tolerance + self.brush.width / 2.0
    }

    fn local_path(&self) -> BezPath {
        if self.brush.spray {
            let mut path = BezPath::new();
            for dot in self.spray_dots() {
                path.extend(dot.path_elements(0.1));
            }
            return path;
        }
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }
        path
    }
}
