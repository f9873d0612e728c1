//! Filled figures placed by the shape tool and the wacky effects.

use super::{LocalGeometry, SerializableColor, point_to_segment_dist};
use kurbo::{BezPath, Circle, PathEl, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Figure outlines offered by the shape tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Heart,
    Star,
    Circle,
    Square,
    Triangle,
    Diamond,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Heart,
        ShapeKind::Star,
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Diamond,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Heart => "heart",
            ShapeKind::Star => "star",
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Diamond => "diamond",
        }
    }

    /// Outline of this figure with side/diameter `size`, centered on the origin.
    pub fn path(&self, size: f64) -> BezPath {
        let s = size;
        match self {
            ShapeKind::Heart => heart_path(s),
            ShapeKind::Star => star_path(s / 2.0, s / 4.0),
            ShapeKind::Circle => Circle::new(Point::ZERO, s / 2.0).to_path(0.1),
            ShapeKind::Square => Rect::new(-s / 2.0, -s / 2.0, s / 2.0, s / 2.0).to_path(0.1),
            ShapeKind::Triangle => polygon(&[
                Point::new(0.0, -s / 2.0),
                Point::new(s / 2.0, s / 2.0),
                Point::new(-s / 2.0, s / 2.0),
            ]),
            ShapeKind::Diamond => polygon(&[
                Point::new(0.0, -s / 2.0),
                Point::new(s / 2.0, 0.0),
                Point::new(0.0, s / 2.0),
                Point::new(-s / 2.0, 0.0),
            ]),
        }
    }
}

/// Heart built from four cubic lobes.
pub fn heart_path(s: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, -s / 4.0));
    path.curve_to((0.0, -s / 2.0), (-s / 2.0, -s / 2.0), (-s / 2.0, -s / 4.0));
    path.curve_to((-s / 2.0, s / 4.0), (0.0, s / 2.0), (0.0, s * 0.6));
    path.curve_to((0.0, s / 2.0), (s / 2.0, s / 4.0), (s / 2.0, -s / 4.0));
    path.curve_to((s / 2.0, -s / 2.0), (0.0, -s / 2.0), (0.0, -s / 4.0));
    path.close_path();
    path
}

/// Five-pointed star alternating between the outer and inner radius.
pub fn star_path(outer: f64, inner: f64) -> BezPath {
    let points: Vec<Point> = (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = PI / 5.0 * i as f64 - PI / 2.0;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    polygon(&points)
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Optional outline drawn around a figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: SerializableColor,
    pub width: f64,
}

/// A filled figure centered on its placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub shape: ShapeKind,
    /// Base side length or diameter before placement scaling.
    pub size: f64,
    pub fill: SerializableColor,
    #[serde(default)]
    pub outline: Option<Outline>,
}

impl Figure {
    pub fn new(shape: ShapeKind, size: f64, fill: SerializableColor) -> Self {
        Self {
            shape,
            size,
            fill,
            outline: None,
        }
    }

    pub fn with_outline(mut self, color: SerializableColor, width: f64) -> Self {
        self.outline = Some(Outline { color, width });
        self
    }
}

impl LocalGeometry for Figure {
    fn local_bounds(&self) -> Rect {
        let bounds = self.local_path().bounding_box();
        match self.outline {
            Some(o) => bounds.inflate(o.width / 2.0, o.width / 2.0),
            None => bounds,
        }
    }

    fn hit_local(&self, point: Point, tolerance: f64) -> bool {
        let path = self.local_path();
        if path.contains(point) {
            return true;
        }
        let reach = tolerance + self.outline.map_or(0.0, |o| o.width / 2.0);
        if reach <= 0.0 {
            return false;
        }
        let mut hit = false;
        let mut last = Point::ZERO;
        let mut start = Point::ZERO;
        kurbo::flatten(path.iter(), 0.25, |el| match el {
            PathEl::MoveTo(p) => {
                last = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                hit |= point_to_segment_dist(point, last, p) <= reach;
                last = p;
            }
            PathEl::ClosePath => {
                hit |= point_to_segment_dist(point, last, start) <= reach;
                last = start;
            }
            _ => {}
        });
        hit
    }

    fn local_path(&self) -> BezPath {
        self.shape.path(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_points() {
        let path = star_path(10.0, 5.0);
        let mut vertices = Vec::new();
        for el in path.elements() {
            match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => vertices.push(*p),
                _ => {}
            }
        }
        assert_eq!(vertices.len(), 10);
        assert!((vertices[0].x).abs() < 1e-9);
        assert!((vertices[0].y + 10.0).abs() < 1e-9);
        assert!((vertices[1].to_vec2().hypot() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_heart_extent() {
        let bounds = heart_path(100.0).bounding_box();
        assert!((bounds.x0 + 50.0).abs() < 1e-6);
        assert!((bounds.x1 - 50.0).abs() < 1e-6);
        assert!((bounds.y1 - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_figure_hit() {
        let fig = Figure::new(ShapeKind::Diamond, 40.0, SerializableColor::black());
        assert!(fig.hit_local(Point::ZERO, 0.0));
        assert!(!fig.hit_local(Point::new(18.0, 18.0), 0.0));
        assert!(fig.hit_local(Point::new(11.0, 11.0), 2.0));
    }

    #[test]
    fn test_curved_edge_within_tolerance() {
        let fig = Figure::new(ShapeKind::Circle, 40.0, SerializableColor::black());
        assert!(!fig.hit_local(Point::new(21.5, 0.0), 0.0));
        assert!(fig.hit_local(Point::new(21.5, 0.0), 2.0));
        assert!(!fig.hit_local(Point::new(0.0, 23.0), 2.0));
    }

    #[test]
    fn test_outline_widens_bounds() {
        let plain = Figure::new(ShapeKind::Square, 20.0, SerializableColor::white());
        let outlined = plain.clone().with_outline(SerializableColor::black(), 4.0);
        assert!((outlined.local_bounds().width() - plain.local_bounds().width() - 4.0).abs() < 1e-9);
    }
}
