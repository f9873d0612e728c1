//! Background fill and repeating pattern tiles.

use crate::elements::{Backdrop, Element, ElementKind, ElementTag, Placement, SerializableColor, heart_path, star_path};
use crate::scene::CardScene;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Pattern options for the fill tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillPattern {
    /// Plain background color, no tile.
    #[default]
    Solid,
    StripesH,
    StripesV,
    StripesD,
    Dots,
    Checkerboard,
    Hearts,
    Stars,
    Zigzag,
    Confetti,
}

impl FillPattern {
    pub const ALL: [FillPattern; 10] = [
        FillPattern::Solid,
        FillPattern::StripesH,
        FillPattern::StripesV,
        FillPattern::StripesD,
        FillPattern::Dots,
        FillPattern::Checkerboard,
        FillPattern::Hearts,
        FillPattern::Stars,
        FillPattern::Zigzag,
        FillPattern::Confetti,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FillPattern::Solid => "solid",
            FillPattern::StripesH => "stripes-h",
            FillPattern::StripesV => "stripes-v",
            FillPattern::StripesD => "stripes-d",
            FillPattern::Dots => "dots",
            FillPattern::Checkerboard => "checkerboard",
            FillPattern::Hearts => "hearts",
            FillPattern::Stars => "stars",
            FillPattern::Zigzag => "zigzag",
            FillPattern::Confetti => "confetti",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// How a tile mark is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TilePaint {
    Fill(SerializableColor),
    Stroke { color: SerializableColor, width: f64 },
}

/// One vector primitive inside a pattern tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMark {
    pub path: BezPath,
    pub paint: TilePaint,
}

/// A square tile drawn on white and repeated across the backdrop.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTile {
    pub size: f64,
    pub base: SerializableColor,
    /// Marks in paint order; may overhang the tile and are clipped to it.
    pub marks: Vec<TileMark>,
}

impl PatternTile {
    pub const SIZE: f64 = 24.0;

    const CONFETTI_ACCENTS: [SerializableColor; 5] = [
        SerializableColor::new(0xff, 0x69, 0xb4, 255),
        SerializableColor::new(0xa8, 0x55, 0xf7, 255),
        SerializableColor::new(0x00, 0xe5, 0xff, 255),
        SerializableColor::new(0xff, 0xd7, 0x00, 255),
        SerializableColor::new(0x7f, 0xff, 0x00, 255),
    ];

    /// Build the tile for `pattern` drawn in `color`. Solid yields a blank tile.
    pub fn build(color: SerializableColor, pattern: FillPattern) -> Self {
        let size = Self::SIZE;
        let mut marks = Vec::new();
        let fill = |path: BezPath| TileMark {
            path,
            paint: TilePaint::Fill(color),
        };
        let stroke = |path: BezPath, width: f64| TileMark {
            path,
            paint: TilePaint::Stroke { color, width },
        };

        match pattern {
            FillPattern::Solid => {}
            FillPattern::StripesH => {
                for y in (2..24).step_by(8) {
                    marks.push(fill(Rect::new(0.0, y as f64, size, y as f64 + 4.0).to_path(0.1)));
                }
            }
            FillPattern::StripesV => {
                for x in (2..24).step_by(8) {
                    marks.push(fill(Rect::new(x as f64, 0.0, x as f64 + 4.0, size).to_path(0.1)));
                }
            }
            FillPattern::StripesD => {
                for i in (-24..48).step_by(8) {
                    let mut line = BezPath::new();
                    line.move_to((i as f64, 0.0));
                    line.line_to((i as f64 + size, size));
                    marks.push(stroke(line, 4.0));
                }
            }
            FillPattern::Dots => {
                for (x, y) in [(6.0, 6.0), (18.0, 6.0), (12.0, 12.0), (6.0, 18.0), (18.0, 18.0)] {
                    marks.push(fill(Circle::new((x, y), 3.0).to_path(0.1)));
                }
            }
            FillPattern::Checkerboard => {
                for cx in 0..3 {
                    for cy in 0..3 {
                        if (cx + cy) % 2 == 0 {
                            let (x, y) = (cx as f64 * 8.0, cy as f64 * 8.0);
                            marks.push(fill(Rect::new(x, y, x + 8.0, y + 8.0).to_path(0.1)));
                        }
                    }
                }
            }
            FillPattern::Hearts => {
                let heart = SerializableColor::new(0xff, 0x69, 0xb4, 255);
                for center in [Point::new(8.0, 9.0), Point::new(20.0, 17.0)] {
                    marks.push(TileMark {
                        path: Affine::translate(center.to_vec2()) * heart_path(10.0),
                        paint: TilePaint::Fill(heart),
                    });
                }
            }
            FillPattern::Stars => {
                let star = SerializableColor::new(0xff, 0xd7, 0x00, 255);
                for center in [Point::new(8.0, 9.0), Point::new(20.0, 17.0)] {
                    marks.push(TileMark {
                        path: Affine::translate(center.to_vec2()) * star_path(6.0, 3.0),
                        paint: TilePaint::Fill(star),
                    });
                }
            }
            FillPattern::Zigzag => {
                for base_y in [8.0, 20.0] {
                    let mut zig = BezPath::new();
                    zig.move_to((0.0, base_y));
                    for x in (0..24).step_by(6) {
                        zig.line_to((x as f64 + 3.0, base_y - 4.0));
                        zig.line_to((x as f64 + 6.0, base_y));
                    }
                    marks.push(stroke(zig, 3.0));
                }
            }
            FillPattern::Confetti => {
                let positions = [(4.0, 4.0), (16.0, 3.0), (10.0, 12.0), (4.0, 18.0), (18.0, 16.0)];
                for (i, (x, y)) in positions.into_iter().enumerate() {
                    let piece_color = if i == 0 { color } else { Self::CONFETTI_ACCENTS[i - 1] };
                    let transform = Affine::translate((x, y)) * Affine::rotate((i as f64 * 30.0).to_radians());
                    marks.push(TileMark {
                        path: transform * Rect::new(-2.0, -2.0, 3.0, 3.0).to_path(0.1),
                        paint: TilePaint::Fill(piece_color),
                    });
                }
            }
        }

        Self {
            size,
            base: SerializableColor::white(),
            marks,
        }
    }
}

/// Fill the card background with a solid color or a pattern.
///
/// Any previous background element is removed first, so at most one exists.
/// Returns the id of the new backdrop element for patterned fills.
pub fn fill_background(
    scene: &mut CardScene,
    color: SerializableColor,
    pattern: FillPattern,
) -> Option<crate::elements::ElementId> {
    if let Some(existing) = scene.background_element() {
        scene.remove(existing);
    }

    if pattern == FillPattern::Solid {
        scene.set_background(color);
        return None;
    }

    scene.set_background(SerializableColor::white());
    let (width, height) = scene.size();
    let backdrop = Backdrop::new(width, height, pattern, color);
    let element = Element::new(
        ElementTag::Background,
        Placement::at(Point::new(width / 2.0, height / 2.0)),
        ElementKind::Backdrop(backdrop),
    )
    .with_selectable(false);
    let id = scene.add(element);
    scene.send_to_back(id);
    log::debug!("Filled background with {} pattern", pattern.name());
    Some(id)
}
