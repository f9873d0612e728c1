//! Wacky effects: whole-card transforms and drag trails.

use crate::elements::{Element, ElementId, ElementKind, ElementTag, Figure, Placement, SerializableColor, ShapeKind};
use crate::scene::CardScene;
use kurbo::Point;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Effects offered by the wacky tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WackyEffect {
    /// Pink smudges trailing the pointer.
    #[default]
    Smear,
    Mirror,
    Pixelate,
    /// Hue-cycling dots trailing the pointer.
    Rainbow,
    Scramble,
}

impl WackyEffect {
    pub const ALL: [WackyEffect; 5] = [
        WackyEffect::Smear,
        WackyEffect::Mirror,
        WackyEffect::Pixelate,
        WackyEffect::Rainbow,
        WackyEffect::Scramble,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WackyEffect::Smear => "smear",
            WackyEffect::Mirror => "mirror",
            WackyEffect::Pixelate => "pixelate",
            WackyEffect::Rainbow => "rainbow",
            WackyEffect::Scramble => "scramble",
        }
    }

    /// Whether the effect paints while the pointer is dragged.
    pub fn is_drag(&self) -> bool {
        matches!(self, WackyEffect::Smear | WackyEffect::Rainbow)
    }
}

const PIXEL_COLORS: [SerializableColor; 6] = [
    SerializableColor::new(0xff, 0x14, 0x93, 255),
    SerializableColor::new(0xff, 0x69, 0xb4, 255),
    SerializableColor::new(0xa8, 0x55, 0xf7, 255),
    SerializableColor::new(0x00, 0xe5, 0xff, 255),
    SerializableColor::new(0xff, 0xd7, 0x00, 255),
    SerializableColor::new(0x7f, 0xff, 0x00, 255),
];

const SMEAR_COLORS: [SerializableColor; 4] = [
    SerializableColor::new(0xff, 0x14, 0x93, 255),
    SerializableColor::new(0xff, 0x69, 0xb4, 255),
    SerializableColor::new(0xff, 0xb6, 0xd9, 255),
    SerializableColor::new(0xff, 0xc0, 0xe0, 255),
];

const PIXEL_PITCH: f64 = 20.0;
const PIXEL_GRID: usize = 5;
const RAINBOW_RADIUS: f64 = 15.0;
const RAINBOW_HUE_STEP: f64 = 5.0;
const SMEAR_RADIUS: f64 = 20.0;
const SMEAR_MIN_DISTANCE: f64 = 5.0;

fn foreground_ids(scene: &CardScene) -> Vec<ElementId> {
    scene
        .elements_ordered()
        .filter(|e| !e.tag.is_background())
        .map(|e| e.id())
        .collect()
}

/// Reflect every non-background element across the vertical center line.
pub fn mirror(scene: &mut CardScene) -> Vec<ElementId> {
    let axis = scene.width() / 2.0;
    let ids = foreground_ids(scene);
    for id in &ids {
        if let Some(element) = scene.get_mut(*id) {
            element.mirror_across(axis);
        }
    }
    scene.mark_modified(ids.clone());
    ids
}

/// Throw every non-background element to a random spot and angle.
pub fn scramble<R: Rng + ?Sized>(scene: &mut CardScene, rng: &mut R) -> Vec<ElementId> {
    let (width, height) = scene.size();
    let ids = foreground_ids(scene);
    for id in &ids {
        let x = rng.random::<f64>() * (width - 100.0) + 50.0;
        let y = rng.random::<f64>() * (height - 100.0) + 50.0;
        let degrees = rng.random::<f64>() * 360.0;
        if let Some(element) = scene.get_mut(*id) {
            element.placement.center = Point::new(x, y);
            element.placement.rotation = degrees.to_radians();
        }
    }
    scene.mark_modified(ids.clone());
    ids
}

/// Drop a 5x5 block of randomly colored squares centered on `at`.
pub fn pixelate<R: Rng + ?Sized>(scene: &mut CardScene, at: Point, rng: &mut R) -> Vec<ElementId> {
    let half = PIXEL_GRID as f64 * PIXEL_PITCH / 2.0;
    let side = PIXEL_PITCH - 2.0;
    let mut ids = Vec::with_capacity(PIXEL_GRID * PIXEL_GRID);
    for i in 0..PIXEL_GRID {
        for j in 0..PIXEL_GRID {
            let color = PIXEL_COLORS.choose(rng).copied().unwrap_or(PIXEL_COLORS[0]);
            let center = Point::new(
                at.x - half + i as f64 * PIXEL_PITCH + side / 2.0,
                at.y - half + j as f64 * PIXEL_PITCH + side / 2.0,
            );
            let element = Element::new(
                ElementTag::Effect,
                Placement::at(center),
                ElementKind::Figure(Figure::new(ShapeKind::Square, side, color)),
            );
            ids.push(scene.add(element));
        }
    }
    ids
}

/// Pointer-trail state for the drag effects.
#[derive(Debug, Clone, Default)]
pub struct EffectTrail {
    hue: f64,
    last: Option<Point>,
}

impl EffectTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, point: Point) {
        self.last = Some(point);
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    /// Stop the trail. Returns whether one was in progress.
    pub fn end(&mut self) -> bool {
        self.last.take().is_some()
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Paint the next trail mark for `effect` at `point`, if any.
    pub fn extend<R: Rng + ?Sized>(
        &mut self,
        scene: &mut CardScene,
        effect: WackyEffect,
        point: Point,
        rng: &mut R,
    ) -> Option<ElementId> {
        let last = self.last?;
        match effect {
            WackyEffect::Rainbow => {
                self.hue = (self.hue + RAINBOW_HUE_STEP) % 360.0;
                let color = SerializableColor::from_hsl(self.hue, 1.0, 0.5);
                let dot = Element::new(
                    ElementTag::Effect,
                    Placement::at(point),
                    ElementKind::Figure(Figure::new(ShapeKind::Circle, RAINBOW_RADIUS * 2.0, color)),
                );
                self.last = Some(point);
                Some(scene.add(dot))
            }
            WackyEffect::Smear => {
                let delta = point - last;
                if delta.hypot() <= SMEAR_MIN_DISTANCE {
                    return None;
                }
                let color = SMEAR_COLORS.choose(rng).copied().unwrap_or(SMEAR_COLORS[0]);
                let mut placement = Placement::at(point);
                placement.scale_x = 1.5;
                placement.rotation = delta.y.atan2(delta.x);
                let smudge = Element::new(
                    ElementTag::Effect,
                    placement,
                    ElementKind::Figure(Figure::new(ShapeKind::Circle, SMEAR_RADIUS * 2.0, color)),
                )
                .with_opacity(0.6);
                self.last = Some(point);
                Some(scene.add(smudge))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::{FillPattern, fill_background};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scene_with_dot(x: f64) -> (CardScene, ElementId) {
        let mut scene = CardScene::new(800.0, 600.0);
        let id = scene.add(Element::new(
            ElementTag::Shape,
            Placement::at(Point::new(x, 100.0)),
            ElementKind::Figure(Figure::new(ShapeKind::Star, 40.0, SerializableColor::black())),
        ));
        (scene, id)
    }

    #[test]
    fn test_mirror_skips_background() {
        let (mut scene, id) = scene_with_dot(100.0);
        let bg = fill_background(&mut scene, SerializableColor::black(), FillPattern::Dots).expect("backdrop");
        let before = scene.get(bg).cloned();

        let moved = mirror(&mut scene);
        assert_eq!(moved, vec![id]);
        let element = scene.get(id).expect("element");
        assert!((element.placement.center.x - 700.0).abs() < 1e-9);
        assert!(element.placement.flip_x);
        assert_eq!(scene.get(bg).cloned(), before);
    }

    #[test]
    fn test_scramble_bounds() {
        let (mut scene, id) = scene_with_dot(100.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            scramble(&mut scene, &mut rng);
            let p = scene.get(id).expect("element").placement;
            assert!((50.0..=750.0).contains(&p.center.x));
            assert!((50.0..=550.0).contains(&p.center.y));
            assert!((0.0..=360.0 + 1e-9).contains(&p.rotation_degrees()));
        }
    }

    #[test]
    fn test_pixelate_grid() {
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ids = pixelate(&mut scene, Point::new(400.0, 300.0), &mut rng);
        assert_eq!(ids.len(), 25);
        let first = scene.get(ids[0]).expect("pixel").bounds();
        assert!((first.x0 - 350.0).abs() < 1e-9);
        assert!((first.width() - 18.0).abs() < 1e-9);
        for id in ids {
            let element = scene.get(id).expect("pixel");
            assert_eq!(element.tag, ElementTag::Effect);
            let ElementKind::Figure(fig) = &element.kind else {
                panic!("pixel should be a figure");
            };
            assert!(PIXEL_COLORS.contains(&fig.fill));
        }
    }

    #[test]
    fn test_rainbow_hue_advances() {
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut trail = EffectTrail::new();
        assert!(trail.extend(&mut scene, WackyEffect::Rainbow, Point::new(1.0, 1.0), &mut rng).is_none());

        trail.begin(Point::new(0.0, 0.0));
        for i in 0..72 {
            trail.extend(&mut scene, WackyEffect::Rainbow, Point::new(i as f64, 0.0), &mut rng);
        }
        assert_eq!(scene.len(), 72);
        assert!(trail.hue().abs() < 1e-9);
        assert!(trail.end());
        assert!(!trail.is_active());
    }

    #[test]
    fn test_smear_needs_distance() {
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut trail = EffectTrail::new();
        trail.begin(Point::new(0.0, 0.0));
        assert!(trail.extend(&mut scene, WackyEffect::Smear, Point::new(3.0, 0.0), &mut rng).is_none());
        let id = trail
            .extend(&mut scene, WackyEffect::Smear, Point::new(0.0, 10.0), &mut rng)
            .expect("smudge");
        let element = scene.get(id).expect("smudge");
        assert!((element.opacity - 0.6).abs() < 1e-9);
        assert!((element.placement.scale_x - 1.5).abs() < 1e-9);
        assert!((element.placement.rotation_degrees() - 90.0).abs() < 1e-9);
    }
}
