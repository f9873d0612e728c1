//! Random design composer.
//!
//! Builds a complete card from the asset library: a cover-scaled background,
//! a ring of balloons, template-driven decorations and characters, scattered
//! stamps, a large centerpiece and a caption on top. Placements run strictly
//! in order so the stacking is the same no matter how long each load takes.

use crate::assets::{AssetLoader, BACKGROUNDS, BALLOONS, CAKES, CAPTIONS, CHARACTERS, DECORATIONS, STAMPS};
use crate::elements::{
    CardFont, DesignRole, Element, ElementId, ElementKind, ElementTag, Picture, Placement, SerializableColor, Text,
    TextShadow,
};
use crate::scene::CardScene;
use kurbo::Point;
use rand::Rng;
use rand::seq::IndexedRandom;

/// What a template slot is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    /// Drawn from the decoration set, repeats allowed.
    Decoration,
    /// Drawn from the per-card unique character picks.
    Character,
}

/// One placement in a design template, in canvas fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateSlot {
    pub role: SlotRole,
    pub fx: f64,
    pub fy: f64,
    pub size: f64,
    /// Rotation in degrees.
    pub angle: f64,
}

const fn slot(role: SlotRole, fx: f64, fy: f64, size: f64, angle: f64) -> TemplateSlot {
    TemplateSlot { role, fx, fy, size, angle }
}

/// A named layout of decorations and characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignTemplate {
    pub name: &'static str,
    pub slots: &'static [TemplateSlot],
}

use SlotRole::{Character, Decoration};

pub const TEMPLATES: [DesignTemplate; 5] = [
    DesignTemplate {
        name: "corner-decorations",
        slots: &[
            slot(Decoration, 0.12, 0.12, 70.0, -15.0),
            slot(Decoration, 0.88, 0.12, 70.0, 15.0),
            slot(Character, 0.15, 0.55, 120.0, 0.0),
            slot(Character, 0.85, 0.55, 120.0, 0.0),
        ],
    },
    DesignTemplate {
        name: "frame-style",
        slots: &[
            slot(Decoration, 0.15, 0.08, 60.0, -10.0),
            slot(Decoration, 0.85, 0.08, 60.0, 10.0),
            slot(Character, 0.12, 0.5, 110.0, 0.0),
            slot(Character, 0.88, 0.5, 110.0, 0.0),
        ],
    },
    DesignTemplate {
        name: "scattered-fun",
        slots: &[
            slot(Character, 0.15, 0.45, 100.0, 0.0),
            slot(Character, 0.85, 0.5, 100.0, 0.0),
            slot(Character, 0.2, 0.8, 90.0, 0.0),
            slot(Decoration, 0.1, 0.15, 60.0, 0.0),
            slot(Decoration, 0.9, 0.15, 60.0, 0.0),
        ],
    },
    DesignTemplate {
        name: "elegant-minimal",
        slots: &[
            slot(Character, 0.15, 0.5, 130.0, 0.0),
            slot(Character, 0.85, 0.5, 130.0, 0.0),
            slot(Decoration, 0.1, 0.1, 50.0, -10.0),
            slot(Decoration, 0.9, 0.1, 50.0, 10.0),
        ],
    },
    DesignTemplate {
        name: "party-explosion",
        slots: &[
            slot(Character, 0.12, 0.4, 100.0, 0.0),
            slot(Character, 0.88, 0.4, 100.0, 0.0),
            slot(Character, 0.2, 0.75, 90.0, 0.0),
            slot(Character, 0.8, 0.75, 90.0, 0.0),
            slot(Decoration, 0.1, 0.1, 55.0, -15.0),
            slot(Decoration, 0.9, 0.1, 55.0, 15.0),
        ],
    },
];

/// Anchor points for balloons, cycled when there are more balloons than anchors.
pub const BALLOON_POSITIONS: [(f64, f64); 11] = [
    (0.1, 0.2),
    (0.9, 0.15),
    (0.15, 0.6),
    (0.85, 0.55),
    (0.05, 0.85),
    (0.95, 0.8),
    (0.3, 0.1),
    (0.7, 0.08),
    (0.5, 0.9),
    (0.2, 0.45),
    (0.8, 0.4),
];

pub const BALLOON_COUNT: usize = 10;
const BALLOON_JITTER: f64 = 0.1;
const UNIQUE_CHARACTERS: usize = 4;
const MIN_STAMPS: usize = 8;
const STAMP_SIZE: f64 = 64.0;
const CENTERPIECE_SIZE: f64 = 500.0;
const CENTERPIECE_Y: f64 = 0.62;
const CAPTION_OFFSET: f64 = 280.0;
const CAPTION_SIZE: f64 = 72.0;

/// Summary of one random design run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionReport {
    pub template: &'static str,
    pub background: &'static str,
    pub caption_color: SerializableColor,
    /// Every element added, back to front.
    pub placed: Vec<ElementId>,
    /// Asset paths that failed to load.
    pub skipped: Vec<String>,
    pub caption: Option<ElementId>,
}

/// Compose a random card onto `scene`, replacing its contents.
///
/// Asset failures are logged and skipped; the run always completes.
pub async fn compose<L, R>(scene: &mut CardScene, loader: &L, rng: &mut R) -> CompositionReport
where
    L: AssetLoader + ?Sized,
    R: Rng + ?Sized,
{
    scene.clear();
    scene.set_background(SerializableColor::white());
    let (width, height) = scene.size();

    let background = *BACKGROUNDS.choose(rng).unwrap_or(&BACKGROUNDS[0]);
    let template = *TEMPLATES.choose(rng).unwrap_or(&TEMPLATES[0]);
    log::info!("Composing random design: template {}, background {}", template.name, background.path);

    let mut report = CompositionReport {
        template: template.name,
        background: background.path,
        caption_color: SerializableColor::white(),
        placed: Vec::new(),
        skipped: Vec::new(),
        caption: None,
    };

    // Background covers the canvas, anchored at the top-left corner.
    if let Some(picture) = load_picture(loader, background.path, &mut report).await {
        let scale = picture.scale_to_cover(width, height);
        let center = Point::new(
            picture.natural_width as f64 * scale / 2.0,
            picture.natural_height as f64 * scale / 2.0,
        );
        let element = Element::new(
            ElementTag::Background,
            Placement::at(center).with_scale(scale),
            ElementKind::Picture(picture),
        )
        .with_selectable(false);
        let id = scene.add(element);
        scene.send_to_back(id);
        report.placed.push(id);
    }

    let characters: Vec<&'static str> = CHARACTERS.choose_multiple(rng, UNIQUE_CHARACTERS).copied().collect();
    let mut next_character = 0usize;

    for i in 0..BALLOON_COUNT {
        let (px, py) = BALLOON_POSITIONS[i % BALLOON_POSITIONS.len()];
        let jitter_x = (rng.random::<f64>() - 0.5) * BALLOON_JITTER;
        let jitter_y = (rng.random::<f64>() - 0.5) * BALLOON_JITTER;
        let angle = rng.random::<f64>() * 30.0 - 15.0;
        let size = 100.0 + rng.random::<f64>() * 100.0;
        let path = *BALLOONS.choose(rng).unwrap_or(&BALLOONS[0]);
        let center = Point::new(width * (px + jitter_x), height * (py + jitter_y));
        place(scene, loader, &mut report, path, center, size, angle, DesignRole::Balloon).await;
    }

    for slot in template.slots {
        let (path, role) = match slot.role {
            SlotRole::Decoration => (*DECORATIONS.choose(rng).unwrap_or(&DECORATIONS[0]), DesignRole::Decoration),
            SlotRole::Character => {
                let Some(path) = characters.get(next_character % characters.len().max(1)).copied() else {
                    continue;
                };
                next_character += 1;
                (path, DesignRole::Character)
            }
        };
        let center = Point::new(width * slot.fx, height * slot.fy);
        place(scene, loader, &mut report, path, center, slot.size, slot.angle, role).await;
    }

    let stamp_count = MIN_STAMPS + rng.random_range(0..3);
    let stamps: Vec<&'static str> = STAMPS.choose_multiple(rng, stamp_count).copied().collect();
    for path in stamps {
        let fx = 0.1 + rng.random::<f64>() * 0.8;
        let fy = 0.1 + rng.random::<f64>() * 0.75;
        let angle = rng.random::<f64>() * 40.0 - 20.0;
        let center = Point::new(width * fx, height * fy);
        place(scene, loader, &mut report, path, center, STAMP_SIZE, angle, DesignRole::Stamp).await;
    }

    let food_y = height * CENTERPIECE_Y;
    let cake = *CAKES.choose(rng).unwrap_or(&CAKES[0]);
    place(
        scene,
        loader,
        &mut report,
        cake,
        Point::new(width * 0.5, food_y),
        CENTERPIECE_SIZE,
        0.0,
        DesignRole::Centerpiece,
    )
    .await;

    let phrase = *CAPTIONS.choose(rng).unwrap_or(&CAPTIONS[0]);
    let font = *CardFont::CAPTION_FONTS.choose(rng).unwrap_or(&CardFont::Bubble);
    let color_index = rng.random_range(0..background.text_colors.len());
    let color = background.text_color(color_index);
    let mut caption = Text::new(phrase, font, CAPTION_SIZE, color).with_shadow(TextShadow::default());
    if color == SerializableColor::white() {
        caption = caption.with_outline(SerializableColor::new(0xff, 0x14, 0x93, 255), 1.0);
    }
    let caption_id = scene.add(Element::new(
        ElementTag::Design(DesignRole::Caption),
        Placement::at(Point::new(width / 2.0, food_y - CAPTION_OFFSET)),
        ElementKind::Text(caption),
    ));
    scene.bring_to_front(caption_id);
    report.placed.push(caption_id);
    report.caption = Some(caption_id);
    report.caption_color = color;

    log::info!(
        "Random design placed {} elements, skipped {}",
        report.placed.len(),
        report.skipped.len()
    );
    report
}

async fn load_picture<L: AssetLoader + ?Sized>(
    loader: &L,
    path: &str,
    report: &mut CompositionReport,
) -> Option<Picture> {
    match loader.load(path).await {
        Ok(image) => Some(image.into_picture()),
        Err(e) => {
            log::warn!("Failed to load image {path}: {e}");
            report.skipped.push(path.to_string());
            None
        }
    }
}

/// Load an asset and place it centered at `center`, larger side equal to `size`.
#[allow(clippy::too_many_arguments)]
async fn place<L: AssetLoader + ?Sized>(
    scene: &mut CardScene,
    loader: &L,
    report: &mut CompositionReport,
    path: &str,
    center: Point,
    size: f64,
    angle: f64,
    role: DesignRole,
) -> Option<ElementId> {
    let picture = load_picture(loader, path, report).await?;
    let placement = Placement::at(center)
        .with_scale(picture.scale_to_fit(size))
        .with_rotation_degrees(angle);
    let id = scene.add(Element::new(ElementTag::Design(role), placement, ElementKind::Picture(picture)));
    report.placed.push(id);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetLoader;
    use crate::testing::{library_loader, png_bytes};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn sources_with_role(scene: &CardScene, role: DesignRole) -> Vec<String> {
        scene
            .elements_ordered()
            .filter(|e| e.tag == ElementTag::Design(role))
            .filter_map(|e| e.kind.as_picture().map(|p| p.source.clone()))
            .collect()
    }

    #[test]
    fn test_templates_use_at_most_four_characters() {
        for template in TEMPLATES {
            let characters = template.slots.iter().filter(|s| s.role == SlotRole::Character).count();
            assert!(characters <= UNIQUE_CHARACTERS, "{}", template.name);
        }
    }

    #[test]
    fn test_full_composition() {
        let loader = library_loader();
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(11);
        let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));

        assert!(report.skipped.is_empty());
        assert_eq!(scene.topmost(), report.caption);
        assert_eq!(scene.background_element(), scene.z_order().first().copied());
        assert_eq!(sources_with_role(&scene, DesignRole::Balloon).len(), BALLOON_COUNT);
        assert_eq!(sources_with_role(&scene, DesignRole::Centerpiece).len(), 1);
        assert_eq!(report.placed.len(), scene.len());
    }

    #[test]
    fn test_background_covers_canvas() {
        let loader = library_loader();
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(5);
        pollster::block_on(compose(&mut scene, &loader, &mut rng));

        let bg = scene.background_element().and_then(|id| scene.get(id)).expect("background");
        let bounds = bg.bounds();
        assert!(bounds.x0.abs() < 1e-6 && bounds.y0.abs() < 1e-6);
        assert!(bounds.x1 >= 800.0 - 1e-6 && bounds.y1 >= 600.0 - 1e-6);
        assert!(!bg.selectable);
    }

    #[test]
    fn test_stamps_unique_and_counted() {
        let loader = library_loader();
        for seed in 0..20 {
            let mut scene = CardScene::new(800.0, 600.0);
            let mut rng = StdRng::seed_from_u64(seed);
            pollster::block_on(compose(&mut scene, &loader, &mut rng));

            let stamps = sources_with_role(&scene, DesignRole::Stamp);
            let unique: HashSet<_> = stamps.iter().collect();
            assert!((8..=10).contains(&stamps.len()), "seed {seed}: {}", stamps.len());
            assert_eq!(unique.len(), stamps.len());

            let characters = sources_with_role(&scene, DesignRole::Character);
            let unique: HashSet<_> = characters.iter().collect();
            assert!(characters.len() <= 4);
            assert_eq!(unique.len(), characters.len());
        }
    }

    #[test]
    fn test_caption_outline_on_white() {
        let loader = library_loader();
        for seed in 0..30 {
            let mut scene = CardScene::new(800.0, 600.0);
            let mut rng = StdRng::seed_from_u64(seed);
            let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));
            let caption = report.caption.and_then(|id| scene.get(id)).expect("caption");
            let text = caption.kind.as_text().expect("text");
            assert!((text.font_size - 72.0).abs() < f64::EPSILON);
            assert!(text.shadow.is_some());
            assert_eq!(text.outline.is_some(), text.fill == SerializableColor::white());
            assert!((caption.placement.center.y - (600.0 * 0.62 - 280.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_assets_are_skipped() {
        let loader = MemoryAssetLoader::new().with("/images/cake-food/cake.png", png_bytes(10, 10));
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(2);
        let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));

        assert!(!report.skipped.is_empty());
        assert_eq!(scene.topmost(), report.caption);
        assert!(scene.background_element().is_none());
    }
}
