//! Integration tests: random design composition over many seeds.

mod common;

use cardsmith_core::elements::DesignRole;
use cardsmith_core::composer::SlotRole;
use cardsmith_core::{CardScene, ElementTag, MemoryAssetLoader, TEMPLATES, compose};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

fn pictures(scene: &CardScene, role: DesignRole) -> Vec<String> {
    scene
        .elements_ordered()
        .filter(|e| e.tag == ElementTag::Design(role))
        .filter_map(|e| e.kind.as_picture().map(|p| p.source.clone()))
        .collect()
}

#[test]
fn test_characters_never_repeat() {
    let loader = common::library_loader();
    for seed in 0..40 {
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(seed);
        pollster::block_on(compose(&mut scene, &loader, &mut rng));

        let characters = pictures(&scene, DesignRole::Character);
        let unique: HashSet<_> = characters.iter().collect();
        assert!(characters.len() <= 4, "seed {seed}");
        assert_eq!(unique.len(), characters.len(), "seed {seed}: {characters:?}");
    }
}

#[test]
fn test_stamps_are_unique_and_counted() {
    let loader = common::library_loader();
    for seed in 0..40 {
        let mut scene = CardScene::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(seed);
        pollster::block_on(compose(&mut scene, &loader, &mut rng));

        let stamps = pictures(&scene, DesignRole::Stamp);
        let unique: HashSet<_> = stamps.iter().collect();
        assert!((8..=10).contains(&stamps.len()), "seed {seed}");
        assert_eq!(unique.len(), stamps.len());
    }
}

#[test]
fn test_caption_is_topmost_and_background_at_back() {
    let loader = common::library_loader();
    for seed in 0..20 {
        let mut scene = CardScene::new(1024.0, 768.0);
        let mut rng = StdRng::seed_from_u64(seed);
        let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));

        assert_eq!(scene.topmost(), report.caption);
        assert_eq!(scene.ids_with_tag(ElementTag::Background).len(), 1);
        assert_eq!(scene.z_order().first().copied(), scene.background_element());
        assert!(TEMPLATES.iter().any(|t| t.name == report.template));
    }
}

#[test]
fn test_element_counts_match_template() {
    let loader = common::library_loader();
    let mut scene = CardScene::new(800.0, 600.0);
    let mut rng = StdRng::seed_from_u64(99);
    let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));

    let template = TEMPLATES
        .iter()
        .find(|t| t.name == report.template)
        .expect("template");
    let stamps = pictures(&scene, DesignRole::Stamp).len();
    let decorations = template.slots.iter().filter(|s| s.role == SlotRole::Decoration).count();
    assert_eq!(pictures(&scene, DesignRole::Decoration).len(), decorations);
    // background + balloons + template slots + stamps + centerpiece + caption
    let expected = 1 + 10 + template.slots.len() + stamps + 1 + 1;
    assert_eq!(scene.len(), expected);
    assert_eq!(pictures(&scene, DesignRole::Balloon).len(), 10);
}

#[test]
fn test_every_load_failing_still_finishes() {
    let loader = MemoryAssetLoader::new();
    let mut scene = CardScene::new(800.0, 600.0);
    let mut rng = StdRng::seed_from_u64(1);
    let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));

    assert_eq!(scene.len(), 1);
    assert_eq!(scene.topmost(), report.caption);
    assert!(report.skipped.len() >= 1 + 10 + 8 + 1);
}

#[test]
fn test_zero_sized_canvas_is_accepted() {
    let loader = common::library_loader();
    let mut scene = CardScene::new(0.0, 0.0);
    let mut rng = StdRng::seed_from_u64(4);
    let report = pollster::block_on(compose(&mut scene, &loader, &mut rng));
    assert!(report.caption.is_some());
    assert!(report.skipped.is_empty());
}
