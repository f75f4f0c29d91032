use std::sync::Arc;

use super::*;
use crate::assets::costume::{Costume, CostumeFormat};
use crate::engine::{Engine, HeadlessEngine};
use crate::foundation::core::Point;
use crate::pen::color::ColorInput;
use crate::render::opts::RenderOpts;
use crate::skin::tests::png_bytes;
use crate::target::model::SpriteProps;

const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const GREEN: [u8; 3] = [0, 255, 0];

fn square(id: &str, px: [u8; 4]) -> Costume {
    Costume::new(id, CostumeFormat::Bitmap, png_bytes(4, 4, px))
        .with_rotation_center(Point::new(2.0, 2.0))
}

fn scene() -> (Scene, EngineId) {
    let mut scene = Scene::software(RenderOpts::default());
    let engine = Arc::new(HeadlessEngine::new(1));
    let id = engine.id();
    scene.attach_engine(engine).unwrap();
    (scene, id)
}

fn sprite(scene: &mut Scene, engine: EngineId, costume: Costume, x: f64, y: f64) -> TargetId {
    let props = SpriteProps {
        x,
        y,
        ..SpriteProps::default()
    };
    scene.add_sprite(engine, "s", vec![costume], props).unwrap()
}

#[test]
fn colour_masks_ignore_low_bits() {
    assert!(color_matches([0x80, 0x40, 0x20], [0x87, 0x47, 0x2f]));
    assert!(!color_matches([0x80, 0x40, 0x20], [0x88, 0x40, 0x20]));
    assert!(!color_matches([0x80, 0x40, 0x20], [0x80, 0x40, 0x30]));
}

#[test]
fn distant_sprites_are_rejected_without_scanning() {
    let (mut scene, engine) = scene();
    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    let b = sprite(&mut scene, engine, square("b", [0, 0, 255, 255]), 100.0, 0.0);

    assert!(!scene.touching_targets(a, &[b]));
    assert!(!scene.touching_color(a, BLUE));
    assert_eq!(
        scene.query_stats(),
        QueryStats {
            queries: 2,
            points_scanned: 0
        }
    );

    scene.reset_query_stats();
    assert_eq!(scene.query_stats(), QueryStats::default());
}

#[test]
fn clones_at_the_same_spot_touch() {
    let (mut scene, engine) = scene();
    let root = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    let other = sprite(&mut scene, engine, square("b", [0, 0, 255, 255]), 50.0, 0.0);
    assert!(!scene.touching_clones(other, root));

    let clone = scene.clone_sprite(root);
    assert!(scene.touching_clones(root, root));
    assert!(scene.touching_clones(clone, root));

    scene.set_position(clone, 50.0, 0.0);
    assert!(scene.touching_clones(other, root));
    assert!(scene.touching_clones(clone, other));

    scene.set_visible(clone, false);
    assert!(!scene.touching_clones(other, root));
}

#[test]
fn hidden_targets_touch_nothing() {
    let (mut scene, engine) = scene();
    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    let b = sprite(&mut scene, engine, square("b", [255, 0, 0, 255]), 0.0, 0.0);
    assert!(scene.touching_targets(a, &[b]));
    scene.set_visible(a, false);
    assert!(!scene.touching_targets(a, &[b]));
    assert!(!scene.touching_point(a, -2.0, 2.0));
}

#[test]
fn point_hits_land_on_hull_vertices() {
    let (mut scene, engine) = scene();
    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    assert!(scene.touching_point(a, -2.0, 2.0));
    assert!(scene.touching_point(a, 1.0, -1.0));
    assert!(!scene.touching_point(a, 0.0, 0.0));
    assert!(!scene.touching_point(a, 40.0, 0.0));
}

#[test]
fn white_matches_the_empty_stage() {
    let (mut scene, engine) = scene();
    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    assert!(scene.touching_color(a, [255, 255, 255]));
    assert!(scene.query_stats().points_scanned > 0);
    assert!(!scene.touching_color(a, RED));
}

#[test]
fn colour_underneath_is_sensed() {
    let (mut scene, engine) = scene();
    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    sprite(&mut scene, engine, square("b", [0, 0, 255, 255]), 1.0, 0.0);

    assert!(scene.touching_color(a, BLUE));
    assert!(!scene.touching_color(a, GREEN));

    assert!(scene.color_touching_color(a, BLUE, RED));
    assert!(!scene.color_touching_color(a, BLUE, GREEN));
}

#[test]
fn pen_trails_count_as_colour() {
    let (mut scene, engine) = scene();
    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    assert!(!scene.touching_color(a, BLUE));

    let pen = scene
        .add_sprite(engine, "pen", Vec::new(), SpriteProps::default())
        .unwrap();
    scene.set_pen_color_to_color(pen, &ColorInput::from("#0000ff"));
    scene.set_pen_size(pen, 4.0);
    scene.set_position(pen, 1.0, 2.0);
    scene.pen_down(pen);

    assert!(scene.touching_color(a, BLUE));
    assert_eq!(scene.sample_color3b(engine, 1.0, 2.0), RED);

    scene.clear_pen(engine);
    assert!(!scene.touching_color(a, BLUE));
}

#[test]
fn sampling_blends_layers_over_white() {
    let (mut scene, engine) = scene();
    assert_eq!(scene.sample_color3b(engine, 0.0, 0.0), [255, 255, 255]);

    let a = sprite(&mut scene, engine, square("a", [255, 0, 0, 255]), 0.0, 0.0);
    assert_eq!(scene.sample_color3b(engine, 0.0, 0.0), RED);

    scene.set_effect(a, "ghost", 100.0);
    assert_eq!(scene.sample_color3b(engine, 0.0, 0.0), [255, 255, 255]);

    scene.set_effect(a, "ghost", 50.0);
    let [r, g, b] = scene.sample_color3b(engine, 0.0, 0.0);
    assert_eq!(r, 255);
    assert!((120..=135).contains(&g), "g = {g}");
    assert_eq!(g, b);
}

#[test]
fn pixelate_blocks_match_between_frames_and_samples_at_any_stage_scale() {
    let mut scene = Scene::software(RenderOpts::default());
    let engine = Arc::new(HeadlessEngine::with_stage_size(1, 40, 40));
    let engine_id = engine.id();
    scene.attach_engine(engine).unwrap();
    scene.set_stage_scale(2.0).unwrap();

    // 6-unit red strip down the left edge of a 40x40 costume.
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40">
        <rect x="0" y="0" width="6" height="40" fill="#ff0000"/></svg>"##;
    let strip = Costume::new("strip", CostumeFormat::Svg, svg.to_vec())
        .with_rotation_center(Point::new(20.0, 20.0));
    let id = sprite(&mut scene, engine_id, strip, 0.0, 0.0);
    // 4 blocks of 10 stage units; the leftmost one samples the strip.
    scene.set_effect(id, "pixelate", 100.0);

    let frame = scene.render_frame(engine_id).unwrap();
    assert_eq!(frame.width, 80);
    // stage (-11.5, -0.5) is frame pixel (17, 41)
    assert_eq!(frame.pixel(17, 41), Some([255, 0, 0, 255]));
    assert_eq!(scene.sample_color3b(engine_id, -11.5, -0.5), RED);

    // The next block to the right samples transparent costume.
    assert_eq!(frame.pixel(23, 41), Some([0, 0, 0, 0]));
    assert_eq!(scene.sample_color3b(engine_id, -8.5, -0.5), [255, 255, 255]);
}
