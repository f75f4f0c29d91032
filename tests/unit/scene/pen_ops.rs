use std::sync::Arc;

use super::*;
use crate::engine::{Engine, HeadlessEngine};
use crate::foundation::core::Rgba8Premul;
use crate::render::opts::RenderOpts;
use crate::target::model::SpriteProps;

fn scene() -> (Scene, Arc<HeadlessEngine>, TargetId) {
    let mut scene = Scene::software(RenderOpts::default().with_antialiasing(false));
    let engine = Arc::new(HeadlessEngine::with_stage_size(1, 40, 30));
    scene.attach_engine(engine.clone()).unwrap();
    let id = scene
        .add_sprite(engine.id(), "pen", Vec::new(), SpriteProps::default())
        .unwrap();
    (scene, engine, id)
}

fn pen_pixel(scene: &mut Scene, engine: EngineId, x: usize, y: usize) -> [u8; 4] {
    let texture = scene.pen_layer(engine).unwrap().texture();
    let pixels = scene
        .context_mut()
        .gpu()
        .read_pixels(texture)
        .unwrap()
        .into_top_down();
    let i = (y * pixels.width as usize + x) * 4;
    Rgba8Premul::from_slice(&pixels.data[i..i + 4]).to_array()
}

#[test]
fn moving_with_the_pen_up_draws_nothing() {
    let (mut scene, engine, id) = scene();
    scene.set_position(id, 10.0, 5.0);
    assert_eq!(scene.target(id).rendered.position().x, 10.0);
    assert_eq!(scene.target(id).as_sprite().unwrap().props.y, 5.0);
    assert_eq!(scene.context().gpu_ref().stats().lines_stroked, 0);
    assert_eq!(engine.redraw_requests(), 0);
}

#[test]
fn pen_down_leaves_a_dot_and_trails() {
    let (mut scene, engine, id) = scene();
    scene.set_pen_color_to_color(id, &"#ff0000".into());
    scene.set_pen_size(id, 2.0);
    scene.pen_down(id);
    assert!(scene.pen_state(id).pen_down);
    assert_eq!(scene.context().gpu_ref().stats().lines_stroked, 1);

    scene.set_position(id, 10.0, 0.0);
    assert_eq!(scene.context().gpu_ref().stats().lines_stroked, 2);
    assert_eq!(engine.redraw_requests(), 2);
    // stage (5, 0) on a 40x30 stage is pixel (25, 15)
    assert_eq!(pen_pixel(&mut scene, engine.id(), 25, 14), [255, 0, 0, 255]);

    scene.pen_up(id);
    scene.set_position(id, -10.0, 0.0);
    assert_eq!(scene.context().gpu_ref().stats().lines_stroked, 2);
}

#[test]
fn clearing_empties_the_layer() {
    let (mut scene, engine, id) = scene();
    scene.set_pen_size(id, 6.0);
    scene.pen_down(id);
    assert_ne!(
        scene.sample_color3b(engine.id(), 0.0, 0.0),
        [255, 255, 255]
    );
    scene.clear_pen(engine.id());
    assert_eq!(
        scene.sample_color3b(engine.id(), 0.0, 0.0),
        [255, 255, 255]
    );
    assert_eq!(pen_pixel(&mut scene, engine.id(), 20, 15), [0, 0, 0, 0]);
}

#[test]
fn stamping_copies_the_costume() {
    use crate::assets::costume::{Costume, CostumeFormat};
    use crate::foundation::core::Point;
    use crate::skin::tests::png_bytes;

    let (mut scene, engine, _) = scene();
    let costume = Costume::new("g", CostumeFormat::Bitmap, png_bytes(4, 4, [0, 255, 0, 255]))
        .with_rotation_center(Point::new(2.0, 2.0));
    let sprite = scene
        .add_sprite(engine.id(), "g", vec![costume], SpriteProps::default())
        .unwrap();
    scene.stamp(sprite);
    scene.set_position(sprite, 15.0, 0.0);

    assert_eq!(pen_pixel(&mut scene, engine.id(), 20, 15), [0, 255, 0, 255]);
    assert_eq!(scene.context().gpu_ref().stats().quads_drawn, 1);
}

#[test]
fn pen_parameters_by_name() {
    let (mut scene, _, id) = scene();
    assert!(scene.set_pen_color_param(id, "saturation", 40.0));
    assert!(scene.change_pen_color_param(id, "brightness", -30.0));
    assert!(scene.set_pen_color_param(id, "color", 150.0));
    assert!(!scene.set_pen_color_param(id, "sparkle", 1.0));
    assert!(!scene.change_pen_color_param(id, "sparkle", 1.0));

    let pen = scene.pen_state(id);
    assert_eq!(pen.saturation, 40.0);
    assert_eq!(pen.brightness, 70.0);
    assert_eq!(pen.color, 49.0);

    scene.change_pen_size(id, 5000.0);
    assert_eq!(scene.pen_state(id).pen_attributes.diameter, 1200.0);
    scene.set_pen_size(id, 0.0);
    assert_eq!(scene.pen_state(id).pen_attributes.diameter, 1.0);
}

#[test]
fn legacy_shade_and_hue() {
    let (mut scene, _, id) = scene();
    scene.set_pen_hue(id, 100.0);
    assert_eq!(scene.pen_state(id).color, 50.0);
    scene.change_pen_hue(id, 20.0);
    assert_eq!(scene.pen_state(id).color, 60.0);

    scene.set_pen_shade(id, 250.0);
    assert_eq!(scene.pen_state(id).shade, 50.0);
    scene.change_pen_shade(id, -60.0);
    assert_eq!(scene.pen_state(id).shade, 190.0);
}
