use super::*;

fn fx(pairs: &[(Effect, f64)]) -> (EffectMask, GraphicEffects) {
    let mut out = GraphicEffects::new();
    for &(e, v) in pairs {
        out.set(e, v);
    }
    (out.mask(), out)
}

#[test]
fn no_effects_returns_input_unchanged() {
    let (mask, effects) = fx(&[]);
    for c in [
        Rgba8Premul::new(10, 20, 30, 40),
        Rgba8Premul::opaque(255, 0, 128),
        Rgba8Premul::transparent(),
    ] {
        assert_eq!(transform_color(mask, &effects, c), c);
    }
}

#[test]
fn full_ghost_is_always_transparent() {
    let (mask, effects) = fx(&[
        (Effect::Ghost, 100.0),
        (Effect::Color, 40.0),
        (Effect::Brightness, 70.0),
    ]);
    for c in [
        Rgba8Premul::opaque(255, 255, 255),
        Rgba8Premul::new(12, 40, 3, 90),
    ] {
        assert_eq!(transform_color(mask, &effects, c), Rgba8Premul::transparent());
    }
}

#[test]
fn ghost_applies_without_its_mask_bit() {
    let (_, effects) = fx(&[(Effect::Ghost, 50.0)]);
    let out = transform_color(EffectMask::EMPTY, &effects, Rgba8Premul::opaque(200, 100, 0));
    assert_eq!(out, Rgba8Premul::new(100, 50, 0, 128));
}

#[test]
fn color_effect_rotates_hue() {
    let (mask, effects) = fx(&[(Effect::Color, 100.0)]);
    let out = transform_color(mask, &effects, Rgba8Premul::opaque(255, 0, 0));
    assert_eq!(out, Rgba8Premul::opaque(0, 255, 255));
}

#[test]
fn brightness_adds_and_clamps() {
    let (mask, effects) = fx(&[(Effect::Brightness, 100.0)]);
    assert_eq!(
        transform_color(mask, &effects, Rgba8Premul::opaque(0, 0, 0)),
        Rgba8Premul::opaque(255, 255, 255)
    );
    assert_eq!(
        transform_color(mask, &effects, Rgba8Premul::new(50, 50, 50, 128)),
        Rgba8Premul::new(128, 128, 128, 128)
    );

    let (mask, effects) = fx(&[(Effect::Brightness, -100.0)]);
    assert_eq!(
        transform_color(mask, &effects, Rgba8Premul::opaque(90, 180, 250)),
        Rgba8Premul::opaque(0, 0, 0)
    );
}

#[test]
fn transparent_pixels_short_circuit() {
    let (mask, effects) = fx(&[(Effect::Brightness, 100.0)]);
    let c = Rgba8Premul::transparent();
    assert_eq!(transform_color(mask, &effects, c), c);
}

#[test]
fn point_identity_without_shape_effects() {
    let (mask, effects) = fx(&[(Effect::Color, 30.0)]);
    let p = Point::new(0.3, 0.8);
    assert_eq!(transform_point(mask, &effects, Size::new(10.0, 10.0), p), p);
}

#[test]
fn mosaic_tiles_coordinates() {
    let (mask, effects) = fx(&[(Effect::Mosaic, 10.0)]);
    let out = transform_point(mask, &effects, Size::new(10.0, 10.0), Point::new(0.75, 0.25));
    assert!((out.x - 0.5).abs() < 1e-12);
    assert!((out.y - 0.5).abs() < 1e-12);
}

#[test]
fn pixelate_snaps_to_texel_centres() {
    let (mask, effects) = fx(&[(Effect::Pixelate, 100.0)]);
    let out = transform_point(
        mask,
        &effects,
        Size::new(100.0, 100.0),
        Point::new(0.123, 0.987),
    );
    assert!((out.x - 0.15).abs() < 1e-12);
    assert!((out.y - 0.95).abs() < 1e-12);
}

#[test]
fn whirl_keeps_centre_and_far_points() {
    let (mask, effects) = fx(&[(Effect::Whirl, 90.0)]);
    let size = Size::new(10.0, 10.0);
    let c = transform_point(mask, &effects, size, Point::new(0.5, 0.5));
    assert!((c.x - 0.5).abs() < 1e-12 && (c.y - 0.5).abs() < 1e-12);

    // Outside the whirl radius nothing moves.
    let far = transform_point(mask, &effects, size, Point::new(0.0, 0.0));
    assert!(far.x.abs() < 1e-12 && far.y.abs() < 1e-12);

    let moved = transform_point(mask, &effects, size, Point::new(0.6, 0.5));
    assert!((moved - Point::new(0.6, 0.5)).hypot() > 1e-3);
}

#[test]
fn fisheye_neutral_value_is_identity() {
    let mut effects = GraphicEffects::new();
    effects.set(Effect::Fisheye, 0.0);
    let mask = EffectMask::of(Effect::Fisheye);
    let out = transform_point(mask, &effects, Size::new(8.0, 8.0), Point::new(0.3, 0.7));
    assert!((out.x - 0.3).abs() < 1e-12);
    assert!((out.y - 0.7).abs() < 1e-12);

    let effects = GraphicEffects::new().with(Effect::Fisheye, 100.0);
    let out = transform_point(mask, &effects, Size::new(8.0, 8.0), Point::new(0.75, 0.5));
    // u_fisheye = 2 pulls samples towards the centre.
    assert!((out.x - 0.625).abs() < 1e-12);
}
