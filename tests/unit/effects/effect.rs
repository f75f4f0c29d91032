use super::*;

#[test]
fn bits_follow_declaration_order() {
    assert_eq!(Effect::Color.bit(), 1);
    assert_eq!(Effect::Brightness.bit(), 2);
    assert_eq!(Effect::Ghost.bit(), 4);
    assert_eq!(Effect::Mosaic.bit(), 64);
}

#[test]
fn names_roundtrip() {
    for e in Effect::ALL {
        assert_eq!(Effect::from_name(e.name()), Some(e));
    }
    assert_eq!(Effect::from_name(" Fisheye "), Some(Effect::Fisheye));
    assert_eq!(Effect::from_name("blur"), None);
}

#[test]
fn color_conversion_wraps_modulo_one() {
    assert_eq!(Effect::Color.convert(0.0), 0.0);
    assert_eq!(Effect::Color.convert(200.0), 0.0);
    assert!((Effect::Color.convert(50.0) - 0.25).abs() < 1e-12);
    assert!((Effect::Color.convert(-50.0) - 0.75).abs() < 1e-12);
}

#[test]
fn conversion_table_clamps() {
    assert_eq!(Effect::Brightness.convert(250.0), 1.0);
    assert_eq!(Effect::Brightness.convert(-50.0), -0.5);
    assert_eq!(Effect::Ghost.convert(0.0), 1.0);
    assert_eq!(Effect::Ghost.convert(100.0), 0.0);
    assert_eq!(Effect::Ghost.convert(140.0), 0.0);
    assert_eq!(Effect::Fisheye.convert(0.0), 1.0);
    assert_eq!(Effect::Fisheye.convert(-300.0), 0.0);
    assert!((Effect::Whirl.convert(180.0) - std::f64::consts::PI).abs() < 1e-12);
    assert_eq!(Effect::Pixelate.convert(-25.0), 2.5);
    assert_eq!(Effect::Mosaic.convert(0.0), 1.0);
    assert_eq!(Effect::Mosaic.convert(15.0), 3.0);
    assert_eq!(Effect::Mosaic.convert(1e9), MAX_MOSAIC);
}

#[test]
fn mask_reports_shape_and_color_groups() {
    let m: EffectMask = [Effect::Ghost, Effect::Whirl].into_iter().collect();
    assert!(m.contains(Effect::Ghost));
    assert!(m.has_shape_effects());
    assert!(m.has_color_effects());
    assert!(!EffectMask::of(Effect::Color).has_shape_effects());
    assert_eq!(EffectMask::from_bits(0xFFFF).bits(), 0x7F);
}

#[test]
fn graphic_effects_store_only_non_zero() {
    let mut fx = GraphicEffects::new().with(Effect::Color, 25.0);
    fx.set(Effect::Ghost, 10.0);
    assert_eq!(fx.mask().bits(), Effect::Color.bit() | Effect::Ghost.bit());

    fx.set(Effect::Color, 0.0);
    assert_eq!(fx.get(Effect::Color), 0.0);
    assert_eq!(fx.mask(), EffectMask::of(Effect::Ghost));

    fx.clear();
    assert!(fx.is_empty());
}
