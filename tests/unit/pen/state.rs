use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn defaults() {
    let pen = PenState::default();
    assert!(!pen.pen_down);
    assert_eq!(pen.color, 66.66);
    assert_eq!(pen.saturation, 100.0);
    assert_eq!(pen.brightness, 100.0);
    assert_eq!(pen.transparency, 0.0);
    assert_eq!(pen.shade, 50.0);
    assert_eq!(pen.pen_attributes.diameter, 1.0);
    assert_eq!(
        pen.pen_attributes.color,
        HsvColor::from_hsv_f(0.6666, 1.0, 1.0, 1.0)
    );
}

#[test]
fn color_wraps_with_a_period_of_101() {
    let mut pen = PenState::default();
    pen.set_color_param(ColorParam::Color, 150.0);
    assert!(approx(pen.color, 49.0));
    pen.set_color_param(ColorParam::Color, 5.0);
    pen.change_color_param(ColorParam::Color, -10.0);
    assert!(approx(pen.color, 96.0));
    pen.set_color_param(ColorParam::Color, 100.0);
    assert!(approx(pen.color, 100.0));
}

#[test]
fn other_params_clamp() {
    let mut pen = PenState::default();
    pen.set_color_param(ColorParam::Saturation, 150.0);
    assert_eq!(pen.saturation, 100.0);
    pen.change_color_param(ColorParam::Brightness, -300.0);
    assert_eq!(pen.brightness, 0.0);
    pen.change_color_param(ColorParam::Transparency, 40.0);
    pen.change_color_param(ColorParam::Transparency, 40.0);
    assert_eq!(pen.transparency, 80.0);
    assert_eq!(pen.pen_attributes.color.value(), 0);
    assert!((pen.pen_attributes.color.alpha_f() - 0.2).abs() < 1e-4);
}

#[test]
fn param_names() {
    assert_eq!(ColorParam::from_name("Color"), Some(ColorParam::Color));
    assert_eq!(
        ColorParam::from_name(" transparency "),
        Some(ColorParam::Transparency)
    );
    assert_eq!(ColorParam::from_name("hue"), None);
}

#[test]
fn size_is_clamped() {
    let mut pen = PenState::default();
    pen.set_size(0.0);
    assert_eq!(pen.pen_attributes.diameter, PEN_SIZE_MIN);
    pen.set_size(5000.0);
    assert_eq!(pen.pen_attributes.diameter, PEN_SIZE_MAX);
    pen.set_size(10.0);
    pen.change_size(2.5);
    assert_eq!(pen.pen_attributes.diameter, 12.5);
    pen.change_size(-100.0);
    assert_eq!(pen.pen_attributes.diameter, 1.0);
}

#[test]
fn shade_wraps_into_0_200() {
    let mut pen = PenState::default();
    pen.set_shade(-50.0);
    assert_eq!(pen.shade, 150.0);
    pen.change_shade(60.0);
    assert!(approx(pen.shade, 10.0));
    pen.set_shade(f64::NAN);
    assert_eq!(pen.shade, 0.0);
}

#[test]
fn set_color_to_color_resets_shade_and_transparency() {
    let mut pen = PenState::default();
    pen.set_color_param(ColorParam::Transparency, 70.0);
    pen.set_color_to_color(&ColorInput::from("#FF0000"));
    assert!(approx(pen.color, 0.0));
    assert!(approx(pen.saturation, 100.0));
    assert!(approx(pen.brightness, 100.0));
    assert_eq!(pen.transparency, 0.0);
    assert!(approx(pen.shade, 50.0));
    assert_eq!(pen.pen_attributes.color.to_rgba8(), [255, 0, 0, 255]);

    pen.set_color_to_color(&ColorInput::from(0x8000FF00u32));
    assert!(approx(pen.color, 100.0 / 3.0));
    assert!(approx(pen.transparency, 100.0 * (1.0 - 128.0 / 255.0)));
}

#[test]
fn legacy_hue_keeps_shade_50_saturated() {
    let mut pen = PenState::default();
    pen.set_color_param(ColorParam::Transparency, 50.0);
    pen.set_hue(0.0);
    assert!(approx(pen.color, 0.0));
    assert!(approx(pen.saturation, 100.0));
    assert!(approx(pen.brightness, 100.0));
    assert_eq!(pen.transparency, 0.0);
}

#[test]
fn legacy_shade_darkens_and_lightens() {
    let mut pen = PenState::default();
    pen.set_hue(0.0);

    pen.set_shade(0.0);
    // red mixed 10/60 towards black: 42.5 truncates to 42
    assert!((pen.brightness - 16.4706).abs() < 1e-3);
    assert!(approx(pen.saturation, 100.0));

    pen.set_shade(80.0);
    // red mixed 30/60 towards white: green and blue 127.5 truncate to 127
    assert!(approx(pen.brightness, 100.0));
    assert!((pen.saturation - 50.196).abs() < 1e-2);
    assert!(approx(pen.color, 0.0));
}

#[test]
fn change_hue_is_half_speed() {
    let mut pen = PenState::default();
    pen.set_hue(20.0);
    pen.change_hue(40.0);
    assert!((pen.color - 30.0).abs() < 0.01);
}
