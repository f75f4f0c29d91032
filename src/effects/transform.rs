//! CPU mirror of the sprite fragment stage.
//!
//! The software backend runs the very same `*_with` functions per fragment, so CPU-side queries
//! (touching, colour sampling, silhouettes) agree with what gets drawn.

use crate::effects::effect::{Effect, EffectMask, GraphicEffects};
use crate::foundation::core::{Point, Rgba8Premul, Size};
use crate::foundation::math::fract;
use crate::shader::uniforms::ShaderUniforms;

const CENTER: f64 = 0.5;
const WHIRL_RADIUS: f64 = 0.5;
/// Values under this brightness lose their hue; pin them to a dim red instead.
const MIN_VALUE: f64 = 0.11 / 2.0;
/// Saturation floor so near-grey pixels still visibly rotate.
const MIN_SATURATION: f64 = 0.09;

/// Apply colour effects (color, brightness, ghost) to a premultiplied colour.
///
/// Ghost applies whenever its value is non-zero, whatever `mask` says.
pub fn transform_color(
    mask: EffectMask,
    effects: &GraphicEffects,
    color: Rgba8Premul,
) -> Rgba8Premul {
    let uniforms = ShaderUniforms::new(0, Size::ZERO, effects);
    transform_color_with(mask, &uniforms, color)
}

/// Map a texture coordinate (`[0,1]²`, origin top-left) through the shape-changing effects.
pub fn transform_point(
    mask: EffectMask,
    effects: &GraphicEffects,
    skin_size: Size,
    uv: Point,
) -> Point {
    let uniforms = ShaderUniforms::new(0, skin_size, effects);
    transform_point_with(mask, &uniforms, uv)
}

pub(crate) fn transform_color_with(
    mask: EffectMask,
    u: &ShaderUniforms,
    color: Rgba8Premul,
) -> Rgba8Premul {
    let ghost = u.value(Effect::Ghost);
    let enable_color = mask.contains(Effect::Color);
    let enable_brightness = mask.contains(Effect::Brightness);
    if color.a == 0 || (!enable_color && !enable_brightness && ghost == 1.0) {
        return color;
    }

    let mut rgb = [f64::from(color.r), f64::from(color.g), f64::from(color.b)];
    let mut a = f64::from(color.a);

    if enable_color || enable_brightness {
        let alpha = a / 255.0;
        for c in &mut rgb {
            *c /= alpha;
        }

        if enable_color {
            let mut hsv = rgb_to_hsv(rgb);
            if hsv[2] < MIN_VALUE {
                hsv = [0.0, 1.0, MIN_VALUE];
            } else if hsv[1] < MIN_SATURATION {
                hsv[0] = 0.0;
                hsv[1] = MIN_SATURATION;
            }
            hsv[0] = fract(u.value(Effect::Color) + hsv[0] + 1.0);
            rgb = hsv_to_rgb(hsv);
        }

        if enable_brightness {
            let brightness = u.value(Effect::Brightness) * 255.0;
            for c in &mut rgb {
                *c = (*c + brightness).clamp(0.0, 255.0);
            }
        }

        for c in &mut rgb {
            *c *= alpha;
        }
    }

    if ghost != 1.0 {
        for c in &mut rgb {
            *c *= ghost;
        }
        a *= ghost;
    }

    let to_u8 = |v: f64| -> u8 { v.round().clamp(0.0, 255.0) as u8 };
    let a = to_u8(a);
    // Keep the premultiplied invariant after rounding.
    Rgba8Premul::new(
        to_u8(rgb[0]).min(a),
        to_u8(rgb[1]).min(a),
        to_u8(rgb[2]).min(a),
        a,
    )
}

pub(crate) fn transform_point_with(mask: EffectMask, u: &ShaderUniforms, uv: Point) -> Point {
    let (mut x, mut y) = (uv.x, uv.y);

    if mask.contains(Effect::Mosaic) {
        let m = u.value(Effect::Mosaic);
        x = fract(m * x);
        y = fract(m * y);
    }

    let pixelate = u.value(Effect::Pixelate);
    if mask.contains(Effect::Pixelate) && pixelate > 0.0 {
        let texel_x = u.skin_size.width / pixelate;
        let texel_y = u.skin_size.height / pixelate;
        if texel_x > 0.0 && texel_y > 0.0 {
            x = ((x * texel_x).floor() + CENTER) / texel_x;
            y = ((y * texel_y).floor() + CENTER) / texel_y;
        }
    }

    if mask.contains(Effect::Whirl) {
        let offset_x = x - CENTER;
        let offset_y = y - CENTER;
        let magnitude = offset_x.hypot(offset_y);
        let factor = (1.0 - magnitude / WHIRL_RADIUS).max(0.0);
        let actual = u.value(Effect::Whirl) * factor * factor;
        let (sin, cos) = actual.sin_cos();
        x = cos * offset_x + sin * offset_y + CENTER;
        y = -sin * offset_x + cos * offset_y + CENTER;
    }

    if mask.contains(Effect::Fisheye) {
        let vx = (x - CENTER) / CENTER;
        let vy = (y - CENTER) / CENTER;
        let len = vx.hypot(vy);
        if len > 0.0 {
            let r = len.min(1.0).powf(u.value(Effect::Fisheye)) * len.max(1.0);
            x = CENTER + r * (vx / len) * CENTER;
            y = CENTER + r * (vy / len) * CENTER;
        }
    }

    Point::new(x, y)
}

/// RGB in `[0,255]` → HSV in `[0,1]`.
fn rgb_to_hsv([r, g, b]: [f64; 3]) -> [f64; 3] {
    let (mut r, mut g, mut b) = (r / 255.0, g / 255.0, b / 255.0);
    let mut h = 0.0;
    if g < b {
        std::mem::swap(&mut g, &mut b);
        h = -1.0;
    }
    if r < g {
        std::mem::swap(&mut r, &mut g);
        h = -2.0 / 6.0 - h;
    }
    let chroma = r - g.min(b);
    let h = (h + (g - b) / (6.0 * chroma + f64::EPSILON)).abs();
    let s = chroma / (r + f64::EPSILON);
    [h, s, r]
}

/// HSV in `[0,1]` → RGB in `[0,255]`.
fn hsv_to_rgb([h, s, v]: [f64; 3]) -> [f64; 3] {
    if s == 0.0 {
        return [v * 255.0; 3];
    }
    let h = h % 1.0;
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match i as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [r * 255.0, g * 255.0, b * 255.0]
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transform.rs"]
mod tests;
