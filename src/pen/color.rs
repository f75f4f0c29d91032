//! 16-bit HSV colour with the rounding rules of the colour type pen blocks were specified
//! against, and colour-input parsing.

use crate::foundation::core::Rgba8Premul;

const MAX16: f64 = u16::MAX as f64;
/// Hue value marking an achromatic colour.
pub const HUE_UNDEFINED: u16 = u16::MAX;

/// HSV colour, 16 bits per component. Hue is stored in hundredths of a degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HsvColor {
    hue: u16,
    saturation: u16,
    value: u16,
    alpha: u16,
}

fn round16(x: f64) -> u16 {
    (x * MAX16).round().clamp(0.0, MAX16) as u16
}

fn round_half_up(x: f32) -> u16 {
    (x + 0.5).clamp(0.0, f32::from(u16::MAX)) as u16
}

fn widen(c: u8) -> u16 {
    u16::from(c) * 0x101
}

fn narrow(c: u16) -> u8 {
    let x = i32::from(c);
    ((x - (x >> 8) + 0x80) >> 8) as u8
}

impl HsvColor {
    /// Build from components in `[0, 1]`. Hue wraps; the others are clamped.
    pub fn from_hsv_f(hue: f64, saturation: f64, value: f64, alpha: f64) -> Self {
        let hue = hue.rem_euclid(1.0);
        let hue = if hue.is_finite() { hue } else { 0.0 };
        Self {
            hue: (hue * 36000.0).round().min(35999.0) as u16,
            saturation: round16(saturation.clamp(0.0, 1.0)),
            value: round16(value.clamp(0.0, 1.0)),
            alpha: round16(alpha.clamp(0.0, 1.0)),
        }
    }

    /// Convert straight-alpha RGBA8.
    ///
    /// Intermediates are `f32` and rounding adds one half then truncates, so ties land where
    /// the 16-bit colour type puts them.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let max16 = f32::from(u16::MAX);
        let r = f32::from(widen(r)) / max16;
        let g = f32::from(widen(g)) / max16;
        let b = f32::from(widen(b)) / max16;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let value = round_half_up(max * max16);
        let alpha = widen(a);

        if delta.abs() <= 1e-5 {
            return Self {
                hue: HUE_UNDEFINED,
                saturation: 0,
                value,
                alpha,
            };
        }

        let saturation = round_half_up((delta / max) * max16);
        let mut hue = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        hue *= 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
        Self {
            hue: round_half_up(hue * 100.0),
            saturation,
            value,
            alpha,
        }
    }

    /// Raw hue in hundredths of a degree, [`HUE_UNDEFINED`] for greys.
    pub fn hue_centidegrees(&self) -> u16 {
        self.hue
    }

    /// Hue in degrees, `None` for greys.
    pub fn hue_degrees(&self) -> Option<f64> {
        (self.hue != HUE_UNDEFINED).then(|| f64::from(self.hue) / 100.0)
    }

    /// Hue in `[0, 1)`, `None` for greys.
    pub fn hue_f(&self) -> Option<f64> {
        (self.hue != HUE_UNDEFINED).then(|| f64::from(self.hue) / 36000.0)
    }

    /// Raw 16-bit saturation.
    pub fn saturation(&self) -> u16 {
        self.saturation
    }

    /// Saturation in `[0, 1]`.
    pub fn saturation_f(&self) -> f64 {
        f64::from(self.saturation) / MAX16
    }

    /// Raw 16-bit value.
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Value in `[0, 1]`.
    pub fn value_f(&self) -> f64 {
        f64::from(self.value) / MAX16
    }

    /// Raw 16-bit alpha.
    pub fn alpha(&self) -> u16 {
        self.alpha
    }

    /// Alpha in `[0, 1]`.
    pub fn alpha_f(&self) -> f64 {
        f64::from(self.alpha) / MAX16
    }

    /// Straight-alpha RGBA8.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let a = narrow(self.alpha);
        if self.saturation == 0 || self.hue == HUE_UNDEFINED {
            let v = narrow(self.value);
            return [v, v, v, a];
        }
        let h = if self.hue == 36000 {
            0.0
        } else {
            f64::from(self.hue) / 6000.0
        };
        let s = self.saturation_f();
        let v = self.value_f();
        let i = h.floor() as u8;
        let f = h - f64::from(i);
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match i {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        [narrow(round16(r)), narrow(round16(g)), narrow(round16(b)), a]
    }

    /// Premultiplied RGBA8.
    pub fn to_premul(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.to_rgba8();
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }
}

impl Default for HsvColor {
    fn default() -> Self {
        Self::from_rgba8(0, 0, 0, 255)
    }
}

/// Value given to colour inputs: a `#rrggbb` string, a number, or a numeric string.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorInput {
    /// Text as typed or produced by a reporter.
    Text(String),
    /// Numeric colour, `0xAARRGGBB` with alpha only when above `0xFFFFFF`.
    Number(f64),
}

impl From<&str> for ColorInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for ColorInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for ColorInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for ColorInput {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// A parsed colour input. `alpha` is only set when the input carried one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, if the input specified it.
    pub alpha: Option<u8>,
}

impl ParsedColor {
    const BLACK: ParsedColor = ParsedColor {
        r: 0,
        g: 0,
        b: 0,
        alpha: None,
    };
}

impl ColorInput {
    /// Decode the input; anything unparseable is black.
    pub fn parse(&self) -> ParsedColor {
        match self {
            ColorInput::Text(s) => {
                let s = s.trim();
                if let Some(hex) = s.strip_prefix('#') {
                    parse_hex(hex).unwrap_or(ParsedColor::BLACK)
                } else {
                    match s.parse::<f64>() {
                        Ok(n) => parse_number(n),
                        Err(_) => ParsedColor::BLACK,
                    }
                }
            }
            ColorInput::Number(n) => parse_number(*n),
        }
    }
}

fn parse_hex(hex: &str) -> Option<ParsedColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(ParsedColor {
            r: digit(0)? * 17,
            g: digit(1)? * 17,
            b: digit(2)? * 17,
            alpha: None,
        }),
        6 => Some(ParsedColor {
            r: pair(0)?,
            g: pair(2)?,
            b: pair(4)?,
            alpha: None,
        }),
        _ => None,
    }
}

fn parse_number(n: f64) -> ParsedColor {
    if !n.is_finite() {
        return ParsedColor::BLACK;
    }
    let v = (n.trunc() as i64) as u32;
    ParsedColor {
        r: (v >> 16) as u8,
        g: (v >> 8) as u8,
        b: v as u8,
        alpha: (v > 0xFF_FFFF).then_some((v >> 24) as u8),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/color.rs"]
mod tests;
