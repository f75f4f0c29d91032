use crate::foundation::math::wrap_clamp_inclusive;
use crate::pen::color::{ColorInput, HsvColor};

/// Smallest pen diameter.
pub const PEN_SIZE_MIN: f64 = 1.0;
/// Largest pen diameter.
pub const PEN_SIZE_MAX: f64 = 1200.0;
/// Period of the legacy shade parameter.
pub const SHADE_PERIOD: f64 = 200.0;

/// What a stroke is drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PenAttributes {
    /// Stroke colour.
    pub color: HsvColor,
    /// Stroke diameter in stage units.
    pub diameter: f64,
}

impl Default for PenAttributes {
    fn default() -> Self {
        Self {
            color: HsvColor::from_hsv_f(0.6666, 1.0, 1.0, 1.0),
            diameter: PEN_SIZE_MIN,
        }
    }
}

/// Colour parameter addressed by the "set/change pen (param) to/by" blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorParam {
    /// Hue, `0..=100`, wraps.
    Color,
    /// `0..=100`, clamped.
    Saturation,
    /// `0..=100`, clamped.
    Brightness,
    /// `0..=100`, clamped.
    Transparency,
}

impl ColorParam {
    /// Parse a block menu value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "color" => Some(Self::Color),
            "saturation" => Some(Self::Saturation),
            "brightness" => Some(Self::Brightness),
            "transparency" => Some(Self::Transparency),
            _ => None,
        }
    }
}

/// Pen parameters of one sprite or stage.
#[derive(Clone, Debug, PartialEq)]
pub struct PenState {
    /// Whether moves leave a trail.
    pub pen_down: bool,
    /// Hue, `0..=100`.
    pub color: f64,
    /// `0..=100`.
    pub saturation: f64,
    /// `0..=100`.
    pub brightness: f64,
    /// `0..=100`.
    pub transparency: f64,
    /// Legacy shade, `0..200`.
    pub shade: f64,
    /// Derived stroke attributes; refreshed by [`PenState::update_color`].
    pub pen_attributes: PenAttributes,
}

impl Default for PenState {
    fn default() -> Self {
        let mut out = Self {
            pen_down: false,
            color: 66.66,
            saturation: 100.0,
            brightness: 100.0,
            transparency: 0.0,
            shade: 50.0,
            pen_attributes: PenAttributes::default(),
        };
        out.update_color();
        out
    }
}

impl PenState {
    /// Recompute `pen_attributes.color` from the HSV parameters.
    pub fn update_color(&mut self) {
        self.pen_attributes.color = HsvColor::from_hsv_f(
            self.color / 100.0,
            self.saturation / 100.0,
            self.brightness / 100.0,
            1.0 - self.transparency / 100.0,
        );
    }

    /// "set pen (param) to (value)".
    pub fn set_color_param(&mut self, param: ColorParam, value: f64) {
        self.set_or_change_color_param(param, value, false);
        self.update_color();
    }

    /// "change pen (param) by (delta)".
    pub fn change_color_param(&mut self, param: ColorParam, delta: f64) {
        self.set_or_change_color_param(param, delta, true);
        self.update_color();
    }

    fn set_or_change_color_param(&mut self, param: ColorParam, value: f64, change: bool) {
        let slot = match param {
            ColorParam::Color => &mut self.color,
            ColorParam::Saturation => &mut self.saturation,
            ColorParam::Brightness => &mut self.brightness,
            ColorParam::Transparency => &mut self.transparency,
        };
        let raw = if change { *slot + value } else { value };
        *slot = match param {
            ColorParam::Color => wrap_clamp_inclusive(raw, 0.0, 100.0),
            _ => raw.clamp(0.0, 100.0),
        };
    }

    /// "set pen size to (value)".
    pub fn set_size(&mut self, value: f64) {
        self.pen_attributes.diameter = value.clamp(PEN_SIZE_MIN, PEN_SIZE_MAX);
    }

    /// "change pen size by (delta)".
    pub fn change_size(&mut self, delta: f64) {
        self.set_size(self.pen_attributes.diameter + delta);
    }

    /// "set pen color to (colour)". Also resets the legacy shade from the new brightness.
    pub fn set_color_to_color(&mut self, input: &ColorInput) {
        let parsed = input.parse();
        let hsv = HsvColor::from_rgba8(parsed.r, parsed.g, parsed.b, 255);
        self.color = hsv.hue_degrees().unwrap_or(0.0) / 360.0 * 100.0;
        self.saturation = hsv.saturation_f() * 100.0;
        self.brightness = hsv.value_f() * 100.0;
        self.transparency = match parsed.alpha {
            Some(a) => 100.0 * (1.0 - f64::from(a) / 255.0),
            None => 0.0,
        };
        self.update_color();
        self.shade = self.brightness / 2.0;
    }

    /// Legacy "set pen shade to (value)".
    pub fn set_shade(&mut self, value: f64) {
        self.shade = value.rem_euclid(SHADE_PERIOD);
        if !self.shade.is_finite() {
            self.shade = 0.0;
        }
        self.update_legacy_color();
    }

    /// Legacy "change pen shade by (delta)".
    pub fn change_shade(&mut self, delta: f64) {
        self.set_shade(self.shade + delta);
    }

    /// Legacy "set pen hue to (value)", hue in `0..200`.
    pub fn set_hue(&mut self, hue: f64) {
        self.set_or_change_color_param(ColorParam::Color, hue / 2.0, false);
        self.set_or_change_color_param(ColorParam::Transparency, 0.0, false);
        self.update_legacy_color();
    }

    /// Legacy "change pen hue by (delta)".
    pub fn change_hue(&mut self, delta: f64) {
        self.set_or_change_color_param(ColorParam::Color, delta / 2.0, true);
        self.update_legacy_color();
    }

    /// Fold the legacy shade into saturation and brightness, keeping the hue.
    fn update_legacy_color(&mut self) {
        let [r, g, b, _] = HsvColor::from_hsv_f(self.color / 100.0, 1.0, 1.0, 1.0).to_rgba8();
        let rgb = [f64::from(r), f64::from(g), f64::from(b)];

        let shade = if self.shade > 100.0 {
            SHADE_PERIOD - self.shade
        } else {
            self.shade
        };
        let mixed = if shade < 50.0 {
            mix_rgb([0.0; 3], rgb, (10.0 + shade) / 60.0)
        } else {
            mix_rgb(rgb, [255.0; 3], (shade - 50.0) / 60.0)
        };
        // Channels truncate toward zero.
        let [r, g, b] = mixed.map(|c| c.clamp(0.0, 255.0) as u8);

        let hsv = HsvColor::from_rgba8(r, g, b, 255);
        self.color = hsv.hue_f().unwrap_or(0.0) * 100.0;
        self.saturation = hsv.saturation_f() * 100.0;
        self.brightness = hsv.value_f() * 100.0;
        self.update_color();
    }
}

fn mix_rgb(from: [f64; 3], to: [f64; 3], fraction: f64) -> [f64; 3] {
    let f = fraction.clamp(0.0, 1.0);
    [
        from[0] + (to[0] - from[0]) * f,
        from[1] + (to[1] - from[1]) * f,
        from[2] + (to[2] - from[2]) * f,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/pen/state.rs"]
mod tests;
