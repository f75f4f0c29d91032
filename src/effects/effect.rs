use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::foundation::math::wrap_clamp;

/// Largest mosaic repeat count, matching the maximum texture dimension a shader may tile.
pub const MAX_MOSAIC: f64 = 512.0;

/// Graphic effects a sprite or the stage can carry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Hue rotation.
    Color,
    /// Additive brightness.
    Brightness,
    /// Uniform transparency.
    Ghost,
    /// Radial lens distortion.
    Fisheye,
    /// Rotation that decays with distance from the centre.
    Whirl,
    /// Blocky down-sampling.
    Pixelate,
    /// Repeated tiling.
    Mosaic,
}

impl Effect {
    /// Every effect, in bit order.
    pub const ALL: [Effect; 7] = [
        Effect::Color,
        Effect::Brightness,
        Effect::Ghost,
        Effect::Fisheye,
        Effect::Whirl,
        Effect::Pixelate,
        Effect::Mosaic,
    ];

    /// Position of this effect in [`Effect::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit used in an [`EffectMask`].
    pub fn bit(self) -> u32 {
        1 << self.index()
    }

    /// Block-facing name.
    pub fn name(self) -> &'static str {
        match self {
            Effect::Color => "color",
            Effect::Brightness => "brightness",
            Effect::Ghost => "ghost",
            Effect::Fisheye => "fisheye",
            Effect::Whirl => "whirl",
            Effect::Pixelate => "pixelate",
            Effect::Mosaic => "mosaic",
        }
    }

    /// Case-insensitive lookup by block-facing name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether the effect moves pixels (and therefore changes the silhouette).
    pub fn is_shape_changing(self) -> bool {
        matches!(
            self,
            Effect::Fisheye | Effect::Whirl | Effect::Pixelate | Effect::Mosaic
        )
    }

    /// Convert a raw Scratch value into the unit the fragment stage consumes.
    pub fn convert(self, x: f64) -> f64 {
        match self {
            Effect::Color => wrap_clamp(x / 200.0, 0.0, 1.0),
            Effect::Brightness => x.clamp(-100.0, 100.0) / 100.0,
            Effect::Ghost => 1.0 - x.clamp(0.0, 100.0) / 100.0,
            Effect::Fisheye => ((x + 100.0) / 100.0).max(0.0),
            Effect::Whirl => x * PI / 180.0,
            Effect::Pixelate => x.abs() / 10.0,
            Effect::Mosaic => ((x.abs() + 10.0) / 10.0).round().clamp(1.0, MAX_MOSAIC),
        }
    }
}

/// Bit set of effects, one bit per [`Effect`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct EffectMask(u32);

impl EffectMask {
    /// No effects.
    pub const EMPTY: EffectMask = EffectMask(0);

    /// Build from raw bits; unknown bits are dropped.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & ((1 << Effect::ALL.len()) - 1))
    }

    /// Raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Mask with a single effect.
    pub fn of(effect: Effect) -> Self {
        Self(effect.bit())
    }

    /// Membership test.
    pub fn contains(self, effect: Effect) -> bool {
        self.0 & effect.bit() != 0
    }

    /// Add an effect.
    pub fn insert(&mut self, effect: Effect) {
        self.0 |= effect.bit();
    }

    /// Remove an effect.
    pub fn remove(&mut self, effect: Effect) {
        self.0 &= !effect.bit();
    }

    /// No bit set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any shape-changing effect is present.
    pub fn has_shape_effects(self) -> bool {
        self.iter().any(Effect::is_shape_changing)
    }

    /// Whether any pixel-colour effect (color, brightness, ghost) is present.
    pub fn has_color_effects(self) -> bool {
        self.iter().any(|e| !e.is_shape_changing())
    }

    /// Effects in bit order.
    pub fn iter(self) -> impl Iterator<Item = Effect> {
        Effect::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

impl std::ops::BitOr for EffectMask {
    type Output = EffectMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        EffectMask(self.0 | rhs.0)
    }
}

impl FromIterator<Effect> for EffectMask {
    fn from_iter<T: IntoIterator<Item = Effect>>(iter: T) -> Self {
        let mut out = EffectMask::EMPTY;
        for e in iter {
            out.insert(e);
        }
        out
    }
}

/// Raw (unconverted) effect values of one target. Only non-zero values are stored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphicEffects {
    values: BTreeMap<Effect, f64>,
}

impl GraphicEffects {
    /// No active effect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value. Zero removes the effect.
    pub fn set(&mut self, effect: Effect, value: f64) {
        if value == 0.0 || !value.is_finite() {
            self.values.remove(&effect);
        } else {
            self.values.insert(effect, value);
        }
    }

    /// Builder form of [`GraphicEffects::set`].
    pub fn with(mut self, effect: Effect, value: f64) -> Self {
        self.set(effect, value);
        self
    }

    /// Raw value, `0` when absent.
    pub fn get(&self, effect: Effect) -> f64 {
        self.values.get(&effect).copied().unwrap_or(0.0)
    }

    /// Drop every effect.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether no effect is active.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bit mask of active effects.
    pub fn mask(&self) -> EffectMask {
        self.values.keys().copied().collect()
    }

    /// Active `(effect, raw value)` pairs in bit order.
    pub fn iter(&self) -> impl Iterator<Item = (Effect, f64)> + '_ {
        self.values.iter().map(|(e, v)| (*e, *v))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/effect.rs"]
mod tests;
