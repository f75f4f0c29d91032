use std::collections::HashMap;

use crate::effects::effect::Effect;

/// A graphic effect as exposed to block implementations: a name plus the clamp applied to
/// values set through "set effect" / "change effect" blocks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphicsEffect {
    effect: Effect,
    min: f64,
    max: f64,
}

impl GraphicsEffect {
    /// Effect with the Scratch clamp range for that effect.
    pub fn new(effect: Effect) -> Self {
        let (min, max) = match effect {
            Effect::Ghost => (0.0, 100.0),
            Effect::Brightness => (-100.0, 100.0),
            _ => (f64::NEG_INFINITY, f64::INFINITY),
        };
        Self { effect, min, max }
    }

    /// Underlying effect.
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Registered name.
    pub fn name(&self) -> &'static str {
        self.effect.name()
    }

    /// Clamp a raw value to the range blocks may store.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Name → effect lookup used by the "set/change effect" blocks.
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    by_name: HashMap<&'static str, GraphicsEffect>,
}

impl EffectRegistry {
    /// Registry holding every built-in effect.
    pub fn standard() -> Self {
        let mut out = Self::default();
        for e in Effect::ALL {
            out.register(GraphicsEffect::new(e));
        }
        out
    }

    /// Add or replace an effect.
    pub fn register(&mut self, effect: GraphicsEffect) {
        self.by_name.insert(effect.name(), effect);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&GraphicsEffect> {
        let effect = Effect::from_name(name)?;
        self.by_name.get(effect.name())
    }

    /// Registered effects, in bit order.
    pub fn effects(&self) -> impl Iterator<Item = &GraphicsEffect> {
        Effect::ALL
            .into_iter()
            .filter_map(|e| self.by_name.get(e.name()))
    }
}
