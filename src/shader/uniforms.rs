use crate::effects::effect::{Effect, GraphicEffects};
use crate::foundation::core::Size;

/// Uniform block of the sprite program: sampler unit, skin size and one converted value per
/// known effect. Inactive effects hold their converter applied to `0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderUniforms {
    /// Texture unit the source texture is bound to.
    pub texture_unit: u32,
    /// Logical size of the skin, used by the pixelate effect.
    pub skin_size: Size,
    values: [f64; Effect::ALL.len()],
}

impl ShaderUniforms {
    /// Convert raw effect values into uniform values.
    pub fn new(texture_unit: u32, skin_size: Size, effects: &GraphicEffects) -> Self {
        let mut values = [0.0; Effect::ALL.len()];
        for e in Effect::ALL {
            values[e.index()] = e.convert(effects.get(e));
        }
        Self {
            texture_unit,
            skin_size,
            values,
        }
    }

    /// Converted value of one effect.
    pub fn value(&self, effect: Effect) -> f64 {
        self.values[effect.index()]
    }

    /// Uniform name as it appears in the program source.
    pub fn uniform_name(effect: Effect) -> String {
        format!("u_{}", effect.name())
    }
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self::new(0, Size::ZERO, &GraphicEffects::default())
    }
}
