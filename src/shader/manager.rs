use std::collections::HashMap;

use crate::effects::effect::{EffectMask, GraphicEffects};
use crate::foundation::core::Size;
use crate::foundation::error::RenderResult;
use crate::gpu::backend::{GpuBackend, ProgramHandle};
use crate::shader::source::sprite_program;
use crate::shader::uniforms::ShaderUniforms;

/// Sprite programs compiled on demand, one per combination of active effects.
///
/// Owned by a render context; programs are only valid on the backend that compiled them.
#[derive(Debug, Default)]
pub struct ShaderManager {
    programs: HashMap<EffectMask, ProgramHandle>,
}

impl ShaderManager {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Program for the non-zero entries of `effects`, compiled on first use.
    pub fn shader_program(
        &mut self,
        gpu: &mut dyn GpuBackend,
        effects: &GraphicEffects,
    ) -> RenderResult<ProgramHandle> {
        self.program_for_mask(gpu, effects.mask())
    }

    /// Program for an explicit effect mask.
    pub fn program_for_mask(
        &mut self,
        gpu: &mut dyn GpuBackend,
        mask: EffectMask,
    ) -> RenderResult<ProgramHandle> {
        if let Some(program) = self.programs.get(&mask) {
            return Ok(*program);
        }
        let program = gpu.compile_program(&sprite_program(mask))?;
        tracing::debug!(mask = mask.bits(), program = program.as_u32(), "compiled sprite program");
        self.programs.insert(mask, program);
        Ok(program)
    }

    /// Upload texture unit, skin size and every effect value (converted) to `program`.
    pub fn set_uniforms(
        &self,
        gpu: &mut dyn GpuBackend,
        program: ProgramHandle,
        texture_unit: u32,
        skin_size: Size,
        effects: &GraphicEffects,
    ) -> RenderResult<()> {
        gpu.set_uniforms(program, &ShaderUniforms::new(texture_unit, skin_size, effects))
    }

    /// Number of compiled programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether nothing was compiled yet.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Delete every program.
    pub fn release(&mut self, gpu: &mut dyn GpuBackend) {
        for (_, program) in self.programs.drain() {
            gpu.delete_program(program);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/manager.rs"]
mod tests;
