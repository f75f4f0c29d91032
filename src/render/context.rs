use std::thread::ThreadId;

use crate::effects::effect::GraphicEffects;
use crate::foundation::error::RenderResult;
use crate::gpu::backend::{GpuBackend, ProgramHandle};
use crate::gpu::software::SoftwareGpu;
use crate::render::opts::RenderOpts;
use crate::shader::manager::ShaderManager;

/// Per-renderer GPU state: the backend, its shader cache and the options it was built with.
///
/// A context is bound to the thread that created it. Every entry point touching the backend
/// asserts this in debug builds.
pub struct RenderContext {
    gpu: Box<dyn GpuBackend>,
    shaders: ShaderManager,
    opts: RenderOpts,
    owner: ThreadId,
}

impl RenderContext {
    /// Context over an arbitrary backend.
    pub fn new(gpu: Box<dyn GpuBackend>, opts: RenderOpts) -> Self {
        Self {
            gpu,
            shaders: ShaderManager::new(),
            opts,
            owner: std::thread::current().id(),
        }
    }

    /// Context over the software backend configured from `opts`.
    pub fn software(opts: RenderOpts) -> Self {
        let gpu = SoftwareGpu::new(opts.software_gpu_opts());
        Self::new(Box::new(gpu), opts)
    }

    /// Options this context was built with.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    pub(crate) fn set_hq_pen(&mut self, on: bool) {
        self.opts.hq_pen = on;
    }

    /// The backend.
    pub fn gpu(&mut self) -> &mut dyn GpuBackend {
        self.assert_render_thread();
        self.gpu.as_mut()
    }

    /// Shared read access, e.g. for [`GpuBackend::stats`].
    pub fn gpu_ref(&self) -> &dyn GpuBackend {
        self.gpu.as_ref()
    }

    /// Bind the sprite program for `effects` and upload its uniforms.
    pub fn sprite_program(
        &mut self,
        effects: &GraphicEffects,
        skin_size: crate::foundation::core::Size,
    ) -> RenderResult<ProgramHandle> {
        self.assert_render_thread();
        let program = self.shaders.shader_program(self.gpu.as_mut(), effects)?;
        self.shaders
            .set_uniforms(self.gpu.as_mut(), program, 0, skin_size, effects)?;
        Ok(program)
    }

    /// Shader cache.
    pub fn shaders(&self) -> &ShaderManager {
        &self.shaders
    }

    /// Panic (debug builds) when called off the owning thread.
    pub fn assert_render_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.owner,
            "render context used off its render thread"
        );
    }

    /// Delete every cached program.
    pub fn release(&mut self) {
        self.assert_render_thread();
        self.shaders.release(self.gpu.as_mut());
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("opts", &self.opts)
            .field("programs", &self.shaders.len())
            .field("stats", &self.gpu.stats())
            .finish()
    }
}
