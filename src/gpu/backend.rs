use crate::effects::effect::EffectMask;
use crate::foundation::core::{Affine, Point, Rgba8Premul};
use crate::foundation::error::RenderResult;
use crate::shader::uniforms::ShaderUniforms;
use crate::texture::Texture;

/// Opaque id of a linked shader program. `0` is never handed out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub(crate) u32);

impl ProgramHandle {
    /// Raw id value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Generated source of a sprite program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramSource {
    /// Vertex stage.
    pub vertex: String,
    /// Fragment stage, with one `#define ENABLE_<effect>` line per active effect.
    pub fragment: String,
}

/// Row order of a read-back buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowOrder {
    /// First row in the buffer is the top of the image.
    #[default]
    TopDown,
    /// First row in the buffer is the bottom of the image (GL convention).
    BottomUp,
}

/// Pixels read back from a texture: premultiplied RGBA8, rows tightly packed.
#[derive(Clone, Debug)]
pub struct Readback {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Order of the rows in `data`.
    pub order: RowOrder,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl Readback {
    /// Convert to top-row-first order in place.
    pub fn into_top_down(mut self) -> Self {
        if self.order == RowOrder::BottomUp {
            flip_rows(&mut self.data, self.width as usize * 4);
            self.order = RowOrder::TopDown;
        }
        self
    }
}

/// One stroke segment in framebuffer pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeLine {
    /// Start point.
    pub from: Point,
    /// End point. Equal to `from` for a dot.
    pub to: Point,
    /// Stroke width in pixels; caps are round.
    pub width: f64,
    /// Premultiplied stroke colour.
    pub color: Rgba8Premul,
}

/// Counters kept by a backend, used for instrumentation and in tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GpuStats {
    /// Textures created so far.
    pub textures_created: u64,
    /// Textures currently alive.
    pub live_textures: u64,
    /// `read_pixels` calls that succeeded.
    pub readbacks: u64,
    /// Programs compiled.
    pub programs_compiled: u64,
    /// Textured quads drawn.
    pub quads_drawn: u64,
    /// Line segments and dots stroked.
    pub lines_stroked: u64,
}

/// API-agnostic GPU boundary: textures, framebuffer draws and read-back.
///
/// Every texture doubles as a render target. All pixel data crossing this boundary is
/// premultiplied RGBA8.
pub trait GpuBackend {
    /// Largest width/height accepted by [`GpuBackend::create_texture`].
    fn max_texture_dimension(&self) -> u32;

    /// Allocate a texture, optionally filled with `data` (`width * height * 4` bytes).
    /// Without data the texture starts fully transparent.
    fn create_texture(&mut self, width: u32, height: u32, data: Option<&[u8]>)
    -> RenderResult<Texture>;

    /// Replace the contents of an existing texture.
    fn upload_texture(&mut self, texture: Texture, data: &[u8]) -> RenderResult<()>;

    /// Free a texture. Unknown handles are ignored.
    fn delete_texture(&mut self, texture: Texture);

    /// Blocking read-back of the whole texture.
    fn read_pixels(&mut self, texture: Texture) -> RenderResult<Readback>;

    /// Fill a render target with one colour.
    fn clear(&mut self, target: Texture, color: Rgba8Premul) -> RenderResult<()>;

    /// Compile and link a program.
    fn compile_program(&mut self, source: &ProgramSource) -> RenderResult<ProgramHandle>;

    /// Free a program. Unknown handles are ignored.
    fn delete_program(&mut self, program: ProgramHandle);

    /// Upload the uniform block of a program.
    fn set_uniforms(&mut self, program: ProgramHandle, uniforms: &ShaderUniforms)
    -> RenderResult<()>;

    /// Draw `source` into `target` with `program`, source-over.
    ///
    /// `transform` maps source texel space (`0..width`, `0..height`) into target pixel space.
    fn draw_textured_quad(
        &mut self,
        target: Texture,
        program: ProgramHandle,
        source: Texture,
        transform: Affine,
    ) -> RenderResult<()>;

    /// Stroke a line or dot into a render target, source-over.
    fn stroke_line(&mut self, target: Texture, line: &StrokeLine) -> RenderResult<()>;

    /// Copy `source` into `target`, scaled to fill it, replacing its contents.
    fn blit(&mut self, source: Texture, target: Texture) -> RenderResult<()>;

    /// Counters since creation.
    fn stats(&self) -> GpuStats;
}

/// Effects enabled by a generated fragment source, recovered from its `#define` lines.
pub fn enabled_effects(fragment: &str) -> EffectMask {
    fragment
        .lines()
        .filter_map(|line| line.trim().strip_prefix("#define ENABLE_"))
        .filter_map(|name| crate::effects::effect::Effect::from_name(name))
        .collect()
}

pub(crate) fn flip_rows(data: &mut [u8], stride: usize) {
    if stride == 0 {
        return;
    }
    let rows = data.len() / stride;
    for y in 0..rows / 2 {
        let (top, bottom) = data.split_at_mut((rows - 1 - y) * stride);
        top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/backend.rs"]
mod tests;
