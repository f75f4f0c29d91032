use std::collections::HashMap;

use vello_cpu::kurbo::Shape;

use crate::effects::effect::EffectMask;
use crate::effects::transform::{transform_color_with, transform_point_with};
use crate::foundation::core::{Affine, Point, Rect, Rgba8Premul};
use crate::foundation::error::{RenderError, RenderResult};
use crate::foundation::math::{premul_over_in_place, premul_over_px};
use crate::gpu::backend::{
    GpuBackend, GpuStats, ProgramHandle, ProgramSource, Readback, RowOrder, StrokeLine,
    enabled_effects, flip_rows,
};
use crate::shader::uniforms::ShaderUniforms;
use crate::texture::{Texture, TextureHandle};

/// Options of the software backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftwareGpuOpts {
    /// Largest accepted texture edge.
    pub max_texture_dimension: u32,
    /// Hand out read-backs bottom row first, like a GL `glReadPixels`.
    pub readback_bottom_up: bool,
    /// Anti-aliased strokes. When off, stroke coverage is thresholded at 50%.
    pub antialiasing: bool,
}

impl Default for SoftwareGpuOpts {
    fn default() -> Self {
        Self {
            max_texture_dimension: 2048,
            readback_bottom_up: false,
            antialiasing: true,
        }
    }
}

impl SoftwareGpuOpts {
    /// Set [`SoftwareGpuOpts::max_texture_dimension`].
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    /// Set [`SoftwareGpuOpts::readback_bottom_up`].
    pub fn with_readback_bottom_up(mut self, on: bool) -> Self {
        self.readback_bottom_up = on;
        self
    }

    /// Set [`SoftwareGpuOpts::antialiasing`].
    pub fn with_antialiasing(mut self, on: bool) -> Self {
        self.antialiasing = on;
        self
    }
}

struct SoftwareProgram {
    mask: EffectMask,
    uniforms: ShaderUniforms,
}

/// [`GpuBackend`] running entirely on the CPU over `vello_cpu` pixmaps.
///
/// Textured quads go through the same per-fragment effect functions the CPU queries use;
/// strokes are rasterized by `vello_cpu`.
pub struct SoftwareGpu {
    opts: SoftwareGpuOpts,
    textures: HashMap<TextureHandle, vello_cpu::Pixmap>,
    programs: HashMap<ProgramHandle, SoftwareProgram>,
    next_texture: u32,
    next_program: u32,
    ctx: Option<vello_cpu::RenderContext>,
    stats: GpuStats,
}

impl SoftwareGpu {
    /// Backend with the given options.
    pub fn new(opts: SoftwareGpuOpts) -> Self {
        Self {
            opts,
            textures: HashMap::new(),
            programs: HashMap::new(),
            next_texture: 1,
            next_program: 1,
            ctx: None,
            stats: GpuStats::default(),
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> SoftwareGpuOpts {
        self.opts
    }

    fn pixmap(&self, texture: Texture) -> RenderResult<&vello_cpu::Pixmap> {
        self.textures
            .get(&texture.handle())
            .ok_or_else(|| RenderError::gpu(format!("unknown texture {}", texture.handle().as_u32())))
    }

    fn take_target(&mut self, target: Texture) -> RenderResult<vello_cpu::Pixmap> {
        self.textures.remove(&target.handle()).ok_or_else(|| {
            RenderError::gpu(format!(
                "framebuffer incomplete: texture {} is not a render target",
                target.handle().as_u32()
            ))
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }
}

impl Default for SoftwareGpu {
    fn default() -> Self {
        Self::new(SoftwareGpuOpts::default())
    }
}

impl GpuBackend for SoftwareGpu {
    fn max_texture_dimension(&self) -> u32 {
        self.opts.max_texture_dimension
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> RenderResult<Texture> {
        let max = self.opts.max_texture_dimension.min(u32::from(u16::MAX));
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::gpu(format!(
                "texture size {width}x{height} outside 1..={max}"
            )));
        }
        let mut pixmap = vello_cpu::Pixmap::new(width as u16, height as u16);
        if let Some(data) = data {
            if data.len() != width as usize * height as usize * 4 {
                return Err(RenderError::validation("texture byte length mismatch"));
            }
            pixmap.data_as_u8_slice_mut().copy_from_slice(data);
        }

        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, pixmap);
        self.stats.textures_created += 1;
        self.stats.live_textures += 1;
        Ok(Texture::new(handle, width, height))
    }

    fn upload_texture(&mut self, texture: Texture, data: &[u8]) -> RenderResult<()> {
        let pixmap = self
            .textures
            .get_mut(&texture.handle())
            .ok_or_else(|| RenderError::gpu("upload to unknown texture"))?;
        let dst = pixmap.data_as_u8_slice_mut();
        if dst.len() != data.len() {
            return Err(RenderError::validation("texture byte length mismatch"));
        }
        dst.copy_from_slice(data);
        Ok(())
    }

    fn delete_texture(&mut self, texture: Texture) {
        if self.textures.remove(&texture.handle()).is_some() {
            self.stats.live_textures -= 1;
        }
    }

    fn read_pixels(&mut self, texture: Texture) -> RenderResult<Readback> {
        let pixmap = self.pixmap(texture)?;
        let (width, height) = (u32::from(pixmap.width()), u32::from(pixmap.height()));
        let mut data = pixmap.data_as_u8_slice().to_vec();
        let order = if self.opts.readback_bottom_up {
            flip_rows(&mut data, width as usize * 4);
            RowOrder::BottomUp
        } else {
            RowOrder::TopDown
        };
        self.stats.readbacks += 1;
        Ok(Readback {
            width,
            height,
            order,
            data,
        })
    }

    fn clear(&mut self, target: Texture, color: Rgba8Premul) -> RenderResult<()> {
        let pixmap = self
            .textures
            .get_mut(&target.handle())
            .ok_or_else(|| RenderError::gpu("framebuffer incomplete: clear of unknown target"))?;
        let rgba = color.to_array();
        for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Ok(())
    }

    fn compile_program(&mut self, source: &ProgramSource) -> RenderResult<ProgramHandle> {
        if !source.vertex.contains("void main") || !source.fragment.contains("void main") {
            return Err(RenderError::gpu("program source has no entry point"));
        }
        let handle = ProgramHandle(self.next_program);
        self.next_program += 1;
        self.programs.insert(
            handle,
            SoftwareProgram {
                mask: enabled_effects(&source.fragment),
                uniforms: ShaderUniforms::default(),
            },
        );
        self.stats.programs_compiled += 1;
        Ok(handle)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
    }

    fn set_uniforms(
        &mut self,
        program: ProgramHandle,
        uniforms: &ShaderUniforms,
    ) -> RenderResult<()> {
        let p = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| RenderError::gpu("set_uniforms on unknown program"))?;
        p.uniforms = *uniforms;
        Ok(())
    }

    fn draw_textured_quad(
        &mut self,
        target: Texture,
        program: ProgramHandle,
        source: Texture,
        transform: Affine,
    ) -> RenderResult<()> {
        if source.handle() == target.handle() {
            return Err(RenderError::gpu("feedback loop: source is bound as target"));
        }
        let det = transform.determinant();
        if det == 0.0 || !det.is_finite() {
            return Ok(());
        }
        let (mask, uniforms) = {
            let p = self
                .programs
                .get(&program)
                .ok_or_else(|| RenderError::gpu("draw with unknown program"))?;
            (p.mask, p.uniforms)
        };

        let mut dst = self.take_target(target)?;
        let result = (|| -> RenderResult<()> {
            let src = self.pixmap(source)?;
            let (sw, sh) = (usize::from(src.width()), usize::from(src.height()));
            let (dw, dh) = (usize::from(dst.width()), usize::from(dst.height()));
            let src_px = src.data_as_u8_slice();

            let bbox = transform
                .transform_rect_bbox(Rect::new(0.0, 0.0, sw as f64, sh as f64))
                .intersect(Rect::new(0.0, 0.0, dw as f64, dh as f64));
            if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
                return Ok(());
            }
            let inv = transform.inverse();
            let (x0, x1) = (bbox.x0.floor() as usize, (bbox.x1.ceil() as usize).min(dw));
            let (y0, y1) = (bbox.y0.floor() as usize, (bbox.y1.ceil() as usize).min(dh));

            let dst_px = dst.data_as_u8_slice_mut();
            for py in y0..y1 {
                for px in x0..x1 {
                    let s = inv * Point::new(px as f64 + 0.5, py as f64 + 0.5);
                    if s.x < 0.0 || s.y < 0.0 || s.x >= sw as f64 || s.y >= sh as f64 {
                        continue;
                    }
                    let uv = Point::new(s.x / sw as f64, s.y / sh as f64);
                    let uv = transform_point_with(mask, &uniforms, uv);
                    let tx = (uv.x * sw as f64).floor();
                    let ty = (uv.y * sh as f64).floor();
                    if tx < 0.0 || ty < 0.0 || tx >= sw as f64 || ty >= sh as f64 {
                        continue;
                    }
                    let si = (ty as usize * sw + tx as usize) * 4;
                    let texel = Rgba8Premul::from_slice(&src_px[si..si + 4]);
                    let color = transform_color_with(mask, &uniforms, texel);
                    if color.a == 0 {
                        continue;
                    }
                    let di = (py * dw + px) * 4;
                    let d = [dst_px[di], dst_px[di + 1], dst_px[di + 2], dst_px[di + 3]];
                    dst_px[di..di + 4].copy_from_slice(&premul_over_px(d, color.to_array()));
                }
            }
            Ok(())
        })();
        self.textures.insert(target.handle(), dst);
        if result.is_ok() {
            self.stats.quads_drawn += 1;
        }
        result
    }

    fn stroke_line(&mut self, target: Texture, line: &StrokeLine) -> RenderResult<()> {
        if line.width.is_nan() || line.width <= 0.0 || line.color.a == 0 {
            return Ok(());
        }
        let mut dst = self.take_target(target)?;
        let (w, h) = (dst.width(), dst.height());
        let [r, g, b, a] = line.color.to_straight_rgba();
        let from = vello_cpu::kurbo::Point::new(line.from.x, line.from.y);
        let to = vello_cpu::kurbo::Point::new(line.to.x, line.to.y);
        let width = line.width;

        let mut layer = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            if from == to {
                let dot = vello_cpu::kurbo::Circle::new(from, width / 2.0).to_path(0.1);
                ctx.fill_path(&dot);
            } else {
                let mut path = vello_cpu::kurbo::BezPath::new();
                path.move_to(from);
                path.line_to(to);
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(width).with_caps(vello_cpu::kurbo::Cap::Round),
                );
                ctx.stroke_path(&path);
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut layer);
        });

        if !self.opts.antialiasing {
            let solid = line.color.to_array();
            for px in layer.data_as_u8_slice_mut().chunks_exact_mut(4) {
                if u16::from(px[3]) * 2 >= u16::from(line.color.a) {
                    px.copy_from_slice(&solid);
                } else {
                    px.fill(0);
                }
            }
        }

        premul_over_in_place(dst.data_as_u8_slice_mut(), layer.data_as_u8_slice());
        self.textures.insert(target.handle(), dst);
        self.stats.lines_stroked += 1;
        Ok(())
    }

    fn blit(&mut self, source: Texture, target: Texture) -> RenderResult<()> {
        if source.handle() == target.handle() {
            return Ok(());
        }
        let mut dst = self.take_target(target)?;
        let result = (|| -> RenderResult<()> {
            let src = self.pixmap(source)?;
            let (sw, sh) = (usize::from(src.width()), usize::from(src.height()));
            let (dw, dh) = (usize::from(dst.width()), usize::from(dst.height()));
            let src_px = src.data_as_u8_slice();
            let dst_px = dst.data_as_u8_slice_mut();
            for y in 0..dh {
                let sy = ((y as f64 + 0.5) * sh as f64 / dh as f64) as usize;
                for x in 0..dw {
                    let sx = ((x as f64 + 0.5) * sw as f64 / dw as f64) as usize;
                    let si = (sy.min(sh - 1) * sw + sx.min(sw - 1)) * 4;
                    let di = (y * dw + x) * 4;
                    dst_px[di..di + 4].copy_from_slice(&src_px[si..si + 4]);
                }
            }
            Ok(())
        })();
        self.textures.insert(target.handle(), dst);
        result
    }

    fn stats(&self) -> GpuStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/software.rs"]
mod tests;
