use crate::cpu_texture::CpuTextureManager;
use crate::effects::effect::{EffectMask, GraphicEffects};
use crate::engine::Engine;
use crate::foundation::core::{Point, Rgba8Premul, ScratchRect, Size};
use crate::foundation::error::{RenderError, RenderResult};
use crate::gpu::backend::StrokeLine;
use crate::pen::state::PenAttributes;
use crate::render::context::RenderContext;
use crate::target::rendered::{RenderedTarget, stage_to_pixels};
use crate::texture::Texture;

/// Persistent drawing surface of one engine: pen trails and stamps.
///
/// The framebuffer is `stage size * scale` texels, `scale` being 1 or the high-quality pen
/// scale. CPU read-backs and bounds are cached until the next drawing operation.
#[derive(Debug)]
pub struct PenLayer {
    framebuffer: Texture,
    stage_size: Size,
    scale: f64,
    cpu: CpuTextureManager,
    texture_dirty: bool,
    bounds: Option<ScratchRect>,
}

impl PenLayer {
    /// Layer without a framebuffer.
    pub fn new() -> Self {
        Self {
            framebuffer: Texture::default(),
            stage_size: Size::ZERO,
            scale: 1.0,
            cpu: CpuTextureManager::new(),
            texture_dirty: false,
            bounds: None,
        }
    }

    /// Whether a framebuffer is allocated.
    pub fn is_attached(&self) -> bool {
        self.framebuffer.is_valid()
    }

    /// Framebuffer texture.
    pub fn texture(&self) -> Texture {
        self.framebuffer
    }

    /// Texels per stage unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Stage size in stage units.
    pub fn stage_size(&self) -> Size {
        self.stage_size
    }

    /// Allocate a cleared framebuffer sized for `engine`'s stage at the context's pen scale.
    pub fn set_engine(&mut self, ctx: &mut RenderContext, engine: &dyn Engine) -> RenderResult<()> {
        let stage = Size::new(
            f64::from(engine.stage_width()),
            f64::from(engine.stage_height()),
        );
        let scale = ctx.opts().pen_scale();
        let fb = Self::allocate(ctx, stage, scale)?;
        self.replace_framebuffer(ctx, fb);
        self.stage_size = stage;
        self.scale = scale;
        Ok(())
    }

    /// Reallocate at `scale`, carrying the current content over scaled.
    pub fn rescale(&mut self, ctx: &mut RenderContext, scale: f64) -> RenderResult<()> {
        if !self.is_attached() {
            return Err(RenderError::gpu("pen layer has no framebuffer"));
        }
        if scale == self.scale {
            return Ok(());
        }
        let fb = Self::allocate(ctx, self.stage_size, scale)?;
        if let Err(err) = ctx.gpu().blit(self.framebuffer, fb) {
            ctx.gpu().delete_texture(fb);
            return Err(err);
        }
        tracing::debug!(from = self.scale, to = scale, "rescaled pen layer");
        self.replace_framebuffer(ctx, fb);
        self.scale = scale;
        Ok(())
    }

    fn allocate(ctx: &mut RenderContext, stage: Size, scale: f64) -> RenderResult<Texture> {
        let w = (stage.width * scale).round() as u32;
        let h = (stage.height * scale).round() as u32;
        ctx.gpu().create_texture(w, h, None)
    }

    fn replace_framebuffer(&mut self, ctx: &mut RenderContext, fb: Texture) {
        if self.framebuffer.is_valid() {
            self.cpu.remove_texture(self.framebuffer);
            ctx.gpu().delete_texture(self.framebuffer);
        }
        self.framebuffer = fb;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.texture_dirty = true;
        self.bounds = None;
    }

    fn refresh_cpu_copy(&mut self) {
        if self.texture_dirty {
            self.cpu.remove_texture(self.framebuffer);
            self.texture_dirty = false;
        }
    }

    fn to_framebuffer(&self, x: f64, y: f64) -> Point {
        stage_to_pixels(self.stage_size.width, self.stage_size.height, self.scale) * Point::new(x, y)
    }

    /// Erase everything.
    pub fn clear(&mut self, ctx: &mut RenderContext) {
        if !self.is_attached() {
            return;
        }
        if let Err(err) = ctx.gpu().clear(self.framebuffer, Rgba8Premul::transparent()) {
            tracing::warn!(%err, "pen layer clear failed");
            return;
        }
        self.mark_dirty();
    }

    /// Draw a dot.
    pub fn draw_point(&mut self, ctx: &mut RenderContext, pen: &PenAttributes, x: f64, y: f64) {
        self.draw_line(ctx, pen, x, y, x, y);
    }

    /// Draw a line with round caps.
    pub fn draw_line(
        &mut self,
        ctx: &mut RenderContext,
        pen: &PenAttributes,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    ) {
        if !self.is_attached() {
            return;
        }
        // odd thin lines sit on pixel centres
        let offset = (4.0 - pen.diameter).max(0.0) % 2.0 / 2.0;
        let line = StrokeLine {
            from: self.to_framebuffer(x0 + offset, y0 + offset),
            to: self.to_framebuffer(x1 + offset, y1 + offset),
            width: pen.diameter * self.scale,
            color: pen.color.to_premul(),
        };
        if let Err(err) = ctx.gpu().stroke_line(self.framebuffer, &line) {
            tracing::warn!(%err, "pen stroke failed");
            return;
        }
        self.mark_dirty();
    }

    /// Draw `target` with its current effects into the layer.
    ///
    /// Targets whose fast bounds miss the stage are skipped.
    pub fn stamp(&mut self, ctx: &mut RenderContext, target: &mut RenderedTarget) {
        if !self.is_attached() {
            return;
        }
        let (w, h) = (self.stage_size.width, self.stage_size.height);
        let stage = ScratchRect::new(-w / 2.0, h / 2.0, w / 2.0, -h / 2.0);
        if !target.fast_bounds().intersects(&stage) {
            return;
        }
        let to_fb = stage_to_pixels(w, h, self.scale);
        if let Err(err) = target.draw(ctx, self.framebuffer, to_fb) {
            tracing::warn!(%err, "pen stamp failed");
            return;
        }
        self.mark_dirty();
    }

    /// Colour of the layer under a stage point; transparent off-stage.
    pub fn color_at_scratch_point(&mut self, ctx: &mut RenderContext, x: f64, y: f64) -> Rgba8Premul {
        if !self.is_attached() {
            return Rgba8Premul::transparent();
        }
        self.refresh_cpu_copy();
        let p = self.to_framebuffer(x, y);
        self.cpu.point_color(
            ctx.gpu(),
            self.framebuffer,
            self.framebuffer.size(),
            p.x.floor() as i32,
            p.y.floor() as i32,
            EffectMask::EMPTY,
            &GraphicEffects::new(),
        )
    }

    /// Bounds of everything drawn so far; the zero rectangle when the layer is empty.
    pub fn bounds(&mut self, ctx: &mut RenderContext) -> ScratchRect {
        if let Some(bounds) = self.bounds {
            return bounds;
        }
        if !self.is_attached() {
            return ScratchRect::default();
        }
        self.refresh_cpu_copy();
        let hull = self.cpu.texture_convex_hull_points(
            ctx.gpu(),
            self.framebuffer,
            self.framebuffer.size(),
            EffectMask::EMPTY,
            &GraphicEffects::new(),
        );
        let bounds = if hull.is_empty() {
            ScratchRect::default()
        } else {
            let (w, h) = (self.stage_size.width, self.stage_size.height);
            let rect = ScratchRect::from_points(hull.iter().map(|p| {
                Point::new(
                    f64::from(p.x) / self.scale - w / 2.0,
                    -f64::from(p.y) / self.scale + h / 2.0,
                )
            }));
            ScratchRect::new(rect.left, rect.top, rect.right + 1.0, rect.bottom - 1.0)
        };
        self.bounds = Some(bounds);
        bounds
    }

    /// Delete the framebuffer.
    pub fn release(&mut self, ctx: &mut RenderContext) {
        if self.framebuffer.is_valid() {
            self.cpu.remove_texture(self.framebuffer);
            ctx.gpu().delete_texture(self.framebuffer);
        }
        self.framebuffer = Texture::default();
        self.bounds = None;
        self.texture_dirty = false;
    }
}

impl Default for PenLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/layer.rs"]
mod tests;
