use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::costume::Costume;
use crate::cpu_texture::CpuTextureManager;
use crate::effects::effect::{Effect, GraphicEffects};
use crate::foundation::core::{Affine, HullPoint, Point, Rgba8Premul, ScratchRect, Size, Vec2};
use crate::foundation::error::RenderResult;
use crate::render::context::RenderContext;
use crate::skin::SkinSet;
use crate::target::model::RotationStyle;
use crate::texture::Texture;

/// Map Scratch stage coordinates into the pixels of a `width x height` stage drawn at `scale`.
pub fn stage_to_pixels(width: f64, height: f64, scale: f64) -> Affine {
    Affine::new([scale, 0.0, 0.0, -scale, width / 2.0 * scale, height / 2.0 * scale])
}

/// GPU-side state of one sprite or the stage: costume textures, effects, transform and the
/// cached silhouette used by geometric queries.
///
/// Two textures are tracked. The draw texture is picked for the on-screen scale
/// (`size * stage_scale`); the CPU texture for the sprite's own size, so that one texel is about
/// one stage unit. Queries always run against the CPU texture.
pub struct RenderedTarget {
    is_stage: bool,
    skins: Rc<RefCell<SkinSet>>,
    costume: Option<Costume>,
    skin_size: Size,
    texture: Texture,
    texture_scale: f64,
    old_texture: Texture,
    cpu_texture: Texture,
    cpu_texture_scale: f64,
    effects: GraphicEffects,
    cpu: CpuTextureManager,
    hull: Option<Vec<HullPoint>>,
    x: f64,
    y: f64,
    size: f64,
    direction: f64,
    rotation_style: RotationStyle,
    stage_size: Size,
    stage_scale: f64,
}

impl RenderedTarget {
    /// Sprite with its own, empty skin set.
    pub fn sprite() -> Self {
        Self::new(false, Rc::new(RefCell::new(SkinSet::new())))
    }

    /// The stage: pinned at the origin, never scaled or rotated.
    pub fn stage() -> Self {
        Self::new(true, Rc::new(RefCell::new(SkinSet::new())))
    }

    fn new(is_stage: bool, skins: Rc<RefCell<SkinSet>>) -> Self {
        Self {
            is_stage,
            skins,
            costume: None,
            skin_size: Size::ZERO,
            texture: Texture::default(),
            texture_scale: 1.0,
            old_texture: Texture::default(),
            cpu_texture: Texture::default(),
            cpu_texture_scale: 1.0,
            effects: GraphicEffects::new(),
            cpu: CpuTextureManager::new(),
            hull: None,
            x: 0.0,
            y: 0.0,
            size: 100.0,
            direction: 90.0,
            rotation_style: RotationStyle::AllAround,
            stage_size: Size::new(480.0, 360.0),
            stage_scale: 1.0,
        }
    }

    /// State for a clone: shares the skin set, copies costume, effects and transform.
    pub fn clone_for_clone(&self) -> Self {
        Self {
            is_stage: false,
            skins: Rc::clone(&self.skins),
            costume: self.costume.clone(),
            skin_size: self.skin_size,
            texture: self.texture,
            texture_scale: self.texture_scale,
            old_texture: Texture::default(),
            cpu_texture: self.cpu_texture,
            cpu_texture_scale: self.cpu_texture_scale,
            effects: self.effects.clone(),
            cpu: CpuTextureManager::new(),
            hull: None,
            x: self.x,
            y: self.y,
            size: self.size,
            direction: self.direction,
            rotation_style: self.rotation_style,
            stage_size: self.stage_size,
            stage_scale: self.stage_scale,
        }
    }

    /// Whether this is the stage.
    pub fn is_stage(&self) -> bool {
        self.is_stage
    }

    /// Number of holders of the skin set (the target itself included).
    pub fn skin_set_holders(&self) -> usize {
        Rc::strong_count(&self.skins)
    }

    /// Current costume.
    pub fn costume(&self) -> Option<&Costume> {
        self.costume.as_ref()
    }

    /// Texture drawn on screen.
    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// Texture drawn before the last costume switch.
    pub fn old_texture(&self) -> Texture {
        self.old_texture
    }

    /// Texture geometric queries run against.
    pub fn cpu_texture(&self) -> Texture {
        self.cpu_texture
    }

    /// Logical costume size in stage units at size 100, shared by every mip level.
    pub fn skin_size(&self) -> Size {
        self.skin_size
    }

    /// Switch to `costume`, creating its skin on first use.
    ///
    /// On failure the previous costume stays in place.
    pub fn sync_costume(&mut self, ctx: &mut RenderContext, costume: &Costume) -> RenderResult<()> {
        let previous = self.costume.replace(costume.clone());
        let previous_texture = self.texture;
        match self.refresh_textures(ctx) {
            Ok(()) => {
                self.old_texture = previous_texture;
                Ok(())
            }
            Err(err) => {
                self.costume = previous;
                Err(err)
            }
        }
    }

    /// Re-select the textures for the current costume, size and stage scale.
    fn refresh_textures(&mut self, ctx: &mut RenderContext) -> RenderResult<()> {
        let Some(costume) = &self.costume else {
            return Ok(());
        };
        let size_scale = self.scale_factor();
        let draw_scale = size_scale * self.stage_scale;

        let mut skins = self.skins.borrow_mut();
        let skin = skins.get_or_create(ctx.gpu(), costume)?;
        let texture = skin.texture(ctx.gpu(), draw_scale)?;
        let cpu_texture = skin.texture(ctx.gpu(), size_scale)?;
        let skin_size = skin.size();
        let texture_scale = skin.texture_scale(texture);
        let cpu_texture_scale = skin.texture_scale(cpu_texture);
        drop(skins);

        if cpu_texture != self.cpu_texture {
            self.hull = None;
        }
        self.skin_size = skin_size;
        self.texture = texture;
        self.texture_scale = texture_scale;
        self.cpu_texture = cpu_texture;
        self.cpu_texture_scale = cpu_texture_scale;
        Ok(())
    }

    fn scale_factor(&self) -> f64 {
        if self.is_stage { 1.0 } else { self.size / 100.0 }
    }

    /// Move to `(x, y)`.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Position.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Set size in percent; may switch to another mip level.
    pub fn set_size(&mut self, ctx: &mut RenderContext, size: f64) -> RenderResult<()> {
        self.size = size;
        self.refresh_textures(ctx)
    }

    /// Size in percent.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Set direction in degrees, 90 pointing right.
    pub fn set_direction(&mut self, direction: f64) {
        self.direction = direction;
    }

    /// Direction.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Set rotation style.
    pub fn set_rotation_style(&mut self, style: RotationStyle) {
        self.rotation_style = style;
    }

    /// Rotation style.
    pub fn rotation_style(&self) -> RotationStyle {
        self.rotation_style
    }

    /// Stage geometry used to map between stage-pixel and Scratch coordinates.
    pub fn set_stage(
        &mut self,
        ctx: &mut RenderContext,
        stage_size: Size,
        stage_scale: f64,
    ) -> RenderResult<()> {
        self.stage_size = stage_size;
        self.stage_scale = stage_scale;
        self.refresh_textures(ctx)
    }

    /// Active effects.
    pub fn effects(&self) -> &GraphicEffects {
        &self.effects
    }

    /// Set one raw effect value.
    pub fn set_effect(&mut self, effect: Effect, value: f64) {
        self.effects.set(effect, value);
        self.hull = None;
    }

    /// Drop every effect.
    pub fn clear_effects(&mut self) {
        self.effects.clear();
        self.hull = None;
    }

    /// Whether the horizontal mirror is in effect.
    pub fn mirrored(&self) -> bool {
        !self.is_stage && self.rotation_style == RotationStyle::LeftRight && self.direction < 0.0
    }

    /// Costume texel space of a texture rendered at `texture_scale` → Scratch stage space.
    fn local_to_scratch(&self, texture_scale: f64) -> Affine {
        let Some(costume) = &self.costume else {
            return Affine::IDENTITY;
        };
        let resolution = costume.resolution();
        let k = texture_scale * resolution;
        let center = costume.rotation_center.to_vec2() / resolution;
        let s = self.scale_factor();
        let m = if self.mirrored() { -1.0 } else { 1.0 };
        let theta = if !self.is_stage && self.rotation_style == RotationStyle::AllAround {
            (90.0 - self.direction).to_radians()
        } else {
            0.0
        };
        let origin = if self.is_stage {
            Vec2::ZERO
        } else {
            Vec2::new(self.x, self.y)
        };
        Affine::translate(origin)
            * Affine::rotate(theta)
            * Affine::scale_non_uniform(m * s, -s)
            * Affine::translate(-center)
            * Affine::scale(1.0 / k)
    }

    /// CPU texture texels → Scratch stage space.
    pub fn transform(&self) -> Affine {
        self.local_to_scratch(self.cpu_texture_scale)
    }

    /// Bounds of the four CPU texture corners. Zero without a costume.
    pub fn fast_bounds(&self) -> ScratchRect {
        if !self.cpu_texture.is_valid() {
            return ScratchRect::default();
        }
        let m = self.transform();
        let (w, h) = (
            f64::from(self.cpu_texture.width()),
            f64::from(self.cpu_texture.height()),
        );
        ScratchRect::from_points(
            [
                Point::new(0.0, 0.0),
                Point::new(w, 0.0),
                Point::new(0.0, h),
                Point::new(w, h),
            ]
            .map(|p| m * p),
        )
    }

    /// Hull points of the CPU texture, sorted by row then column.
    pub fn hull_points(&mut self, ctx: &mut RenderContext) -> &[HullPoint] {
        if self.hull.is_none() {
            let mut points = self.cpu.texture_convex_hull_points(
                ctx.gpu(),
                self.cpu_texture,
                self.skin_size,
                self.effects.mask(),
                &self.effects,
            );
            points.sort_by(HullPoint::cmp_row_major);
            self.hull = Some(points);
        }
        self.hull.as_deref().unwrap_or_default()
    }

    /// Drop the cached hull; the next query recomputes it.
    pub fn invalidate_hull(&mut self) {
        self.hull = None;
    }

    /// Tight bounds: every hull point's pixel centre mapped into stage space.
    pub fn bounds(&mut self, ctx: &mut RenderContext) -> ScratchRect {
        let m = self.transform();
        let centers: Vec<Point> = self
            .hull_points(ctx)
            .iter()
            .map(|p| m * p.center())
            .collect();
        ScratchRect::from_points(centers)
    }

    /// Hit test in CPU texture texel space.
    ///
    /// Only points landing exactly on a hull vertex are reported as inside.
    pub fn contains_local_point(&mut self, ctx: &mut RenderContext, point: Point) -> bool {
        if !self.cpu_texture.is_valid() {
            return false;
        }
        let (w, h) = (
            f64::from(self.cpu_texture.width()),
            f64::from(self.cpu_texture.height()),
        );
        if point.x < 0.0 || point.y < 0.0 || point.x >= w || point.y >= h {
            return false;
        }
        let probe = HullPoint::new(point.x.round() as i32, point.y.round() as i32);
        self.hull_points(ctx)
            .binary_search_by(|p| p.cmp_row_major(&probe))
            .is_ok()
    }

    /// Hit test in Scratch stage coordinates.
    pub fn contains_scratch_point(&mut self, ctx: &mut RenderContext, x: f64, y: f64) -> bool {
        if !self.cpu_texture.is_valid() {
            return false;
        }
        let local = self.transform().inverse() * Point::new(x, y);
        self.contains_local_point(ctx, local)
    }

    /// Hit test in stage pixel coordinates (origin top-left, `stage_scale` pixels per unit).
    pub fn contains_scene_point(&mut self, ctx: &mut RenderContext, point: Point) -> bool {
        let to_pixels = stage_to_pixels(
            self.stage_size.width,
            self.stage_size.height,
            self.stage_scale,
        );
        let p = to_pixels.inverse() * point;
        self.contains_scratch_point(ctx, p.x, p.y)
    }

    /// Colour of the costume texel under a stage point, effects applied.
    pub fn color_at_scratch_point(&mut self, ctx: &mut RenderContext, x: f64, y: f64) -> Rgba8Premul {
        if !self.cpu_texture.is_valid() {
            return Rgba8Premul::transparent();
        }
        let local = self.transform().inverse() * Point::new(x, y);
        self.cpu.point_color(
            ctx.gpu(),
            self.cpu_texture,
            self.skin_size,
            local.x.floor() as i32,
            local.y.floor() as i32,
            self.effects.mask(),
            &self.effects,
        )
    }

    /// Draw the costume into `target`, `stage_to_target` mapping stage space to its pixels.
    pub fn draw(
        &mut self,
        ctx: &mut RenderContext,
        target: Texture,
        stage_to_target: Affine,
    ) -> RenderResult<()> {
        if !self.texture.is_valid() {
            return Ok(());
        }
        let program = ctx.sprite_program(&self.effects, self.skin_size)?;
        let transform = stage_to_target * self.local_to_scratch(self.texture_scale);
        ctx.gpu()
            .draw_textured_quad(target, program, self.texture, transform)
    }

    /// Give up this target's hold on the skin set; the last holder deletes the textures.
    pub fn release(&mut self, ctx: &mut RenderContext) {
        for texture in [self.cpu_texture, self.texture] {
            self.cpu.remove_texture(texture);
        }
        let skins = std::mem::replace(&mut self.skins, Rc::new(RefCell::new(SkinSet::new())));
        if let Ok(skins) = Rc::try_unwrap(skins) {
            let mut skins = skins.into_inner();
            tracing::debug!(skins = skins.len(), "releasing skin set");
            skins.release(ctx.gpu());
        }
        self.costume = None;
        self.texture = Texture::default();
        self.old_texture = Texture::default();
        self.cpu_texture = Texture::default();
        self.hull = None;
    }
}

impl std::fmt::Debug for RenderedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedTarget")
            .field("is_stage", &self.is_stage)
            .field("costume", &self.costume.as_ref().map(|c| c.id.as_str()))
            .field("texture", &self.texture)
            .field("cpu_texture", &self.cpu_texture)
            .field("position", &(self.x, self.y))
            .field("size", &self.size)
            .field("direction", &self.direction)
            .field("effects", &self.effects)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/target/rendered.rs"]
mod tests;
