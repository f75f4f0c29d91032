//! Target arena, per-engine pen layers and frame compositing.

pub mod pen_ops;
pub mod queries;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::assets::costume::Costume;
use crate::effects::effect::GraphicEffects;
use crate::effects::registry::EffectRegistry;
use crate::engine::{Engine, EngineId};
use crate::foundation::core::{Affine, Rgba8Premul, ScratchRect, Size};
use crate::foundation::error::{RenderError, RenderResult};
use crate::foundation::math::wrap_clamp_inclusive;
use crate::pen::layer::PenLayer;
use crate::render::FrameRGBA;
use crate::render::context::RenderContext;
use crate::render::opts::RenderOpts;
use crate::target::model::{RotationStyle, SpriteModel, SpriteProps, TargetKind, TargetModel};
use crate::target::rendered::stage_to_pixels;
use crate::texture::Texture;

pub use queries::QueryStats;

/// Handle of a target in a [`Scene`]. Never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct TargetId(pub(crate) u32);

impl TargetId {
    /// Raw id.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Everything drawn for a set of engines: targets, pen layers and the render context.
///
/// Operations on a [`TargetId`] that was removed panic.
pub struct Scene {
    ctx: RenderContext,
    registry: EffectRegistry,
    engines: HashMap<EngineId, Arc<dyn Engine>>,
    pen_layers: HashMap<EngineId, PenLayer>,
    targets: BTreeMap<TargetId, TargetModel>,
    next_id: u32,
    stage_scale: f64,
    stats: QueryStats,
}

impl Scene {
    /// Empty scene over `ctx`.
    pub fn new(ctx: RenderContext) -> Self {
        Self {
            ctx,
            registry: EffectRegistry::standard(),
            engines: HashMap::new(),
            pen_layers: HashMap::new(),
            targets: BTreeMap::new(),
            next_id: 1,
            stage_scale: 1.0,
            stats: QueryStats::default(),
        }
    }

    /// Empty scene over the software backend.
    pub fn software(opts: RenderOpts) -> Self {
        Self::new(RenderContext::software(opts))
    }

    /// Render context.
    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Mutable render context.
    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.ctx
    }

    /// Effects known to "set/change effect".
    pub fn effect_registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Register `engine`: allocates its pen layer and offers it every graphic effect.
    ///
    /// Attaching an engine again reallocates (and clears) its pen layer.
    pub fn attach_engine(&mut self, engine: Arc<dyn Engine>) -> RenderResult<()> {
        let id = engine.id();
        let layer = self.pen_layers.entry(id).or_default();
        layer.set_engine(&mut self.ctx, engine.as_ref())?;
        for effect in self.registry.effects() {
            engine.register_graphics_effect(effect);
        }
        let stage = stage_size(engine.as_ref());
        for model in self.targets.values_mut().filter(|t| t.engine == id) {
            if let Err(err) = model.rendered.set_stage(&mut self.ctx, stage, self.stage_scale) {
                tracing::warn!(sprite = %model.name, %err, "stage geometry update failed");
            }
        }
        tracing::debug!(engine = id.0, width = stage.width, height = stage.height, "attached engine");
        self.engines.insert(id, engine);
        Ok(())
    }

    /// Forget `engine` and free its pen layer. Its targets stay.
    pub fn detach_engine(&mut self, engine: EngineId) {
        if let Some(mut layer) = self.pen_layers.remove(&engine) {
            layer.release(&mut self.ctx);
        }
        self.engines.remove(&engine);
    }

    /// Pen layer of `engine`.
    pub fn pen_layer(&self, engine: EngineId) -> Option<&PenLayer> {
        self.pen_layers.get(&engine)
    }

    /// Stage size of `engine`; the standard 480x360 when it is not attached.
    pub fn stage_size(&self, engine: EngineId) -> Size {
        self.engines
            .get(&engine)
            .map(|e| stage_size(e.as_ref()))
            .unwrap_or(Size::new(480.0, 360.0))
    }

    /// Stage rectangle of `engine` in stage coordinates.
    pub fn stage_rect(&self, engine: EngineId) -> ScratchRect {
        let s = self.stage_size(engine);
        ScratchRect::new(-s.width / 2.0, s.height / 2.0, s.width / 2.0, -s.height / 2.0)
    }

    /// Add the stage of `engine`, showing its first costume.
    pub fn add_stage(&mut self, engine: EngineId, costumes: Vec<Costume>) -> RenderResult<TargetId> {
        self.insert(TargetModel::stage(engine, costumes))
    }

    /// Add a sprite, showing its first costume.
    pub fn add_sprite(
        &mut self,
        engine: EngineId,
        name: impl Into<String>,
        costumes: Vec<Costume>,
        props: SpriteProps,
    ) -> RenderResult<TargetId> {
        self.insert(TargetModel::sprite(engine, name, costumes, props))
    }

    fn insert(&mut self, mut model: TargetModel) -> RenderResult<TargetId> {
        let stage = self.stage_size(model.engine);
        model
            .rendered
            .set_stage(&mut self.ctx, stage, self.stage_scale)?;
        if let Some(sprite) = model.as_sprite() {
            let size = sprite.props.size;
            model.rendered.set_size(&mut self.ctx, size)?;
        }
        if let Some(costume) = model.costume().cloned() {
            model.rendered.sync_costume(&mut self.ctx, &costume)?;
        }
        Ok(self.push(model))
    }

    fn push(&mut self, model: TargetModel) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(id, model);
        id
    }

    /// Clone a sprite: same costume, properties, effects and pen; shared skins.
    ///
    /// # Panics
    /// When `id` is the stage.
    pub fn clone_sprite(&mut self, id: TargetId) -> TargetId {
        let source = self.target(id);
        let TargetKind::Sprite(sprite) = &source.kind else {
            panic!("the stage cannot be cloned");
        };
        let model = TargetModel {
            name: source.name.clone(),
            engine: source.engine,
            kind: TargetKind::Sprite(SpriteModel {
                props: sprite.props.clone(),
                clone_root: Some(sprite.clone_root.unwrap_or(id)),
            }),
            costumes: source.costumes.clone(),
            costume_index: source.costume_index,
            pen: source.pen.clone(),
            rendered: source.rendered.clone_for_clone(),
        };
        let clone = self.push(model);
        tracing::debug!(source = id.0, clone = clone.0, "cloned sprite");
        clone
    }

    /// Remove a target and release its GPU state.
    pub fn remove_target(&mut self, id: TargetId) {
        let Some(mut model) = self.targets.remove(&id) else {
            panic!("stale target id {}", id.0);
        };
        model.rendered.release(&mut self.ctx);
    }

    /// Whether `id` is alive.
    pub fn contains_target(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    /// Live target ids in creation order.
    pub fn target_ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.keys().copied()
    }

    /// Target state.
    pub fn target(&self, id: TargetId) -> &TargetModel {
        match self.targets.get(&id) {
            Some(model) => model,
            None => panic!("stale target id {}", id.0),
        }
    }

    pub(crate) fn entry(
        targets: &mut BTreeMap<TargetId, TargetModel>,
        id: TargetId,
    ) -> &mut TargetModel {
        match targets.get_mut(&id) {
            Some(model) => model,
            None => panic!("stale target id {}", id.0),
        }
    }

    /// Switch costume by index.
    pub fn set_costume(&mut self, id: TargetId, index: usize) -> RenderResult<()> {
        let model = Self::entry(&mut self.targets, id);
        let Some(costume) = model.costumes.get(index).cloned() else {
            return Err(RenderError::validation(format!(
                "costume index {index} out of range for '{}'",
                model.name
            )));
        };
        model.rendered.sync_costume(&mut self.ctx, &costume)?;
        model.costume_index = index;
        Ok(())
    }

    /// Set size in percent.
    pub fn set_size(&mut self, id: TargetId, size: f64) -> RenderResult<()> {
        let model = Self::entry(&mut self.targets, id);
        model.sprite_mut().props.size = size;
        model.rendered.set_size(&mut self.ctx, size)
    }

    /// Point in `direction` degrees, wrapped into `(-180, 180]`.
    pub fn set_direction(&mut self, id: TargetId, direction: f64) {
        let direction = wrap_clamp_inclusive(direction, -179.0, 180.0);
        let model = Self::entry(&mut self.targets, id);
        model.sprite_mut().props.direction = direction;
        model.rendered.set_direction(direction);
    }

    /// Set rotation style.
    pub fn set_rotation_style(&mut self, id: TargetId, style: RotationStyle) {
        let model = Self::entry(&mut self.targets, id);
        model.sprite_mut().props.rotation_style = style;
        model.rendered.set_rotation_style(style);
    }

    /// Show or hide.
    pub fn set_visible(&mut self, id: TargetId, visible: bool) {
        Self::entry(&mut self.targets, id).sprite_mut().props.visible = visible;
    }

    /// Set layer order among sprites.
    pub fn set_layer_order(&mut self, id: TargetId, layer_order: i32) {
        Self::entry(&mut self.targets, id)
            .sprite_mut()
            .props
            .layer_order = layer_order;
    }

    /// Set the draggable flag.
    pub fn set_draggable(&mut self, id: TargetId, draggable: bool) {
        Self::entry(&mut self.targets, id).sprite_mut().props.draggable = draggable;
    }

    /// "set (effect) effect to (value)". Returns `false` for unknown effect names.
    pub fn set_effect(&mut self, id: TargetId, name: &str, value: f64) -> bool {
        let Some(effect) = self.registry.get(name).copied() else {
            return false;
        };
        Self::entry(&mut self.targets, id)
            .rendered
            .set_effect(effect.effect(), effect.clamp(value));
        true
    }

    /// "change (effect) effect by (delta)". Returns `false` for unknown effect names.
    pub fn change_effect(&mut self, id: TargetId, name: &str, delta: f64) -> bool {
        let Some(effect) = self.registry.get(name).copied() else {
            return false;
        };
        let rendered = &mut Self::entry(&mut self.targets, id).rendered;
        let current = rendered.effects().get(effect.effect());
        rendered.set_effect(effect.effect(), effect.clamp(current + delta));
        true
    }

    /// "clear graphic effects".
    pub fn clear_effects(&mut self, id: TargetId) {
        Self::entry(&mut self.targets, id).rendered.clear_effects();
    }

    /// Tight bounds of a target in stage coordinates.
    pub fn target_bounds(&mut self, id: TargetId) -> ScratchRect {
        Self::entry(&mut self.targets, id)
            .rendered
            .bounds(&mut self.ctx)
    }

    /// Stage pixels per stage unit used by [`Scene::render_frame`].
    pub fn stage_scale(&self) -> f64 {
        self.stage_scale
    }

    /// Change the frame resolution; targets re-select their textures.
    pub fn set_stage_scale(&mut self, scale: f64) -> RenderResult<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::validation("stage scale must be positive"));
        }
        self.stage_scale = scale;
        for model in self.targets.values_mut() {
            let stage = self
                .engines
                .get(&model.engine)
                .map(|e| stage_size(e.as_ref()))
                .unwrap_or(Size::new(480.0, 360.0));
            model.rendered.set_stage(&mut self.ctx, stage, scale)?;
        }
        Ok(())
    }

    /// Switch the pen layer of `engine` to or from high quality, keeping its content.
    ///
    /// The setting only changes once the layer was rescaled; on error it stays as it was.
    pub fn set_hq_pen(&mut self, engine: EngineId, on: bool) -> RenderResult<()> {
        let scale = self.ctx.opts().clone().with_hq_pen(on).pen_scale();
        let Some(layer) = self.pen_layers.get_mut(&engine) else {
            return Err(RenderError::validation(format!(
                "engine {} is not attached",
                engine.0
            )));
        };
        layer.rescale(&mut self.ctx, scale)?;
        self.ctx.set_hq_pen(on);
        self.request_redraw(engine);
        Ok(())
    }

    pub(crate) fn request_redraw(&self, engine: EngineId) {
        if let Some(engine) = self.engines.get(&engine) {
            engine.request_redraw();
        }
    }

    /// Composite the stage, pen layer and visible sprites of `engine` into one frame.
    #[tracing::instrument(skip(self))]
    pub fn render_frame(&mut self, engine: EngineId) -> RenderResult<FrameRGBA> {
        let Some(stage) = self.engines.get(&engine).map(|e| stage_size(e.as_ref())) else {
            return Err(RenderError::validation(format!(
                "engine {} is not attached",
                engine.0
            )));
        };
        let scale = self.stage_scale;
        let frame = self.ctx.gpu().create_texture(
            (stage.width * scale).round() as u32,
            (stage.height * scale).round() as u32,
            None,
        )?;
        let readback = self
            .composite(engine, frame, stage)
            .and_then(|()| self.ctx.gpu().read_pixels(frame));
        self.ctx.gpu().delete_texture(frame);
        let readback = readback?.into_top_down();
        Ok(FrameRGBA {
            width: readback.width,
            height: readback.height,
            data: readback.data,
            premultiplied: true,
        })
    }

    fn composite(&mut self, engine: EngineId, frame: Texture, stage: Size) -> RenderResult<()> {
        if let Some([r, g, b, a]) = self.ctx.opts().clear_rgba {
            self.ctx
                .gpu()
                .clear(frame, Rgba8Premul::from_straight_rgba(r, g, b, a))?;
        }
        let to_frame = stage_to_pixels(stage.width, stage.height, self.stage_scale);

        let mut order: Vec<(i32, TargetId)> = self
            .targets
            .iter()
            .filter(|(_, t)| t.engine == engine && t.is_visible())
            .map(|(id, t)| (t.layer_order(), *id))
            .collect();
        order.sort();
        let (stages, sprites): (Vec<_>, Vec<_>) =
            order.into_iter().partition(|(_, id)| self.target(*id).is_stage());

        for (_, id) in stages {
            Self::entry(&mut self.targets, id)
                .rendered
                .draw(&mut self.ctx, frame, to_frame)?;
        }
        self.draw_pen_layer(engine, frame)?;
        for (_, id) in sprites {
            Self::entry(&mut self.targets, id)
                .rendered
                .draw(&mut self.ctx, frame, to_frame)?;
        }
        Ok(())
    }

    fn draw_pen_layer(&mut self, engine: EngineId, frame: Texture) -> RenderResult<()> {
        let Some(layer) = self.pen_layers.get(&engine) else {
            return Ok(());
        };
        if !layer.is_attached() {
            return Ok(());
        }
        let texture = layer.texture();
        let transform = Affine::scale(self.stage_scale / layer.scale());
        let program = self
            .ctx
            .sprite_program(&GraphicEffects::new(), texture.size())?;
        self.ctx
            .gpu()
            .draw_textured_quad(frame, program, texture, transform)
    }

    /// Release every target, pen layer and cached program.
    pub fn release(&mut self) {
        for (_, mut model) in std::mem::take(&mut self.targets) {
            model.rendered.release(&mut self.ctx);
        }
        for (_, mut layer) in self.pen_layers.drain() {
            layer.release(&mut self.ctx);
        }
        self.ctx.release();
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("ctx", &self.ctx)
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .field("targets", &self.targets.len())
            .field("stage_scale", &self.stage_scale)
            .finish()
    }
}

fn stage_size(engine: &dyn Engine) -> Size {
    Size::new(
        f64::from(engine.stage_width()),
        f64::from(engine.stage_height()),
    )
}

#[cfg(test)]
#[path = "../tests/unit/scene/scene.rs"]
mod tests;
