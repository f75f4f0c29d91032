//! Pen blocks: state changes on the target's [`PenState`] plus drawing into the engine's pen
//! layer.

use crate::engine::EngineId;
use crate::pen::color::ColorInput;
use crate::pen::state::{ColorParam, PenState};
use crate::scene::{Scene, TargetId};

impl Scene {
    /// Pen of a target.
    pub fn pen_state(&self, id: TargetId) -> &PenState {
        &self.target(id).pen
    }

    /// Move a sprite, drawing a trail while its pen is down.
    pub fn set_position(&mut self, id: TargetId, x: f64, y: f64) {
        let model = Self::entry(&mut self.targets, id);
        let from = model.rendered.position();
        let props = &mut model.sprite_mut().props;
        props.x = x;
        props.y = y;
        model.rendered.set_position(x, y);
        if !model.pen.pen_down {
            return;
        }
        let engine = model.engine;
        if let Some(layer) = self.pen_layers.get_mut(&engine) {
            layer.draw_line(
                &mut self.ctx,
                &model.pen.pen_attributes,
                from.x,
                from.y,
                x,
                y,
            );
        }
        self.request_redraw(engine);
    }

    /// "pen down": also leaves a dot at the current position.
    pub fn pen_down(&mut self, id: TargetId) {
        let model = Self::entry(&mut self.targets, id);
        model.pen.pen_down = true;
        let at = model.rendered.position();
        let engine = model.engine;
        if let Some(layer) = self.pen_layers.get_mut(&engine) {
            layer.draw_point(&mut self.ctx, &model.pen.pen_attributes, at.x, at.y);
        }
        self.request_redraw(engine);
    }

    /// "pen up".
    pub fn pen_up(&mut self, id: TargetId) {
        Self::entry(&mut self.targets, id).pen.pen_down = false;
    }

    /// "stamp": draw the target with its effects into the pen layer.
    pub fn stamp(&mut self, id: TargetId) {
        let model = Self::entry(&mut self.targets, id);
        let engine = model.engine;
        if let Some(layer) = self.pen_layers.get_mut(&engine) {
            layer.stamp(&mut self.ctx, &mut model.rendered);
        }
        self.request_redraw(engine);
    }

    /// "erase all".
    pub fn clear_pen(&mut self, engine: EngineId) {
        if let Some(layer) = self.pen_layers.get_mut(&engine) {
            layer.clear(&mut self.ctx);
        }
        self.request_redraw(engine);
    }

    fn pen_mut(&mut self, id: TargetId) -> &mut PenState {
        &mut Self::entry(&mut self.targets, id).pen
    }

    /// "set pen size to".
    pub fn set_pen_size(&mut self, id: TargetId, size: f64) {
        self.pen_mut(id).set_size(size);
    }

    /// "change pen size by".
    pub fn change_pen_size(&mut self, id: TargetId, delta: f64) {
        self.pen_mut(id).change_size(delta);
    }

    /// "set pen color to (colour)".
    pub fn set_pen_color_to_color(&mut self, id: TargetId, color: &ColorInput) {
        self.pen_mut(id).set_color_to_color(color);
    }

    /// "set pen (param) to". Returns `false` for unknown parameter names.
    pub fn set_pen_color_param(&mut self, id: TargetId, param: &str, value: f64) -> bool {
        let Some(param) = ColorParam::from_name(param) else {
            return false;
        };
        self.pen_mut(id).set_color_param(param, value);
        true
    }

    /// "change pen (param) by". Returns `false` for unknown parameter names.
    pub fn change_pen_color_param(&mut self, id: TargetId, param: &str, delta: f64) -> bool {
        let Some(param) = ColorParam::from_name(param) else {
            return false;
        };
        self.pen_mut(id).change_color_param(param, delta);
        true
    }

    /// Legacy "set pen shade to".
    pub fn set_pen_shade(&mut self, id: TargetId, shade: f64) {
        self.pen_mut(id).set_shade(shade);
    }

    /// Legacy "change pen shade by".
    pub fn change_pen_shade(&mut self, id: TargetId, delta: f64) {
        self.pen_mut(id).change_shade(delta);
    }

    /// Legacy "set pen hue to".
    pub fn set_pen_hue(&mut self, id: TargetId, hue: f64) {
        self.pen_mut(id).set_hue(hue);
    }

    /// Legacy "change pen hue by".
    pub fn change_pen_hue(&mut self, id: TargetId, delta: f64) {
        self.pen_mut(id).change_hue(delta);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/pen_ops.rs"]
mod tests;
