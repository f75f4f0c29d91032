//! Sensing queries: touching point, colour and other sprites.
//!
//! Queries scan every integer stage point of the overlap between the asking target and its
//! candidates, so their cost is proportional to that area. [`QueryStats`] counts the scanned
//! points.

use smallvec::SmallVec;

use crate::engine::EngineId;
use crate::foundation::core::{Rgba8Premul, ScratchRect};
use crate::scene::{Scene, TargetId};

const WHITE: [u8; 3] = [255, 255, 255];

/// Work done by sensing queries since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Queries answered.
    pub queries: u64,
    /// Stage points visited by the scans.
    pub points_scanned: u64,
}

/// Colours are equal in the top 5 bits of red and green and the top 4 bits of blue.
pub fn color_matches(a: [u8; 3], b: [u8; 3]) -> bool {
    (a[0] & 0b1111_1000) == (b[0] & 0b1111_1000)
        && (a[1] & 0b1111_1000) == (b[1] & 0b1111_1000)
        && (a[2] & 0b1111_0000) == (b[2] & 0b1111_0000)
}

/// Something drawn on the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layer {
    Target(TargetId),
    Pen(EngineId),
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    layer: Layer,
    overlap: ScratchRect,
}

fn scan_points(bounds: ScratchRect) -> impl Iterator<Item = (f64, f64)> {
    let (left, right) = (bounds.left as i64, bounds.right as i64);
    let (bottom, top) = (bounds.bottom as i64, bounds.top as i64);
    (bottom..=top).flat_map(move |y| (left..=right).map(move |x| (x as f64, y as f64)))
}

fn union_of(candidates: &[Candidate]) -> ScratchRect {
    candidates
        .iter()
        .fold(ScratchRect::default(), |acc, c| acc.united(&c.overlap))
        .snap_to_int()
}

impl Scene {
    /// Counters of the sensing queries.
    pub fn query_stats(&self) -> QueryStats {
        self.stats
    }

    /// Zero the counters.
    pub fn reset_query_stats(&mut self) {
        self.stats = QueryStats::default();
    }

    /// Stage area a target can touch: its fast bounds, snapped outwards and clipped to the
    /// stage. `None` when hidden or off-stage.
    fn touching_bounds(&self, id: TargetId) -> Option<ScratchRect> {
        let model = self.target(id);
        if !model.is_visible() {
            return None;
        }
        let bounds = model
            .rendered
            .fast_bounds()
            .snap_to_int()
            .intersected(&self.stage_rect(model.engine));
        (!bounds.is_empty()).then_some(bounds)
    }

    /// Everything drawn on `engine`'s stage, topmost first.
    fn front_to_back(&self, engine: EngineId, exclude: Option<TargetId>) -> Vec<Layer> {
        let mut sprites: Vec<(i32, TargetId)> = Vec::new();
        let mut stages: Vec<TargetId> = Vec::new();
        for (id, model) in &self.targets {
            if model.engine != engine || !model.is_visible() || Some(*id) == exclude {
                continue;
            }
            if model.is_stage() {
                stages.push(*id);
            } else {
                sprites.push((model.layer_order(), *id));
            }
        }
        sprites.sort_by(|a, b| b.cmp(a));

        let mut out: Vec<Layer> = sprites.into_iter().map(|(_, id)| Layer::Target(id)).collect();
        if self.pen_layers.contains_key(&engine) {
            out.push(Layer::Pen(engine));
        }
        out.extend(stages.into_iter().map(Layer::Target));
        out
    }

    fn layer_bounds(&mut self, layer: Layer) -> ScratchRect {
        match layer {
            Layer::Target(id) => self.target(id).rendered.fast_bounds(),
            Layer::Pen(engine) => match self.pen_layers.get_mut(&engine) {
                Some(pen) => pen.bounds(&mut self.ctx),
                None => ScratchRect::default(),
            },
        }
    }

    fn layer_color(&mut self, layer: Layer, x: f64, y: f64) -> Rgba8Premul {
        match layer {
            Layer::Target(id) => Self::entry(&mut self.targets, id)
                .rendered
                .color_at_scratch_point(&mut self.ctx, x, y),
            Layer::Pen(engine) => match self.pen_layers.get_mut(&engine) {
                Some(pen) => pen.color_at_scratch_point(&mut self.ctx, x, y),
                None => Rgba8Premul::transparent(),
            },
        }
    }

    /// Other layers whose fast bounds overlap `bounds`, topmost first.
    fn candidates_touching(
        &mut self,
        id: TargetId,
        bounds: ScratchRect,
    ) -> SmallVec<[Candidate; 4]> {
        let engine = self.target(id).engine;
        let mut out = SmallVec::new();
        for layer in self.front_to_back(engine, Some(id)) {
            let overlap = self.layer_bounds(layer).intersected(&bounds);
            if !overlap.is_empty() {
                out.push(Candidate { layer, overlap });
            }
        }
        out
    }

    /// Blend `layers` (topmost first) over white at a stage point.
    fn blend_color3b(&mut self, layers: &[Layer], x: f64, y: f64) -> [u8; 3] {
        let mut dst = [0.0f64; 3];
        let mut blend_alpha = 1.0;
        for layer in layers {
            if blend_alpha == 0.0 {
                break;
            }
            let c = self.layer_color(*layer, x, y);
            dst[0] += f64::from(c.r) * blend_alpha;
            dst[1] += f64::from(c.g) * blend_alpha;
            dst[2] += f64::from(c.b) * blend_alpha;
            blend_alpha *= 1.0 - f64::from(c.a) / 255.0;
        }
        dst.map(|c| (c + blend_alpha * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    /// Colour seen at a stage point of `engine`: every visible layer blended over white.
    pub fn sample_color3b(&mut self, engine: EngineId, x: f64, y: f64) -> [u8; 3] {
        let layers = self.front_to_back(engine, None);
        self.blend_color3b(&layers, x, y)
    }

    /// "touching mouse-pointer": whether a visible target covers the stage point.
    pub fn touching_point(&mut self, id: TargetId, x: f64, y: f64) -> bool {
        self.stats.queries += 1;
        if !self.target(id).is_visible() {
            return false;
        }
        Self::entry(&mut self.targets, id)
            .rendered
            .contains_scratch_point(&mut self.ctx, x, y)
    }

    /// "touching color": whether any point of the target sees `color` underneath.
    ///
    /// White is matched against the empty stage too, so it scans the target's own bounds even
    /// without other layers.
    pub fn touching_color(&mut self, id: TargetId, color: [u8; 3]) -> bool {
        self.color_scan(id, color, None)
    }

    /// "color is touching color": whether a point where the target shows `mask` sees `color`
    /// underneath.
    pub fn color_touching_color(&mut self, id: TargetId, color: [u8; 3], mask: [u8; 3]) -> bool {
        self.color_scan(id, color, Some(mask))
    }

    fn color_scan(&mut self, id: TargetId, color: [u8; 3], mask: Option<[u8; 3]>) -> bool {
        self.stats.queries += 1;
        let Some(bounds) = self.touching_bounds(id) else {
            return false;
        };
        let candidates = self.candidates_touching(id, bounds);
        let scan = if color_matches(color, WHITE) {
            bounds
        } else if candidates.is_empty() {
            return false;
        } else {
            union_of(&candidates)
        };
        let layers: SmallVec<[Layer; 4]> = candidates.iter().map(|c| c.layer).collect();

        for (x, y) in scan_points(scan) {
            self.stats.points_scanned += 1;
            let hit = match mask {
                None => Self::entry(&mut self.targets, id)
                    .rendered
                    .contains_scratch_point(&mut self.ctx, x, y),
                Some(mask) => {
                    let own = Self::entry(&mut self.targets, id)
                        .rendered
                        .color_at_scratch_point(&mut self.ctx, x, y);
                    let [r, g, b, a] = own.to_straight_rgba();
                    a > 0 && color_matches([r, g, b], mask)
                }
            };
            if hit && color_matches(self.blend_color3b(&layers, x, y), color) {
                return true;
            }
        }
        false
    }

    /// Whether the target overlaps any of `others` at a shared point.
    pub fn touching_targets(&mut self, id: TargetId, others: &[TargetId]) -> bool {
        self.stats.queries += 1;
        let Some(bounds) = self.touching_bounds(id) else {
            return false;
        };
        let engine = self.target(id).engine;
        let mut candidates: SmallVec<[(TargetId, ScratchRect); 4]> = SmallVec::new();
        for &other in others {
            if other == id || !self.contains_target(other) {
                continue;
            }
            let model = self.target(other);
            if model.engine != engine || !model.is_visible() {
                continue;
            }
            let overlap = model.rendered.fast_bounds().intersected(&bounds);
            if !overlap.is_empty() {
                candidates.push((other, overlap));
            }
        }
        if candidates.is_empty() {
            return false;
        }
        let scan = candidates
            .iter()
            .fold(ScratchRect::default(), |acc, (_, r)| acc.united(r))
            .snap_to_int();

        for (x, y) in scan_points(scan) {
            self.stats.points_scanned += 1;
            if !Self::entry(&mut self.targets, id)
                .rendered
                .contains_scratch_point(&mut self.ctx, x, y)
            {
                continue;
            }
            for &(other, _) in &candidates {
                if Self::entry(&mut self.targets, other)
                    .rendered
                    .contains_scratch_point(&mut self.ctx, x, y)
                {
                    return true;
                }
            }
        }
        false
    }

    /// "touching (sprite)": whether the target overlaps `sprite` or any of its clones.
    pub fn touching_clones(&mut self, id: TargetId, sprite: TargetId) -> bool {
        let root = self
            .target(sprite)
            .as_sprite()
            .and_then(|s| s.clone_root)
            .unwrap_or(sprite);
        let family: Vec<TargetId> = self
            .targets
            .iter()
            .filter(|(other, model)| {
                **other == root || model.as_sprite().is_some_and(|s| s.clone_root == Some(root))
            })
            .map(|(other, _)| *other)
            .collect();
        self.touching_targets(id, &family)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/queries.rs"]
mod tests;
