//! CPU-side texture inspection: read-back cache and silhouette hulls.

use std::collections::HashMap;

use crate::effects::effect::{EffectMask, GraphicEffects};
use crate::effects::transform::{transform_color, transform_point};
use crate::foundation::core::{HullPoint, Point, Rgba8Premul, Size};
use crate::gpu::backend::GpuBackend;
use crate::texture::{Texture, TextureHandle};

#[derive(Debug, Default)]
struct CpuTexture {
    width: u32,
    height: u32,
    pixels: Option<Vec<u8>>,
    hull: Option<Vec<HullPoint>>,
}

/// Read-back pixels and hull points, cached per texture handle.
///
/// The cache is keyed by handle, not content: whoever mutates a texture in place must call
/// [`CpuTextureManager::remove_texture`] before the next query.
#[derive(Debug, Default)]
pub struct CpuTextureManager {
    entries: HashMap<TextureHandle, CpuTexture>,
}

impl CpuTextureManager {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Premultiplied RGBA8 pixels of `texture`, top row first.
    ///
    /// Read back on first access. `None` for invalid textures or failed read-backs.
    pub fn texture_data(&mut self, gpu: &mut dyn GpuBackend, texture: Texture) -> Option<&[u8]> {
        if !self.ensure_pixels(gpu, texture) {
            return None;
        }
        self.entries
            .get(&texture.handle())
            .and_then(|e| e.pixels.as_deref())
    }

    /// Silhouette outline of `texture` in texel coordinates.
    ///
    /// Without shape-changing effects the effect-free hull is computed once and cached. With
    /// fisheye, whirl, pixelate or mosaic in `mask` it is recomputed through the effect mapping
    /// on every call.
    #[tracing::instrument(skip(self, gpu, texture, effects), fields(texture = texture.handle().as_u32()))]
    pub fn texture_convex_hull_points(
        &mut self,
        gpu: &mut dyn GpuBackend,
        texture: Texture,
        skin_size: Size,
        mask: EffectMask,
        effects: &GraphicEffects,
    ) -> Vec<HullPoint> {
        if !self.ensure_pixels(gpu, texture) {
            return Vec::new();
        }
        let Some(entry) = self.entries.get_mut(&texture.handle()) else {
            return Vec::new();
        };
        let Some(pixels) = entry.pixels.as_deref() else {
            return Vec::new();
        };
        let (w, h) = (entry.width as i32, entry.height as i32);
        let alpha_at = |x: i32, y: i32| pixels[((y * w + x) * 4 + 3) as usize];

        if mask.has_shape_effects() {
            return hull_points(w, h, |x, y| {
                let uv = Point::new(f64::from(x) / f64::from(w), f64::from(y) / f64::from(h));
                let uv = transform_point(mask, effects, skin_size, uv);
                let tx = (uv.x * f64::from(w)).floor();
                let ty = (uv.y * f64::from(h)).floor();
                if tx < 0.0 || ty < 0.0 || tx >= f64::from(w) || ty >= f64::from(h) {
                    return false;
                }
                alpha_at(tx as i32, ty as i32) > 0
            });
        }

        if let Some(hull) = &entry.hull {
            return hull.clone();
        }
        let hull = hull_points(w, h, |x, y| alpha_at(x, y) > 0);
        tracing::debug!(points = hull.len(), "computed texture hull");
        entry.hull = Some(hull.clone());
        hull
    }

    /// Colour at texel `(x, y)` after effects. Out-of-bounds reads are transparent.
    ///
    /// `skin_size` is the logical costume size the pixelate block size is derived from.
    #[allow(clippy::too_many_arguments)]
    pub fn point_color(
        &mut self,
        gpu: &mut dyn GpuBackend,
        texture: Texture,
        skin_size: Size,
        x: i32,
        y: i32,
        mask: EffectMask,
        effects: &GraphicEffects,
    ) -> Rgba8Premul {
        let Some(entry) = self.cached(gpu, texture) else {
            return Rgba8Premul::transparent();
        };
        let Some((x, y)) =
            effect_texel(entry, skin_size, f64::from(x), f64::from(y), mask, effects)
        else {
            return Rgba8Premul::transparent();
        };
        let Some(pixels) = entry.pixels.as_deref() else {
            return Rgba8Premul::transparent();
        };
        let i = (y * entry.width as usize + x) * 4;
        let color = Rgba8Premul::from_slice(&pixels[i..i + 4]);
        if effects.is_empty() {
            return color;
        }
        transform_color(mask, effects, color)
    }

    /// Whether the texel nearest to `point` is not fully transparent.
    pub fn texture_contains_point(
        &mut self,
        gpu: &mut dyn GpuBackend,
        texture: Texture,
        skin_size: Size,
        point: Point,
        mask: EffectMask,
        effects: &GraphicEffects,
    ) -> bool {
        let Some(entry) = self.cached(gpu, texture) else {
            return false;
        };
        let Some((x, y)) =
            effect_texel(entry, skin_size, point.x.round(), point.y.round(), mask, effects)
        else {
            return false;
        };
        entry
            .pixels
            .as_deref()
            .is_some_and(|pixels| pixels[(y * entry.width as usize + x) * 4 + 3] > 0)
    }

    /// Forget pixels and hull of `texture`.
    pub fn remove_texture(&mut self, texture: Texture) {
        self.entries.remove(&texture.handle());
    }

    /// Whether pixels of `texture` are currently cached.
    pub fn is_cached(&self, texture: Texture) -> bool {
        self.entries
            .get(&texture.handle())
            .is_some_and(|e| e.pixels.is_some())
    }

    fn cached(&mut self, gpu: &mut dyn GpuBackend, texture: Texture) -> Option<&CpuTexture> {
        if !self.ensure_pixels(gpu, texture) {
            return None;
        }
        self.entries.get(&texture.handle())
    }

    fn ensure_pixels(&mut self, gpu: &mut dyn GpuBackend, texture: Texture) -> bool {
        if !texture.is_valid() {
            return false;
        }
        if self.is_cached(texture) {
            return true;
        }
        let readback = match gpu.read_pixels(texture) {
            Ok(rb) => rb.into_top_down(),
            Err(err) => {
                tracing::warn!(texture = texture.handle().as_u32(), %err, "texture read-back failed");
                return false;
            }
        };
        if readback.data.len() != readback.width as usize * readback.height as usize * 4 {
            tracing::warn!(
                texture = texture.handle().as_u32(),
                "texture read-back returned a truncated buffer"
            );
            return false;
        }
        self.entries.insert(
            texture.handle(),
            CpuTexture {
                width: readback.width,
                height: readback.height,
                pixels: Some(readback.data),
                hull: None,
            },
        );
        true
    }
}

/// Map a texel through the shape effects; `None` when it lands outside the read-back pixels.
fn effect_texel(
    entry: &CpuTexture,
    skin_size: Size,
    x: f64,
    y: f64,
    mask: EffectMask,
    effects: &GraphicEffects,
) -> Option<(usize, usize)> {
    let (w, h) = (f64::from(entry.width), f64::from(entry.height));
    let (x, y) = if mask.has_shape_effects() && !effects.is_empty() {
        let uv = transform_point(mask, effects, skin_size, Point::new(x / w, y / h));
        ((uv.x * w).floor(), (uv.y * h).floor())
    } else {
        (x, y)
    };
    if x < 0.0 || y < 0.0 || x >= w || y >= h {
        return None;
    }
    Some((x as usize, y as usize))
}

fn determinant(a: HullPoint, b: HullPoint, c: HullPoint) -> i64 {
    let (ax, ay) = (i64::from(a.x), i64::from(a.y));
    (i64::from(b.x) - ax) * (i64::from(c.y) - ay) - (i64::from(b.y) - ay) * (i64::from(c.x) - ax)
}

/// Per-row extremal hull.
///
/// For every row with an opaque pixel the leftmost and rightmost opaque pixels extend a left and
/// a right chain. A left point survives while it turns strictly counter-clockwise against the
/// new point, a right point while it turns strictly clockwise. Output is the left chain top to
/// bottom followed by the right chain bottom to top.
pub(crate) fn hull_points(
    width: i32,
    height: i32,
    opaque: impl Fn(i32, i32) -> bool,
) -> Vec<HullPoint> {
    let mut left: Vec<HullPoint> = Vec::new();
    let mut right: Vec<HullPoint> = Vec::new();

    for y in 0..height {
        let Some(lx) = (0..width).find(|&x| opaque(x, y)) else {
            continue;
        };
        let p = HullPoint::new(lx, y);
        while left.len() > 1 && determinant(left[left.len() - 1], left[left.len() - 2], p) <= 0 {
            left.pop();
        }
        left.push(p);

        let rx = (0..width).rev().find(|&x| opaque(x, y)).unwrap_or(lx);
        let p = HullPoint::new(rx, y);
        while right.len() > 1
            && determinant(right[right.len() - 1], right[right.len() - 2], p) >= 0
        {
            right.pop();
        }
        right.push(p);
    }

    left.extend(right.into_iter().rev());
    left
}

#[cfg(test)]
#[path = "../tests/unit/cpu_texture/cpu_texture.rs"]
mod tests;
