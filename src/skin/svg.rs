use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::decode::parse_svg;
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::foundation::core::Size;
use crate::foundation::error::RenderResult;
use crate::gpu::backend::GpuBackend;
use crate::skin::Skin;
use crate::texture::Texture;

/// Mip index of scale 1.
pub const INDEX_OFFSET: i32 = 8;

/// Vector costume rasterized lazily at power-of-two scales.
///
/// Mip index `i` holds the costume at scale `2^(i - 8)`. The largest index keeps both edges
/// within the backend's texture limit.
pub struct SvgSkin {
    tree: Arc<usvg::Tree>,
    size: Size,
    textures: BTreeMap<i32, Texture>,
}

impl SvgSkin {
    /// Parse `bytes`. Nothing is rasterized until a texture is requested.
    pub fn new(bytes: &[u8]) -> RenderResult<Self> {
        let tree = parse_svg(bytes)?;
        let (w, h) = svg_raster_size(&tree, 1.0)?;
        Ok(Self {
            tree,
            size: Size::new(f64::from(w), f64::from(h)),
            textures: BTreeMap::new(),
        })
    }

    /// Highest mip index whose raster fits into `max_dimension`.
    pub fn max_index(&self, max_dimension: u32) -> i32 {
        let max = f64::from(max_dimension);
        let fit = |edge: f64| (max / edge).log2().floor() as i32;
        fit(self.size.width).min(fit(self.size.height)) + INDEX_OFFSET
    }

    /// Mip index used for a requested scale.
    pub fn mip_index(&self, scale: f64, max_dimension: u32) -> i32 {
        let max = self.max_index(max_dimension).max(0);
        if scale.is_nan() || scale <= 0.0 {
            return 0;
        }
        (scale.log2().round() as i32 + INDEX_OFFSET).clamp(0, max)
    }

    /// Number of rasterized mip levels.
    pub fn cached_levels(&self) -> usize {
        self.textures.len()
    }
}

fn index_scale(index: i32) -> f64 {
    2f64.powi(index - INDEX_OFFSET)
}

impl Skin for SvgSkin {
    fn texture(&mut self, gpu: &mut dyn GpuBackend, scale: f64) -> RenderResult<Texture> {
        let index = self.mip_index(scale, gpu.max_texture_dimension());
        if let Some(texture) = self.textures.get(&index) {
            return Ok(*texture);
        }
        let (w, h) = svg_raster_size(&self.tree, index_scale(index))?;
        let pixels = rasterize_svg_to_premul_rgba8(&self.tree, w, h)?;
        let texture = gpu.create_texture(w, h, Some(&pixels))?;
        tracing::debug!(index, width = w, height = h, "rasterized svg mip level");
        self.textures.insert(index, texture);
        Ok(texture)
    }

    fn texture_scale(&self, texture: Texture) -> f64 {
        self.textures
            .iter()
            .find(|(_, t)| **t == texture)
            .map(|(index, _)| index_scale(*index))
            .unwrap_or(1.0)
    }

    fn size(&self) -> Size {
        self.size
    }

    fn release(&mut self, gpu: &mut dyn GpuBackend) {
        for (_, texture) in std::mem::take(&mut self.textures) {
            gpu.delete_texture(texture);
        }
    }
}

impl std::fmt::Debug for SvgSkin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgSkin")
            .field("size", &self.size)
            .field("levels", &self.textures.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/skin/svg.rs"]
mod tests;
