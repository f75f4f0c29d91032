//! Costume → texture conversion.

pub mod bitmap;
pub mod svg;

use std::collections::HashMap;

use crate::assets::costume::{Costume, CostumeFormat};
use crate::foundation::core::Size;
use crate::foundation::error::RenderResult;
use crate::gpu::backend::GpuBackend;
use crate::texture::Texture;

pub use bitmap::BitmapSkin;
pub use svg::SvgSkin;

/// Renderable form of a costume: one or more textures at different scales.
pub trait Skin {
    /// Texture best suited to draw the costume at `scale` (1 = native size).
    fn texture(&mut self, gpu: &mut dyn GpuBackend, scale: f64) -> RenderResult<Texture>;

    /// Scale `texture` was rendered at; 1 for textures this skin does not know.
    fn texture_scale(&self, texture: Texture) -> f64;

    /// Logical costume size: texels at scale 1 divided by the bitmap resolution.
    fn size(&self) -> Size;

    /// Delete every texture the skin created.
    fn release(&mut self, gpu: &mut dyn GpuBackend);
}

/// Build the skin matching the costume's format.
pub fn create_skin(gpu: &mut dyn GpuBackend, costume: &Costume) -> RenderResult<Box<dyn Skin>> {
    Ok(match costume.format {
        CostumeFormat::Bitmap => Box::new(BitmapSkin::new(gpu, &costume.data, costume.resolution())?),
        CostumeFormat::Svg => Box::new(SvgSkin::new(&costume.data)?),
    })
}

/// Skins of one sprite and its clones, keyed by costume id.
#[derive(Default)]
pub struct SkinSet {
    skins: HashMap<String, Box<dyn Skin>>,
}

impl SkinSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skin of `costume`, created on first use.
    pub fn get_or_create(
        &mut self,
        gpu: &mut dyn GpuBackend,
        costume: &Costume,
    ) -> RenderResult<&mut (dyn Skin + 'static)> {
        if !self.skins.contains_key(&costume.id) {
            let skin = create_skin(gpu, costume)?;
            tracing::debug!(costume = %costume.id, "created skin");
            self.skins.insert(costume.id.clone(), skin);
        }
        match self.skins.get_mut(&costume.id) {
            Some(skin) => Ok(skin.as_mut()),
            None => Err(crate::foundation::error::RenderError::validation(
                "skin vanished after insertion",
            )),
        }
    }

    /// Skin of an already-synced costume.
    pub fn get_mut(&mut self, costume_id: &str) -> Option<&mut (dyn Skin + 'static)> {
        self.skins.get_mut(costume_id).map(|s| s.as_mut())
    }

    /// Number of skins created.
    pub fn len(&self) -> usize {
        self.skins.len()
    }

    /// Whether no skin was created yet.
    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }

    /// Release every skin.
    pub fn release(&mut self, gpu: &mut dyn GpuBackend) {
        for (_, mut skin) in self.skins.drain() {
            skin.release(gpu);
        }
    }
}

impl std::fmt::Debug for SkinSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkinSet")
            .field("costumes", &self.skins.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/skin/skin_set.rs"]
pub(crate) mod tests;
