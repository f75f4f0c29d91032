use crate::assets::decode::decode_bitmap;
use crate::foundation::core::Size;
use crate::foundation::error::RenderResult;
use crate::gpu::backend::GpuBackend;
use crate::skin::Skin;
use crate::texture::Texture;

/// Raster costume: decoded once, uploaded once, drawn at any scale from the same texture.
#[derive(Debug)]
pub struct BitmapSkin {
    texture: Texture,
    resolution: f64,
}

impl BitmapSkin {
    /// Decode `bytes` and upload them. `resolution` texels make one stage unit.
    pub fn new(gpu: &mut dyn GpuBackend, bytes: &[u8], resolution: f64) -> RenderResult<Self> {
        let decoded = decode_bitmap(bytes)?;
        let texture = gpu.create_texture(
            decoded.width,
            decoded.height,
            Some(decoded.rgba8_premul.as_slice()),
        )?;
        Ok(Self {
            texture,
            resolution,
        })
    }
}

impl Skin for BitmapSkin {
    fn texture(&mut self, _gpu: &mut dyn GpuBackend, _scale: f64) -> RenderResult<Texture> {
        Ok(self.texture)
    }

    fn texture_scale(&self, _texture: Texture) -> f64 {
        1.0
    }

    fn size(&self) -> Size {
        let texels = self.texture.size();
        Size::new(
            texels.width / self.resolution,
            texels.height / self.resolution,
        )
    }

    fn release(&mut self, gpu: &mut dyn GpuBackend) {
        if self.texture.is_valid() {
            gpu.delete_texture(self.texture);
            self.texture = Texture::default();
        }
    }
}
