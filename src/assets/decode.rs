use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{RenderError, RenderResult};

/// Decoded raster costume.
#[derive(Clone, Debug)]
pub struct DecodedBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode PNG/JPEG/... bytes into premultiplied RGBA8.
pub fn decode_bitmap(bytes: &[u8]) -> RenderResult<DecodedBitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode costume bitmap")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::decode("costume bitmap has no pixels"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedBitmap {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse an SVG document.
pub fn parse_svg(bytes: &[u8]) -> RenderResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse costume svg")?;
    Ok(Arc::new(tree))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
