use crate::foundation::error::{RenderError, RenderResult};

/// Pixel size of `tree` rendered at `scale`, at least 1x1.
pub fn svg_raster_size(tree: &usvg::Tree, scale: f64) -> RenderResult<(u32, u32)> {
    let size = tree.size();
    let (w, h) = (f64::from(size.width()), f64::from(size.height()));
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(RenderError::decode("svg has invalid width/height"));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RenderError::validation(format!("invalid svg raster scale {scale}")));
    }
    let px = |v: f64| ((v * scale).ceil().max(1.0)) as u32;
    Ok((px(w), px(h)))
}

/// Render `tree` stretched to `width` x `height`, premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> RenderResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::decode(format!("cannot allocate {width}x{height} svg pixmap")))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}
