//! Costume data and decoding into premultiplied pixels.

pub mod costume;
pub mod decode;
pub mod svg_raster;
