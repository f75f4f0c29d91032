use std::sync::Arc;

use crate::foundation::core::Point;

/// Encoding of a costume's bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostumeFormat {
    /// Vector costume, rasterized per mip level.
    Svg,
    /// Raster costume (PNG, JPEG, ...), decoded once.
    #[default]
    Bitmap,
}

impl CostumeFormat {
    /// Map an engine data-format tag (`"svg"`, `"png"`, `"jpg"`, ...).
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("svg") {
            Self::Svg
        } else {
            Self::Bitmap
        }
    }
}

/// Costume as handed over by the engine.
///
/// The encoded bytes are shared, never copied, between a costume and its clones.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Costume {
    /// Stable id, also the skin cache key.
    pub id: String,
    /// Encoding of [`Costume::data`].
    #[serde(default)]
    pub format: CostumeFormat,
    /// Texels per logical pixel (2 for most bitmap costumes).
    #[serde(default = "default_bitmap_resolution")]
    pub bitmap_resolution: f64,
    /// Rotation centre in texels, from the top-left corner.
    #[serde(default)]
    pub rotation_center: Point,
    /// Encoded bytes.
    #[serde(skip)]
    pub data: Arc<Vec<u8>>,
}

fn default_bitmap_resolution() -> f64 {
    1.0
}

impl Costume {
    /// Build a costume from its parts.
    pub fn new(
        id: impl Into<String>,
        format: CostumeFormat,
        data: impl Into<Arc<Vec<u8>>>,
    ) -> Self {
        Self {
            id: id.into(),
            format,
            bitmap_resolution: 1.0,
            rotation_center: Point::ZERO,
            data: data.into(),
        }
    }

    /// Set the bitmap resolution.
    pub fn with_bitmap_resolution(mut self, resolution: f64) -> Self {
        self.bitmap_resolution = resolution;
        self
    }

    /// Set the rotation centre.
    pub fn with_rotation_center(mut self, center: Point) -> Self {
        self.rotation_center = center;
        self
    }

    /// Bitmap resolution, never below 1.
    pub fn resolution(&self) -> f64 {
        if self.bitmap_resolution.is_finite() && self.bitmap_resolution >= 1.0 {
            self.bitmap_resolution
        } else {
            1.0
        }
    }
}
