use anyhow::Context;

use crate::foundation::error::{RenderError, RenderResult};
use crate::gpu::software::SoftwareGpuOpts;

/// Environment variable toggling the high-quality pen layer (`1`/`true`/`on`).
pub const ENV_HQ_PEN: &str = "SCRATCH_RENDER_HQ_PEN";
/// Environment variable overriding [`RenderOpts::max_texture_dimension`].
pub const ENV_MAX_TEXTURE_DIM: &str = "SCRATCH_RENDER_MAX_TEXTURE_DIM";

/// Renderer configuration.
///
/// Deserializes from JSON with every field optional; missing fields take the defaults below.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOpts {
    /// Render the pen layer at `hq_pen_scale` times the stage resolution.
    pub hq_pen: bool,
    /// Pen layer scale used when `hq_pen` is on.
    pub hq_pen_scale: f64,
    /// Anti-aliased pen strokes.
    pub antialiasing: bool,
    /// Largest texture edge; also bounds SVG mip levels.
    pub max_texture_dimension: u32,
    /// Make the software backend read pixels back bottom row first.
    pub readback_bottom_up: bool,
    /// Straight-alpha RGBA behind the stage in rendered frames. Transparent when unset.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            hq_pen: false,
            hq_pen_scale: 2.0,
            antialiasing: true,
            max_texture_dimension: 2048,
            readback_bottom_up: false,
            clear_rgba: None,
        }
    }
}

impl RenderOpts {
    /// Set [`RenderOpts::hq_pen`].
    pub fn with_hq_pen(mut self, on: bool) -> Self {
        self.hq_pen = on;
        self
    }

    /// Set [`RenderOpts::hq_pen_scale`].
    pub fn with_hq_pen_scale(mut self, scale: f64) -> Self {
        self.hq_pen_scale = scale;
        self
    }

    /// Set [`RenderOpts::antialiasing`].
    pub fn with_antialiasing(mut self, on: bool) -> Self {
        self.antialiasing = on;
        self
    }

    /// Set [`RenderOpts::max_texture_dimension`].
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    /// Set [`RenderOpts::readback_bottom_up`].
    pub fn with_readback_bottom_up(mut self, on: bool) -> Self {
        self.readback_bottom_up = on;
        self
    }

    /// Set [`RenderOpts::clear_rgba`].
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Parse options from JSON and validate them.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let opts: Self = serde_json::from_str(json).context("parse render options json")?;
        opts.validate()?;
        Ok(opts)
    }

    /// Defaults with the process environment applied on top.
    pub fn from_env() -> RenderResult<Self> {
        Self::default().apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `SCRATCH_RENDER_*` overrides read through `var`.
    pub fn apply_env_with(mut self, var: impl Fn(&str) -> Option<String>) -> RenderResult<Self> {
        if let Some(v) = var(ENV_HQ_PEN) {
            self.hq_pen = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" | "" => false,
                other => {
                    return Err(RenderError::validation(format!(
                        "{ENV_HQ_PEN}: expected a boolean, got '{other}'"
                    )));
                }
            };
        }
        if let Some(v) = var(ENV_MAX_TEXTURE_DIM) {
            self.max_texture_dimension = v.trim().parse().map_err(|_| {
                RenderError::validation(format!("{ENV_MAX_TEXTURE_DIM}: '{v}' is not a size"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check option ranges.
    pub fn validate(&self) -> RenderResult<()> {
        if !self.hq_pen_scale.is_finite() || self.hq_pen_scale < 1.0 {
            return Err(RenderError::validation("hq_pen_scale must be finite and >= 1"));
        }
        if self.max_texture_dimension == 0 || self.max_texture_dimension > u32::from(u16::MAX) {
            return Err(RenderError::validation(
                "max_texture_dimension must be in 1..=65535",
            ));
        }
        Ok(())
    }

    /// Pen layer scale these options ask for.
    pub fn pen_scale(&self) -> f64 {
        if self.hq_pen { self.hq_pen_scale } else { 1.0 }
    }

    /// Options for the software backend.
    pub fn software_gpu_opts(&self) -> SoftwareGpuOpts {
        SoftwareGpuOpts::default()
            .with_max_texture_dimension(self.max_texture_dimension)
            .with_readback_bottom_up(self.readback_bottom_up)
            .with_antialiasing(self.antialiasing)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/opts.rs"]
mod tests;
