//! Graphic effects: values, block-facing registry and the CPU mirror of the shader.

pub mod effect;
pub mod registry;
pub mod transform;
