//! Pen colour model, per-target pen state and the per-engine pen layer.

pub mod color;
pub mod layer;
pub mod state;
