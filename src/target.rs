//! Targets: engine-facing model and GPU-side rendered state.

pub mod model;
pub mod rendered;
