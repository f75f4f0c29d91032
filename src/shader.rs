//! Sprite program generation and caching.

pub mod manager;
pub mod source;
pub mod uniforms;
