#![forbid(unsafe_code)]

//! Scratch-compatible rendering: costumes as skins, sprites with graphic effects, a per-engine
//! pen layer and CPU-side sensing queries, drawn through a backend-agnostic GPU boundary.

pub mod assets;
pub mod cpu_texture;
pub mod effects;
pub mod engine;
pub mod foundation;
pub mod gpu;
pub mod pen;
pub mod render;
pub mod scene;
pub mod shader;
pub mod skin;
pub mod target;
pub mod texture;

pub use assets::costume::{Costume, CostumeFormat};
pub use effects::effect::{Effect, GraphicEffects};
pub use engine::{Engine, EngineId, HeadlessEngine};
pub use foundation::core::{Rgba8Premul, ScratchRect};
pub use foundation::error::{RenderError, RenderResult};
pub use pen::color::ColorInput;
pub use render::FrameRGBA;
pub use render::context::RenderContext;
pub use render::opts::RenderOpts;
pub use scene::{QueryStats, Scene, TargetId};
pub use target::model::{RotationStyle, SpriteProps};
