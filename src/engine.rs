//! Contract with the project runtime driving the renderer.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::effects::registry::GraphicsEffect;

/// Identity of an engine; keys the per-engine pen layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(pub u64);

/// What the renderer needs from the runtime.
///
/// The runtime may live on another thread, hence `Send + Sync`; the renderer only calls it from
/// its render thread.
pub trait Engine: Send + Sync {
    /// Stable identity.
    fn id(&self) -> EngineId;

    /// Stage width in stage units.
    fn stage_width(&self) -> u32;

    /// Stage height in stage units.
    fn stage_height(&self) -> u32;

    /// Ask for a new frame after pen or stage content changed.
    fn request_redraw(&self);

    /// Offered every built-in effect when the engine is attached.
    fn register_graphics_effect(&self, _effect: &GraphicsEffect) {}
}

/// Fixed-size engine for headless use.
#[derive(Debug)]
pub struct HeadlessEngine {
    id: EngineId,
    width: u32,
    height: u32,
    redraws: AtomicU64,
}

impl HeadlessEngine {
    /// Standard 480x360 stage.
    pub fn new(id: u64) -> Self {
        Self::with_stage_size(id, 480, 360)
    }

    /// Custom stage size.
    pub fn with_stage_size(id: u64, width: u32, height: u32) -> Self {
        Self {
            id: EngineId(id),
            width,
            height,
            redraws: AtomicU64::new(0),
        }
    }

    /// Number of [`Engine::request_redraw`] calls so far.
    pub fn redraw_requests(&self) -> u64 {
        self.redraws.load(Ordering::Relaxed)
    }
}

impl Engine for HeadlessEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn stage_width(&self) -> u32 {
        self.width
    }

    fn stage_height(&self) -> u32 {
        self.height
    }

    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::Relaxed);
    }
}
