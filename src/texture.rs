//! GPU texture references.

use crate::foundation::core::Size;

/// Opaque GPU texture id. `0` is never handed out by a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// Raw id value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Thin, non-owning reference to a GPU-resident premultiplied RGBA8 image.
///
/// Whoever created the underlying resource (a skin, the pen layer) owns it and must delete it
/// through the backend. Two textures are equal when their handles are equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
}

impl Texture {
    pub(crate) fn new(handle: TextureHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }

    /// Backend handle.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// A texture is valid when it carries a non-zero handle.
    pub fn is_valid(&self) -> bool {
        self.handle.0 != 0
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Texture {}

impl std::hash::Hash for Texture {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}
