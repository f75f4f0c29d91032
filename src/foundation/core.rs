use std::cmp::Ordering;

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Build a color from already premultiplied channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Opaque color (premultiplied and straight forms coincide).
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Read one pixel from a tightly packed RGBA8 slice.
    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// Channels as `[r, g, b, a]`.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Convert back to straight alpha. Transparent pixels map to transparent black.
    pub fn to_straight_rgba(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        let a = u32::from(self.a);
        let unpremul = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
        [unpremul(self.r), unpremul(self.g), unpremul(self.b), self.a]
    }
}

/// Integer pixel coordinate of a silhouette hull vertex, `(0,0)` at the texture's top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HullPoint {
    /// Column.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl HullPoint {
    /// Build a hull point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major ordering: by `y`, then by `x`.
    pub fn cmp_row_major(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }

    /// Centre of the pixel this point addresses.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.x) + 0.5, f64::from(self.y) + 0.5)
    }
}

/// Axis-aligned rectangle in Scratch stage space (origin at the stage centre, y grows upwards).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScratchRect {
    /// Minimum x.
    pub left: f64,
    /// Maximum y.
    pub top: f64,
    /// Maximum x.
    pub right: f64,
    /// Minimum y.
    pub bottom: f64,
}

impl ScratchRect {
    /// Build a rectangle from its edges.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Bounding box of a point cloud. Returns the zero rectangle for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut it = points.into_iter();
        let Some(first) = it.next() else {
            return Self::default();
        };
        let mut out = Self::new(first.x, first.y, first.x, first.y);
        for p in it {
            out.left = out.left.min(p.x);
            out.right = out.right.max(p.x);
            out.bottom = out.bottom.min(p.y);
            out.top = out.top.max(p.y);
        }
        out
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// A rectangle with no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Return `true` when both rectangles share a region of non-zero area.
    pub fn intersects(&self, other: &Self) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.bottom < other.top
            && other.bottom < self.top
    }

    /// Overlap of two rectangles; empty (zero) when they do not intersect.
    pub fn intersected(&self, other: &Self) -> Self {
        if !self.intersects(other) {
            return Self::default();
        }
        Self::new(
            self.left.max(other.left),
            self.top.min(other.top),
            self.right.min(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Smallest rectangle covering both. Empty operands are ignored.
    pub fn united(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            self.left.min(other.left),
            self.top.max(other.top),
            self.right.max(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Inclusive point containment.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// Expand outwards to integer coordinates.
    pub fn snap_to_int(&self) -> Self {
        Self::new(
            self.left.floor(),
            self.top.ceil(),
            self.right.ceil(),
            self.bottom.floor(),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
