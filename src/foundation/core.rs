pub use kurbo::{Affine, Point, Vec2};

/// Packed premultiplied ARGB pixel: alpha in bits 24..32, then red, green, blue.
pub type Argb32 = u32;

#[inline]
pub const fn alpha(x: Argb32) -> u32 {
    x >> 24
}

#[inline]
pub const fn red(x: Argb32) -> u32 {
    (x >> 16) & 0xff
}

#[inline]
pub const fn green(x: Argb32) -> u32 {
    (x >> 8) & 0xff
}

#[inline]
pub const fn blue(x: Argb32) -> u32 {
    x & 0xff
}

#[inline]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> Argb32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Replicate one 8-bit value into all four channels.
#[inline]
pub const fn splat(v: u8) -> Argb32 {
    let v = v as u32;
    v | (v << 8) | (v << 16) | (v << 24)
}

/// Integer rectangle, half-open: `[x1, x2) x [y1, y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32, // exclusive
    pub y2: i32, // exclusive
}

impl IntRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            x1: x,
            y1: y,
            x2: x.saturating_add(w),
            y2: y.saturating_add(h),
        }
    }

    pub fn is_empty(self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    pub fn contains(self, x: i32, y: i32) -> bool {
        self.x1 <= x && x < self.x2 && self.y1 <= y && y < self.y2
    }

    pub fn intersect(self, other: Self) -> Self {
        Self {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
