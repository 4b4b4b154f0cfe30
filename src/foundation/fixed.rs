//! 16.16 fixed-point scalars used for gradient geometry and filter kernels.

use crate::foundation::core::Point;

/// Signed 16.16 fixed-point value.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << 16);
    pub const HALF: Self = Self(1 << 15);
    /// Smallest representable step.
    pub const EPSILON: Self = Self(1);

    pub const fn from_int(v: i16) -> Self {
        Self((v as i32) << 16)
    }

    /// Round-to-nearest conversion; saturates outside the representable range.
    pub fn from_f64(v: f64) -> Self {
        Self((v * 65536.0).round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }

    pub const fn floor_int(self) -> i32 {
        self.0 >> 16
    }

    pub const fn frac(self) -> i32 {
        self.0 & 0xffff
    }
}

/// A point with fixed-point coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PointFixed {
    pub x: Fixed,
    pub y: Fixed,
}

impl PointFixed {
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x.to_f64(), self.y.to_f64())
    }
}
