#![forbid(unsafe_code)]
//! Portable software compositing.
//!
//! `pixcomp` blends a paint source (raster, solid color or gradient) through
//! an optional mask into a destination raster, one scanline at a time, with
//! the Porter-Duff, disjoint and conjoint operator families on premultiplied
//! ARGB32 pixels.

pub mod blend;
pub mod compose;
pub mod foundation;
pub mod image;
pub mod interop;
pub mod memory;
pub mod sample;

pub use blend::Operator;
pub use compose::{ComposeOptions, ComposeRequest, composite, fill_rect};
pub use foundation::core::{Affine, Argb32, IntRect, Point, Vec2};
pub use foundation::error::{PixcompError, PixcompResult};
pub use foundation::fixed::{Fixed, PointFixed};
pub use crate::image::{
    BitsImage, Circle, Color, ConicalGradient, Filter, Gradient, GradientOptions, GradientStop,
    Image, ImageRef, Indexed, LinearGradient, PixelFormat, RadialGradient, Region, Repeat,
    SourceClass,
};
pub use interop::{from_rgba_image, to_rgba_image};
pub use memory::{ReadMemoryFn, WriteMemoryFn};
pub use sample::fetch_scanline;
