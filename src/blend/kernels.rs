//! Fixed-point blend kernels on packed ARGB32 pixels.
//!
//! Every `/255` kernel rounds exactly (`round(a * b / 255)`), using the
//! `t = a * b + 0x80; (t + (t >> 8)) >> 8` identity. Most kernels process two
//! channels per 32-bit word: red/blue in the `0x00ff00ff` lanes, then
//! alpha/green after shifting right by 8.
//!
//! These are the reference semantics any vectorized variant has to reproduce
//! bit for bit.

use crate::foundation::core::Argb32;

const RB_MASK: u32 = 0x00ff_00ff;
const AG_MASK: u32 = 0xff00_ff00;
const RB_ONE_HALF: u32 = 0x0080_0080;
const RB_MASK_PLUS_ONE: u32 = 0x0100_0100;

/// `round(a * b / 255)` for one 8-bit channel.
#[inline]
pub const fn int_mult(a: u32, b: u32) -> u32 {
    let t = a * b + 0x80;
    ((t >> 8) + t) >> 8
}

/// `a * 255 / b`, truncating. `b` must be non-zero and `a <= b` keeps the
/// result within a channel.
#[inline]
pub const fn int_div(a: u32, b: u32) -> u32 {
    (a * 255) / b
}

/// Rounding division of a 16-bit product by 255.
#[inline]
pub const fn div_255(x: u32) -> u32 {
    (x + 0x80 + ((x + 0x80) >> 8)) >> 8
}

#[inline]
const fn saturate_lane(t: u32) -> u32 {
    // t <= 0x1fe; a carry into bit 8 turns the lane into 0xff.
    (t | 0u32.wrapping_sub(t >> 8)) & 0xff
}

#[inline]
const fn rb_saturate(t: u32) -> u32 {
    (t | (RB_MASK_PLUS_ONE - ((t >> 8) & RB_MASK))) & RB_MASK
}

/// Two lanes (`RB_MASK` positions of `x`) times one scalar, rounded.
#[inline]
const fn rb_mul(x: u32, a: u32) -> u32 {
    let t = (x & RB_MASK) * a + RB_ONE_HALF;
    ((t + ((t >> 8) & RB_MASK)) >> 8) & RB_MASK
}

/// Two lanes of `x` times the matching lanes of `a`, rounded.
#[inline]
const fn rb_mul_lanes(x: u32, a: u32) -> u32 {
    let t = ((x & 0xff) * (a & 0xff)) | ((x & 0x00ff_0000) * ((a >> 16) & 0xff));
    let t = t + RB_ONE_HALF;
    ((t + ((t >> 8) & RB_MASK)) >> 8) & RB_MASK
}

#[inline]
const fn lane_add_mul(x: u32, a: u32, y: u32, b: u32) -> u32 {
    let t = x * a + y * b + 0x80;
    (t + (t >> 8)) >> 8
}

/// `x_c = x_c * a / 255` for every channel.
#[inline]
pub const fn multiply(x: Argb32, a: u32) -> Argb32 {
    rb_mul(x, a) | (rb_mul(x >> 8, a) << 8)
}

/// `x_c = min(255, x_c * a / 255 + y_c)` for every channel.
#[inline]
pub const fn multiply_and_add(x: Argb32, a: u32, y: Argb32) -> Argb32 {
    let rb = rb_saturate(rb_mul(x, a) + (y & RB_MASK));
    let ag = rb_saturate(rb_mul(x >> 8, a) + ((y >> 8) & RB_MASK));
    rb | (ag << 8)
}

/// `x_c = min(255, (x_c * a + y_c * b) / 255)` for every channel.
#[inline]
pub const fn multiply_add_two(x: Argb32, a: u32, y: Argb32, b: u32) -> Argb32 {
    let ag = (lane_add_mul(x >> 24, a, y >> 24, b) << 16)
        | lane_add_mul((x >> 8) & 0xff, a, (y >> 8) & 0xff, b);
    let rb = (lane_add_mul((x >> 16) & 0xff, a, (y >> 16) & 0xff, b) << 16)
        | lane_add_mul(x & 0xff, a, y & 0xff, b);
    rb_saturate(rb) | (rb_saturate(ag) << 8)
}

/// `x_c = (x_c * a + y_c * b) >> 8` for every channel.
///
/// Truncating division by 256; only defined for `a + b <= 256`, which is the
/// case for interpolation weights.
#[inline]
pub const fn multiply_add_two_256(x: Argb32, a: u32, y: Argb32, b: u32) -> Argb32 {
    let rb = ((x & RB_MASK)
        .wrapping_mul(a)
        .wrapping_add((y & RB_MASK).wrapping_mul(b))
        >> 8)
        & RB_MASK;
    let ag = ((x >> 8) & RB_MASK)
        .wrapping_mul(a)
        .wrapping_add(((y >> 8) & RB_MASK).wrapping_mul(b))
        & AG_MASK;
    ag | rb
}

/// `x_c = x_c * a_c / 255`, each channel scaled by its own channel of `a`.
#[inline]
pub const fn multiply_component(x: Argb32, a: Argb32) -> Argb32 {
    rb_mul_lanes(x, a) | (rb_mul_lanes(x >> 8, a >> 8) << 8)
}

/// `x_c = min(255, x_c * a_c / 255 + y_c)`.
#[inline]
pub const fn multiply_and_add_component(x: Argb32, a: Argb32, y: Argb32) -> Argb32 {
    let rb = rb_saturate(rb_mul_lanes(x, a) + (y & RB_MASK));
    let ag = rb_saturate(rb_mul_lanes(x >> 8, a >> 8) + ((y >> 8) & RB_MASK));
    rb | (ag << 8)
}

/// `x_c = min(255, (x_c * a_c + y_c * b) / 255)`.
#[inline]
pub const fn multiply_add_two_component(x: Argb32, a: Argb32, y: Argb32, b: u32) -> Argb32 {
    let ag = (lane_add_mul(x >> 24, a >> 24, y >> 24, b) << 16)
        | lane_add_mul((x >> 8) & 0xff, (a >> 8) & 0xff, (y >> 8) & 0xff, b);
    let rb = (lane_add_mul((x >> 16) & 0xff, (a >> 16) & 0xff, (y >> 16) & 0xff, b) << 16)
        | lane_add_mul(x & 0xff, a & 0xff, y & 0xff, b);
    rb_saturate(rb) | (rb_saturate(ag) << 8)
}

/// `x_c = min(255, x_c + y_c)`.
#[inline]
pub const fn saturating_add(x: Argb32, y: Argb32) -> Argb32 {
    let rb = rb_saturate((x & RB_MASK) + (y & RB_MASK));
    let ag = rb_saturate(((x >> 8) & RB_MASK) + ((y >> 8) & RB_MASK));
    rb | (ag << 8)
}

/// One channel of `x * ax + y * ay`, saturated, left in place at `shift`.
#[inline]
pub const fn blend_channel(x: Argb32, y: Argb32, shift: u32, ax: u32, ay: u32) -> Argb32 {
    let t = int_mult((y >> shift) & 0xff, ay) + int_mult((x >> shift) & 0xff, ax);
    saturate_lane(t) << shift
}

/// One channel of `x + y`, saturated, left in place at `shift`.
#[inline]
pub const fn add_channel(x: Argb32, y: Argb32, shift: u32) -> Argb32 {
    let t = ((x >> shift) & 0xff) + ((y >> shift) & 0xff);
    saturate_lane(t) << shift
}

#[cfg(test)]
#[path = "../../tests/unit/blend/kernels.rs"]
mod tests;
