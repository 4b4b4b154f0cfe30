//! Unified-alpha combine functions: one alpha value governs every channel.
//!
//! Each function combines `src` into `dest` in place. A mask, if any, has
//! already been folded into `src` by [`combine_mask_unified`].

use crate::blend::kernels::{
    blend_channel, int_div, multiply, multiply_add_two, multiply_and_add, saturating_add,
};
use crate::foundation::core::{Argb32, alpha};

pub(crate) const A_OUT: u8 = 1;
pub(crate) const A_IN: u8 = 2;
pub(crate) const B_OUT: u8 = 4;
pub(crate) const B_IN: u8 = 8;

pub(crate) const PARTS_A: u8 = A_OUT | A_IN;
pub(crate) const PARTS_B: u8 = B_OUT | B_IN;
pub(crate) const PARTS_A_OVER: u8 = A_OUT | B_OUT | PARTS_A;
pub(crate) const PARTS_B_OVER: u8 = A_OUT | B_OUT | PARTS_B;
pub(crate) const PARTS_A_ATOP: u8 = B_OUT | A_IN;
pub(crate) const PARTS_B_ATOP: u8 = A_OUT | B_IN;
pub(crate) const PARTS_XOR: u8 = A_OUT | B_OUT;

/// Scale every source pixel by the alpha of the matching mask pixel.
pub fn combine_mask_unified(src: &mut [u32], mask: &[u32]) {
    for (s, &m) in src.iter_mut().zip(mask) {
        let a = alpha(m);
        if a == 0 {
            *s = 0;
        } else if a != 0xff {
            *s = multiply(*s, a);
        }
    }
}

#[inline]
fn apply(dest: &mut [u32], src: &[u32], f: impl Fn(Argb32, Argb32) -> Argb32) {
    for (d, &s) in dest.iter_mut().zip(src) {
        *d = f(s, *d);
    }
}

pub fn clear(dest: &mut [u32], _src: &[u32]) {
    dest.fill(0);
}

pub fn src(dest: &mut [u32], src: &[u32]) {
    let n = dest.len().min(src.len());
    dest[..n].copy_from_slice(&src[..n]);
}

pub fn dst(_dest: &mut [u32], _src: &[u32]) {}

pub fn over(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply_and_add(d, alpha(!s), s));
}

pub fn over_reverse(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply_and_add(s, alpha(!d), d));
}

pub fn in_(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply(s, alpha(d)));
}

pub fn in_reverse(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply(d, alpha(s)));
}

pub fn out(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply(s, alpha(!d)));
}

pub fn out_reverse(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply(d, alpha(!s)));
}

pub fn atop(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply_add_two(s, alpha(d), d, alpha(!s)));
}

pub fn atop_reverse(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply_add_two(s, alpha(!d), d, alpha(s)));
}

pub fn xor(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| multiply_add_two(s, alpha(!d), d, alpha(!s)));
}

pub fn add(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| saturating_add(d, s));
}

/// Add as much of the source as still fits under the destination's
/// remaining coverage.
pub fn saturate(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| {
        let sa = alpha(s);
        let da = alpha(!d);
        let s = if sa > da { multiply(s, int_div(da, sa)) } else { s };
        saturating_add(d, s)
    });
}

/// `min(1, (1 - b) / a)`
#[inline]
pub(crate) const fn disjoint_out_part(a: u32, b: u32) -> u32 {
    let nb = 0xff - b;
    if nb >= a { 0xff } else { int_div(nb, a) }
}

/// `max(1 - (1 - b) / a, 0)`
#[inline]
pub(crate) const fn disjoint_in_part(a: u32, b: u32) -> u32 {
    let nb = 0xff - b;
    if nb >= a { 0 } else { 0xff - int_div(nb, a) }
}

/// `max(1 - b / a, 0)`
#[inline]
pub(crate) const fn conjoint_out_part(a: u32, b: u32) -> u32 {
    if b >= a { 0 } else { 0xff - int_div(b, a) }
}

/// `min(1, b / a)`
#[inline]
pub(crate) const fn conjoint_in_part(a: u32, b: u32) -> u32 {
    if b >= a { 0xff } else { int_div(b, a) }
}

/// Coverage factor `(Fa, Fb)` for one pair of alphas.
///
/// `JOINT` selects the disjoint (`false`) or conjoint (`true`) part
/// functions; `parts` is a combination of the `A_*`/`B_*` flags.
#[inline]
pub(crate) const fn joint_factors<const JOINT: bool>(parts: u8, sa: u32, da: u32) -> (u32, u32) {
    let fa = match parts & PARTS_A {
        A_OUT => {
            if JOINT {
                conjoint_out_part(sa, da)
            } else {
                disjoint_out_part(sa, da)
            }
        }
        A_IN => {
            if JOINT {
                conjoint_in_part(sa, da)
            } else {
                disjoint_in_part(sa, da)
            }
        }
        PARTS_A => 0xff,
        _ => 0,
    };
    let fb = match parts & PARTS_B {
        B_OUT => {
            if JOINT {
                conjoint_out_part(da, sa)
            } else {
                disjoint_out_part(da, sa)
            }
        }
        B_IN => {
            if JOINT {
                conjoint_in_part(da, sa)
            } else {
                disjoint_in_part(da, sa)
            }
        }
        PARTS_B => 0xff,
        _ => 0,
    };
    (fa, fb)
}

/// `s * Fa + d * Fb` per channel for the disjoint/conjoint operator family.
pub(crate) fn joint<const JOINT: bool, const PARTS: u8>(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| {
        let (fa, fb) = joint_factors::<JOINT>(PARTS, alpha(s), alpha(d));
        blend_channel(s, d, 0, fa, fb)
            | blend_channel(s, d, 8, fa, fb)
            | blend_channel(s, d, 16, fa, fb)
            | blend_channel(s, d, 24, fa, fb)
    });
}

pub fn disjoint_over(dest: &mut [u32], src: &[u32]) {
    apply(dest, src, |s, d| match alpha(s) {
        0 => d,
        0xff => s,
        a => multiply_and_add(d, disjoint_out_part(alpha(d), a), s),
    });
}

#[cfg(test)]
#[path = "../../tests/unit/blend/unified.rs"]
mod tests;
