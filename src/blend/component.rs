//! Component-alpha combine functions: every channel carries its own alpha.
//!
//! The mask is applied inside each function because the per-channel source
//! alpha (`mask * src.alpha`) is part of the operator itself.

use crate::blend::kernels::{
    add_channel, blend_channel, multiply, multiply_add_two_component, multiply_and_add,
    multiply_and_add_component, multiply_component, saturating_add,
};
use crate::blend::unified::joint_factors;
use crate::foundation::core::{Argb32, alpha, splat};

/// Fold the mask into the source: returns `(src * mask, mask * src.alpha)`.
#[inline]
pub(crate) fn mask_c(s: Argb32, m: Argb32) -> (Argb32, Argb32) {
    match m {
        0 => (0, 0),
        0xffff_ffff => (s, splat(alpha(s) as u8)),
        _ => {
            let sa = alpha(s);
            (multiply_component(s, m), multiply(m, sa))
        }
    }
}

/// Source color scaled by the mask.
#[inline]
pub(crate) fn mask_value_c(s: Argb32, m: Argb32) -> Argb32 {
    match m {
        0 => 0,
        0xffff_ffff => s,
        _ => multiply_component(s, m),
    }
}

/// Per-channel source alpha: the mask scaled by the source alpha.
#[inline]
pub(crate) fn mask_alpha_c(s: Argb32, m: Argb32) -> Argb32 {
    let sa = alpha(s);
    match (m, sa) {
        (0, _) | (_, 0) => 0,
        (0xffff_ffff, _) => splat(sa as u8),
        (_, 0xff) => m,
        _ => multiply(m, sa),
    }
}

#[inline]
fn apply(
    dest: &mut [u32],
    src: &[u32],
    mask: &[u32],
    f: impl Fn(Argb32, Argb32, Argb32) -> Argb32,
) {
    for ((d, &s), &m) in dest.iter_mut().zip(src).zip(mask) {
        *d = f(s, m, *d);
    }
}

pub fn clear(dest: &mut [u32], _src: &[u32], _mask: &[u32]) {
    dest.fill(0);
}

pub fn src(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, _| mask_value_c(s, m));
}

pub fn dst(_dest: &mut [u32], _src: &[u32], _mask: &[u32]) {}

pub fn over(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        let (s, m) = mask_c(s, m);
        multiply_and_add_component(d, !m, s)
    });
}

pub fn over_reverse(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        let a = alpha(!d);
        if a == 0 {
            d
        } else {
            multiply_and_add(mask_value_c(s, m), a, d)
        }
    });
}

pub fn in_(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| multiply(mask_value_c(s, m), alpha(d)));
}

pub fn in_reverse(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        multiply_component(d, mask_alpha_c(s, m))
    });
}

pub fn out(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        multiply(mask_value_c(s, m), alpha(!d))
    });
}

pub fn out_reverse(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        multiply_component(d, !mask_alpha_c(s, m))
    });
}

pub fn atop(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        let (s, m) = mask_c(s, m);
        multiply_add_two_component(d, !m, s, alpha(d))
    });
}

pub fn atop_reverse(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        let (s, m) = mask_c(s, m);
        multiply_add_two_component(d, m, s, alpha(!d))
    });
}

pub fn xor(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        let (s, m) = mask_c(s, m);
        multiply_add_two_component(d, !m, s, alpha(!d))
    });
}

pub fn add(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| saturating_add(mask_value_c(s, m), d));
}

pub fn saturate(dest: &mut [u32], src: &[u32], mask: &[u32]) {
    apply(dest, src, mask, |s, m, d| {
        let (s, m) = mask_c(s, m);
        let da = alpha(!d);
        let mut out = 0;
        for shift in [0, 8, 16, 24] {
            let sc = (m >> shift) & 0xff;
            out |= if sc <= da {
                add_channel(s, d, shift)
            } else {
                blend_channel(s, d, shift, (da << 8) / sc, 0xff)
            };
        }
        out
    });
}

/// Per-channel `s * Fa_c + d * Fb_c` for the disjoint/conjoint family.
pub(crate) fn joint<const JOINT: bool, const PARTS: u8>(
    dest: &mut [u32],
    src: &[u32],
    mask: &[u32],
) {
    apply(dest, src, mask, |s, m, d| {
        let (s, m) = mask_c(s, m);
        let da = alpha(d);
        let mut out = 0;
        for shift in [0, 8, 16, 24] {
            let (fa, fb) = joint_factors::<JOINT>(PARTS, (m >> shift) & 0xff, da);
            out |= blend_channel(s, d, shift, fa, fb);
        }
        out
    });
}

#[cfg(test)]
#[path = "../../tests/unit/blend/component.rs"]
mod tests;
