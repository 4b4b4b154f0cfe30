//! Gradient evaluation: geometry to ramp position, repeat, table lookup.

use crate::foundation::core::{Argb32, Point};
use crate::image::gradient::{ConicalGradient, Gradient, LinearGradient, RadialGradient};
use crate::image::model::{ImageHeader, Repeat};
use crate::sample::scanline_origin;

/// Fold a ramp position per `repeat`; `None` is transparent.
#[inline]
pub(crate) fn repeat_t(t: f64, repeat: Repeat) -> Option<f64> {
    if !t.is_finite() {
        return None;
    }
    match repeat {
        Repeat::None => (0.0..=1.0).contains(&t).then_some(t),
        Repeat::Pad => Some(t.clamp(0.0, 1.0)),
        Repeat::Normal => Some(t - t.floor()),
        Repeat::Reflect => {
            let m = t.rem_euclid(2.0);
            Some(if m > 1.0 { 2.0 - m } else { m })
        }
    }
}

#[inline]
fn resolve(gradient: &Gradient, t: Option<f64>, repeat: Repeat) -> Argb32 {
    match t.and_then(|t| repeat_t(t, repeat)) {
        Some(t) => gradient.color_at(t),
        None => 0,
    }
}

fn fetch_with(
    header: &ImageHeader,
    gradient: &Gradient,
    x: i32,
    y: i32,
    out: &mut [u32],
    parameter: impl Fn(Point) -> Option<f64>,
) {
    let (origin, step) = scanline_origin(header, x, y);
    let repeat = header.repeat();
    for (i, px) in out.iter_mut().enumerate() {
        *px = resolve(gradient, parameter(origin + step * i as f64), repeat);
    }
}

pub(crate) fn fetch_linear(
    header: &ImageHeader,
    linear: &LinearGradient,
    x: i32,
    y: i32,
    out: &mut [u32],
) {
    let p1 = linear.p1.to_point();
    let axis = linear.p2.to_point() - p1;
    let len2 = axis.hypot2();
    if len2 == 0.0 {
        out.fill(0);
        return;
    }
    fetch_with(header, &linear.gradient, x, y, out, |p| {
        Some((p - p1).dot(axis) / len2)
    });
}

pub(crate) fn fetch_radial(
    header: &ImageHeader,
    radial: &RadialGradient,
    x: i32,
    y: i32,
    out: &mut [u32],
) {
    fetch_with(header, &radial.gradient, x, y, out, |p| {
        radial.parameter(p.x, p.y)
    });
}

pub(crate) fn fetch_conical(
    header: &ImageHeader,
    conical: &ConicalGradient,
    x: i32,
    y: i32,
    out: &mut [u32],
) {
    fetch_with(header, &conical.gradient, x, y, out, |p| {
        Some(conical.parameter(p.x, p.y))
    });
}

#[cfg(test)]
#[path = "../../tests/unit/sample/gradient.rs"]
mod tests;
