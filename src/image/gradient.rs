//! Gradient stops, color tables and the three gradient geometries.

use anyhow::Context;

use crate::blend::kernels::int_mult;
use crate::foundation::core::{Argb32, pack_argb};
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::foundation::fixed::{Fixed, PointFixed};

pub const DEFAULT_COLOR_TABLE_SIZE: usize = 256;
pub const MIN_COLOR_TABLE_SIZE: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Construction options shared by every gradient kind.
pub struct GradientOptions {
    /// Number of entries in the precomputed color table.
    pub color_table_size: usize,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            color_table_size: DEFAULT_COLOR_TABLE_SIZE,
        }
    }
}

impl GradientOptions {
    pub fn from_json_str(s: &str) -> PixcompResult<Self> {
        let opts: Self = serde_json::from_str(s).context("parse gradient options json")?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> PixcompResult<()> {
        if self.color_table_size < MIN_COLOR_TABLE_SIZE {
            return Err(PixcompError::contract(format!(
                "color_table_size must be >= {MIN_COLOR_TABLE_SIZE}, got {}",
                self.color_table_size
            )));
        }
        Ok(())
    }
}

/// Straight (non-premultiplied) color, 16 bits per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

impl Color {
    pub const fn new(red: u16, green: u16, blue: u16, alpha: u16) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Widen 8-bit straight channels (`0xff` becomes `0xffff`).
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as u16 * 257,
            g as u16 * 257,
            b as u16 * 257,
            a as u16 * 257,
        )
    }

    fn to_premultiplied(self) -> Argb32 {
        let narrow = |c: u16| (u32::from(c) * 255 + 32767) / 65535;
        let a = narrow(self.alpha);
        pack_argb(
            a as u8,
            int_mult(narrow(self.red), a) as u8,
            int_mult(narrow(self.green), a) as u8,
            int_mult(narrow(self.blue), a) as u8,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position along the ramp, in `[0, 1]`.
    pub x: Fixed,
    pub color: Color,
}

impl GradientStop {
    pub fn new(x: f64, color: Color) -> Self {
        Self {
            x: Fixed::from_f64(x),
            color,
        }
    }
}

/// Stops plus the color table derived from them.
///
/// The table is rebuilt whenever the stops are assigned, so it never goes
/// stale. Its size is fixed when the gradient is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gradient {
    stops: Vec<GradientStop>,
    color_table: Vec<Argb32>,
}

impl Gradient {
    pub fn new(stops: Vec<GradientStop>, options: &GradientOptions) -> PixcompResult<Self> {
        options.validate()?;
        let mut color_table = Vec::new();
        color_table
            .try_reserve_exact(options.color_table_size)
            .map_err(|e| PixcompError::resource(format!("gradient color table: {e}")))?;
        color_table.resize(options.color_table_size, 0);

        let mut gradient = Self {
            stops: Vec::new(),
            color_table,
        };
        gradient.set_stops(stops)?;
        Ok(gradient)
    }

    /// Replace the stops and rebuild the color table.
    pub fn set_stops(&mut self, stops: Vec<GradientStop>) -> PixcompResult<()> {
        validate_stops(&stops)?;
        self.stops = stops;
        fill_color_table(&self.stops, &mut self.color_table);
        Ok(())
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn n_stops(&self) -> usize {
        self.stops.len()
    }

    /// Distance between the first and last stop.
    pub fn stop_range(&self) -> Fixed {
        match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => Fixed(last.x.0 - first.x.0),
            _ => Fixed::ZERO,
        }
    }

    pub fn color_table(&self) -> &[Argb32] {
        &self.color_table
    }

    pub fn color_table_size(&self) -> usize {
        self.color_table.len()
    }

    /// Table entry nearest to `t`, with `t` clamped to `[0, 1]`.
    #[inline]
    pub fn color_at(&self, t: f64) -> Argb32 {
        let last = self.color_table.len() - 1;
        let index = (t * last as f64).round();
        let index = if index.is_nan() {
            0
        } else {
            (index.max(0.0) as usize).min(last)
        };
        self.color_table[index]
    }
}

fn validate_stops(stops: &[GradientStop]) -> PixcompResult<()> {
    let mut prev = Fixed::ZERO;
    for (i, stop) in stops.iter().enumerate() {
        if stop.x < Fixed::ZERO || stop.x > Fixed::ONE {
            return Err(PixcompError::contract(format!(
                "gradient stop {i} at {} lies outside [0, 1]",
                stop.x.to_f64()
            )));
        }
        if stop.x < prev {
            return Err(PixcompError::contract(format!(
                "gradient stop {i} at {} precedes the previous stop",
                stop.x.to_f64()
            )));
        }
        prev = stop.x;
    }
    Ok(())
}

fn lerp_u16(a: u16, b: u16, w: i64) -> u16 {
    let (a, b) = (i64::from(a), i64::from(b));
    (a + (((b - a) * w + 0x8000) >> 16)).clamp(0, 0xffff) as u16
}

fn lerp_color(a: Color, b: Color, w: i64) -> Color {
    Color::new(
        lerp_u16(a.red, b.red, w),
        lerp_u16(a.green, b.green, w),
        lerp_u16(a.blue, b.blue, w),
        lerp_u16(a.alpha, b.alpha, w),
    )
}

/// Interpolate straight colors between stops, then premultiply.
fn fill_color_table(stops: &[GradientStop], table: &mut [Argb32]) {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        table.fill(0);
        return;
    };
    let steps = (table.len() - 1) as i64;
    let mut seg = 0usize;
    for (i, entry) in table.iter_mut().enumerate() {
        let t = (i as i64 * i64::from(Fixed::ONE.0) + steps / 2) / steps;
        let color = if t <= i64::from(first.x.0) {
            first.color
        } else if t >= i64::from(last.x.0) {
            last.color
        } else {
            while seg + 1 < stops.len() && i64::from(stops[seg + 1].x.0) <= t {
                seg += 1;
            }
            let (lo, hi) = (&stops[seg], &stops[seg + 1]);
            let span = i64::from(hi.x.0 - lo.x.0);
            let w = ((t - i64::from(lo.x.0)) << 16) / span;
            lerp_color(lo.color, hi.color, w)
        };
        *entry = color.to_premultiplied();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub gradient: Gradient,
    pub p1: PointFixed,
    pub p2: PointFixed,
}

impl LinearGradient {
    pub fn new(p1: PointFixed, p2: PointFixed, gradient: Gradient) -> Self {
        Self { gradient, p1, p2 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Circle {
    pub x: Fixed,
    pub y: Fixed,
    pub radius: Fixed,
}

impl Circle {
    pub fn from_f64(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
            radius: Fixed::from_f64(radius),
        }
    }
}

/// Two-circle radial gradient.
///
/// The gradient is the family of circles interpolated from `c1` (t = 0) to
/// `c2` (t = 1); circles with a negative radius are excluded.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub gradient: Gradient,
    c1: Circle,
    c2: Circle,
    cdx: f64,
    cdy: f64,
    dr: f64,
    a: f64,
}

impl RadialGradient {
    pub fn new(c1: Circle, c2: Circle, gradient: Gradient) -> PixcompResult<Self> {
        if c1.radius < Fixed::ZERO || c2.radius < Fixed::ZERO {
            return Err(PixcompError::contract("radial gradient radius must be >= 0"));
        }
        let cdx = c2.x.to_f64() - c1.x.to_f64();
        let cdy = c2.y.to_f64() - c1.y.to_f64();
        let dr = c2.radius.to_f64() - c1.radius.to_f64();
        Ok(Self {
            gradient,
            c1,
            c2,
            cdx,
            cdy,
            dr,
            a: cdx * cdx + cdy * cdy - dr * dr,
        })
    }

    pub fn c1(&self) -> Circle {
        self.c1
    }

    pub fn c2(&self) -> Circle {
        self.c2
    }

    /// Gradient parameter at `(px, py)`, or `None` where no admissible
    /// circle passes through the point.
    pub fn parameter(&self, px: f64, py: f64) -> Option<f64> {
        let r1 = self.c1.radius.to_f64();
        let pdx = px - self.c1.x.to_f64();
        let pdy = py - self.c1.y.to_f64();
        let b = pdx * self.cdx + pdy * self.cdy + r1 * self.dr;
        let c = pdx * pdx + pdy * pdy - r1 * r1;
        let admissible = |t: f64| r1 + t * self.dr >= 0.0;

        if self.a == 0.0 {
            if b == 0.0 {
                return None;
            }
            let t = c / (2.0 * b);
            return admissible(t).then_some(t);
        }

        let discr = b * b - self.a * c;
        if discr < 0.0 {
            return None;
        }
        let sqrt = discr.sqrt();
        let t1 = (b + sqrt) / self.a;
        let t2 = (b - sqrt) / self.a;
        let (hi, lo) = if t1 >= t2 { (t1, t2) } else { (t2, t1) };
        if admissible(hi) {
            Some(hi)
        } else if admissible(lo) {
            Some(lo)
        } else {
            None
        }
    }
}

/// Angular gradient around `center`, starting at `angle` degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct ConicalGradient {
    pub gradient: Gradient,
    pub center: PointFixed,
    pub angle: Fixed,
}

impl ConicalGradient {
    pub fn new(center: PointFixed, angle: Fixed, gradient: Gradient) -> Self {
        Self {
            gradient,
            center,
            angle,
        }
    }

    /// Angular position of `(px, py)` as a fraction of a turn, in `[0, 1)`.
    pub fn parameter(&self, px: f64, py: f64) -> f64 {
        let dx = px - self.center.x.to_f64();
        let dy = py - self.center.y.to_f64();
        let turn = std::f64::consts::TAU;
        let theta = dy.atan2(dx) + self.angle.to_f64().to_radians();
        let t = theta.rem_euclid(turn) / turn;
        if t >= 1.0 { 0.0 } else { t }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/gradient.rs"]
mod tests;
