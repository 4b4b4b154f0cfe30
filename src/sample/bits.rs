//! Raster sampling: transform, repeat policy and filters.

use crate::blend::kernels::{div_255, multiply_add_two_256};
use crate::foundation::core::{Argb32, Point, alpha, blue, green, red};
use crate::foundation::error::PixcompResult;
use crate::foundation::fixed::Fixed;
use crate::image::bits::BitsImage;
use crate::image::format::fetch_pixel;
use crate::image::model::{Filter, ImageHeader, Repeat};
use crate::memory::access::{DirectAccess, MemoryAccess};
use crate::sample::scanline_origin;

/// Fold a raster coordinate into `[0, size)`; `None` when it falls outside
/// under [`Repeat::None`].
#[inline]
pub(crate) fn repeat_coord(v: i32, size: i32, repeat: Repeat) -> Option<i32> {
    if size <= 0 {
        return None;
    }
    match repeat {
        Repeat::None => (0..size).contains(&v).then_some(v),
        Repeat::Normal => Some(v.rem_euclid(size)),
        Repeat::Pad => Some(v.clamp(0, size - 1)),
        Repeat::Reflect => {
            let period = i64::from(size) * 2;
            let m = i64::from(v).rem_euclid(period);
            let m = if m >= i64::from(size) { period - 1 - m } else { m };
            Some(m as i32)
        }
    }
}

struct Texels<'a, A> {
    acc: &'a A,
    bits: &'a BitsImage,
    buf: &'a [u8],
    repeat: Repeat,
    width: i32,
    height: i32,
}

impl<A: MemoryAccess> Texels<'_, A> {
    #[inline]
    fn get(&self, x: i32, y: i32) -> Argb32 {
        match (
            repeat_coord(x, self.width, self.repeat),
            repeat_coord(y, self.height, self.repeat),
        ) {
            (Some(x), Some(y)) => fetch_pixel(
                self.acc,
                self.bits.format(),
                self.bits.indexed(),
                self.buf,
                self.bits.pixel_offset(x, y),
            ),
            _ => 0,
        }
    }

    fn bilinear(&self, p: Point) -> Argb32 {
        let fx = p.x - 0.5;
        let fy = p.y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let distx = (((fx - x0) * 256.0) as u32).min(256);
        let disty = (((fy - y0) * 256.0) as u32).min(256);
        let (x0, y0) = (x0 as i32, y0 as i32);
        let x1 = x0.saturating_add(1);
        let y1 = y0.saturating_add(1);

        let top = multiply_add_two_256(self.get(x0, y0), 256 - distx, self.get(x1, y0), distx);
        let bottom = multiply_add_two_256(self.get(x0, y1), 256 - distx, self.get(x1, y1), distx);
        multiply_add_two_256(top, 256 - disty, bottom, disty)
    }

    fn convolve(&self, p: Point, kw: i32, kh: i32, weights: &[Fixed]) -> Argb32 {
        let x0 = (p.x.floor() as i32).saturating_sub((kw - 1) / 2);
        let y0 = (p.y.floor() as i32).saturating_sub((kh - 1) / 2);
        let mut sums = [0i64; 4];
        for j in 0..kh {
            for i in 0..kw {
                let k = i64::from(weights[(j * kw + i) as usize].0);
                if k == 0 {
                    continue;
                }
                let px = self.get(x0.saturating_add(i), y0.saturating_add(j));
                for (c, sum) in sums.iter_mut().enumerate() {
                    *sum += i64::from((px >> (c * 8)) & 0xff) * k;
                }
            }
        }
        sums.iter().enumerate().fold(0, |acc, (c, &sum)| {
            let v = ((sum + 0x8000) >> 16).clamp(0, 255) as u32;
            acc | (v << (c * 8))
        })
    }
}

/// Fetch `out.len()` device pixels of row `y` starting at column `x`.
pub(crate) fn fetch_bits(
    header: &ImageHeader,
    bits: &BitsImage,
    x: i32,
    y: i32,
    out: &mut [u32],
) -> PixcompResult<()> {
    let buf = bits.read()?;
    match header.accessors() {
        Some(acc) => fetch_bits_with(&acc, header, bits, &buf, x, y, out),
        None => fetch_bits_with(&DirectAccess, header, bits, &buf, x, y, out),
    }
}

fn fetch_bits_with<A: MemoryAccess>(
    acc: &A,
    header: &ImageHeader,
    bits: &BitsImage,
    buf: &[u8],
    x: i32,
    y: i32,
    out: &mut [u32],
) -> PixcompResult<()> {
    let texels = Texels {
        acc,
        bits,
        buf,
        repeat: header.repeat(),
        width: bits.width() as i32,
        height: bits.height() as i32,
    };

    if header.transform().is_none() && header.filter() != Filter::Convolution {
        for (i, px) in out.iter_mut().enumerate() {
            *px = texels.get(x.wrapping_add(i as i32), y);
        }
        return Ok(());
    }

    let (origin, step) = scanline_origin(header, x, y);
    let at = |i: usize| origin + step * i as f64;
    match header.filter() {
        Filter::Fast | Filter::Nearest => {
            for (i, px) in out.iter_mut().enumerate() {
                let p = at(i);
                *px = texels.get(p.x.floor() as i32, p.y.floor() as i32);
            }
        }
        Filter::Good | Filter::Best | Filter::Bilinear => {
            for (i, px) in out.iter_mut().enumerate() {
                *px = texels.bilinear(at(i));
            }
        }
        Filter::Convolution => {
            let (kw, kh, weights) = header.convolution_kernel()?;
            for (i, px) in out.iter_mut().enumerate() {
                *px = texels.convolve(at(i), kw, kh, weights);
            }
        }
    }
    Ok(())
}

/// Stored pixels of row `y` from column `x`, ignoring transform, filter and
/// repeat; transparent outside the raster.
pub(crate) fn fetch_raster_row(
    header: &ImageHeader,
    bits: &BitsImage,
    x: i32,
    y: i32,
    out: &mut [u32],
) -> PixcompResult<()> {
    let buf = bits.read()?;
    match header.accessors() {
        Some(acc) => fetch_raster_row_with(&acc, bits, &buf, x, y, out),
        None => fetch_raster_row_with(&DirectAccess, bits, &buf, x, y, out),
    }
    Ok(())
}

fn fetch_raster_row_with<A: MemoryAccess>(
    acc: &A,
    bits: &BitsImage,
    buf: &[u8],
    x: i32,
    y: i32,
    out: &mut [u32],
) {
    let texels = Texels {
        acc,
        bits,
        buf,
        repeat: Repeat::None,
        width: bits.width() as i32,
        height: bits.height() as i32,
    };
    for (i, px) in out.iter_mut().enumerate() {
        *px = texels.get(x.wrapping_add(i as i32), y);
    }
}

/// Alpha channel of `map` at `(x + i, y)` in map coordinates; transparent
/// outside the map. `header` is the map's own header.
pub(crate) fn fetch_alpha_row(
    header: &ImageHeader,
    map: &BitsImage,
    x: i32,
    y: i32,
    out: &mut [u32],
) -> PixcompResult<()> {
    let buf = map.read()?;
    match header.accessors() {
        Some(acc) => fetch_alpha_row_with(&acc, map, &buf, x, y, out),
        None => fetch_alpha_row_with(&DirectAccess, map, &buf, x, y, out),
    }
    Ok(())
}

fn fetch_alpha_row_with<A: MemoryAccess>(
    acc: &A,
    map: &BitsImage,
    buf: &[u8],
    x: i32,
    y: i32,
    out: &mut [u32],
) {
    for (i, px) in out.iter_mut().enumerate() {
        let sx = x.wrapping_add(i as i32);
        *px = if map.contains(sx, y) {
            let offset = map.pixel_offset(sx, y);
            fetch_pixel(acc, map.format(), map.indexed(), buf, offset) & 0xff00_0000
        } else {
            0
        };
    }
}

/// Replace each pixel's alpha with the external alpha and scale its color
/// channels by it.
pub(crate) fn apply_external_alpha(out: &mut [u32], alphas: &[u32]) {
    for (px, &a) in out.iter_mut().zip(alphas) {
        let a = alpha(a);
        *px = (a << 24)
            | (div_255(red(*px) * a) << 16)
            | (div_255(green(*px) * a) << 8)
            | div_255(blue(*px) * a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sample/bits.rs"]
mod tests;
