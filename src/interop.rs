//! Conversion between rasters and straight-alpha [`image::RgbaImage`] buffers.

use anyhow::Context;

use crate::foundation::core::{Argb32, alpha, blue, green, pack_argb, red};
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::image::bits::BitsImage;
use crate::image::model::Image;
use crate::sample::bits::fetch_raster_row;

/// Build an A8R8G8B8 raster from straight-alpha RGBA8 pixels.
pub fn from_rgba_image(rgba: &image::RgbaImage) -> PixcompResult<BitsImage> {
    let (width, height) = rgba.dimensions();
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact((width as usize) * (height as usize))
        .map_err(|e| PixcompError::resource(format!("rgba import of {width}x{height}: {e}")))?;
    pixels.extend(
        rgba.as_raw()
            .chunks_exact(4)
            .map(|px| premultiply(px[0], px[1], px[2], px[3])),
    );
    BitsImage::from_argb32(width, height, &pixels)
}

/// Read every stored pixel of a raster image back as straight-alpha RGBA8.
/// Honors the image's format, palette and read accessor.
pub fn to_rgba_image(raster: &Image) -> PixcompResult<image::RgbaImage> {
    let bits = raster
        .as_bits()
        .ok_or_else(|| PixcompError::contract("rgba export needs a raster image"))?;
    bits.validate_palette()?;
    let (width, height) = (bits.width(), bits.height());

    let mut row = vec![0u32; width as usize];
    let mut raw = Vec::new();
    raw.try_reserve_exact((width as usize) * (height as usize) * 4)
        .map_err(|e| PixcompError::resource(format!("rgba export of {width}x{height}: {e}")))?;
    for y in 0..height as i32 {
        fetch_raster_row(raster.header(), bits, 0, y, &mut row)?;
        for &px in &row {
            raw.extend_from_slice(&unpremultiply(px));
        }
    }
    let out = image::RgbaImage::from_raw(width, height, raw)
        .with_context(|| format!("assemble {width}x{height} rgba image"))?;
    Ok(out)
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> Argb32 {
    if a == 0 {
        return 0;
    }
    let a16 = u16::from(a);
    let mul = |c: u8| ((u16::from(c) * a16 + 127) / 255) as u8;
    pack_argb(a, mul(r), mul(g), mul(b))
}

fn unpremultiply(px: Argb32) -> [u8; 4] {
    let a = alpha(px);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let div = |c: u32| ((c * 255 + a / 2) / a).min(255) as u8;
    [div(red(px)), div(green(px)), div(blue(px)), a as u8]
}
