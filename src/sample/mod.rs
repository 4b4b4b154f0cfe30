//! Paint-source sampling: one scanline of device pixels from any image kind.

pub mod bits;
pub mod gradient;

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::image::model::{Filter, Image, ImageHeader, ImageKind, SourceClass};

/// Source-space position of device pixel `(x, y)`'s center, and the
/// source-space step between horizontally adjacent device pixels.
pub(crate) fn scanline_origin(header: &ImageHeader, x: i32, y: i32) -> (Point, Vec2) {
    let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
    match header.transform() {
        Some(t) => {
            let [a, b, ..] = t.as_coeffs();
            (*t * center, Vec2::new(a, b))
        }
        None => (center, Vec2::new(1.0, 0.0)),
    }
}

/// Check what fetching from `image` requires, before any pixel is written.
pub(crate) fn validate(image: &Image) -> PixcompResult<()> {
    if let Some(bits) = image.as_bits() {
        bits.validate_palette()?;
        if image.header().filter() == Filter::Convolution {
            image.header().convolution_kernel()?;
        }
    }
    validate_alpha_map(image)
}

/// Like [`validate`] for an image only read back raw as a destination:
/// its filter is never applied, so its kernel is not checked.
pub(crate) fn validate_destination(image: &Image) -> PixcompResult<()> {
    if let Some(bits) = image.as_bits() {
        bits.validate_palette()?;
    }
    validate_alpha_map(image)
}

fn validate_alpha_map(image: &Image) -> PixcompResult<()> {
    if let Some((map, _, _)) = image.header().alpha_map_image()
        && let Some(bits) = map.as_bits()
    {
        bits.validate_palette()?;
    }
    Ok(())
}

fn fetch_kind(image: &Image, x: i32, y: i32, out: &mut [u32]) -> PixcompResult<()> {
    let header = image.header();
    match image.kind() {
        ImageKind::Bits(bits) => bits::fetch_bits(header, bits, x, y, out)?,
        ImageKind::Solid(color) => out.fill(*color),
        ImageKind::Linear(g) => gradient::fetch_linear(header, g, x, y, out),
        ImageKind::Radial(g) => gradient::fetch_radial(header, g, x, y, out),
        ImageKind::Conical(g) => gradient::fetch_conical(header, g, x, y, out),
    }
    Ok(())
}

/// Fetch `out.len()` premultiplied pixels of device row `y`, starting at
/// column `x`, with the image's external alpha applied.
pub fn fetch_scanline(image: &Image, x: i32, y: i32, out: &mut [u32]) -> PixcompResult<()> {
    if out.is_empty() {
        return Ok(());
    }
    if image.class() == SourceClass::Horizontal {
        fetch_kind(image, x, y, &mut out[..1])?;
        let v = out[0];
        out.fill(v);
    } else {
        fetch_kind(image, x, y, out)?;
    }

    apply_alpha_map(image, x, y, out)
}

/// Fetch the stored pixels of destination row `y` from column `x`, without
/// transform or repeat, with the image's external alpha applied. Pixels
/// outside the raster read as transparent.
pub(crate) fn fetch_destination(image: &Image, x: i32, y: i32, out: &mut [u32]) -> PixcompResult<()> {
    let bits = image
        .as_bits()
        .ok_or_else(|| PixcompError::contract("destination must be a raster image"))?;
    bits::fetch_raster_row(image.header(), bits, x, y, out)?;
    apply_alpha_map(image, x, y, out)
}

fn apply_alpha_map(image: &Image, x: i32, y: i32, out: &mut [u32]) -> PixcompResult<()> {
    let Some((map, ox, oy)) = image.header().alpha_map_image() else {
        return Ok(());
    };
    let Some(map_bits) = map.as_bits() else {
        return Ok(());
    };
    let mut alphas = Vec::new();
    alphas
        .try_reserve_exact(out.len())
        .map_err(|e| PixcompError::resource(format!("alpha scanline: {e}")))?;
    alphas.resize(out.len(), 0);
    bits::fetch_alpha_row(
        map.header(),
        map_bits,
        x.wrapping_sub(ox),
        y.wrapping_sub(oy),
        &mut alphas,
    )?;
    bits::apply_external_alpha(out, &alphas);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/sample/mod.rs"]
mod tests;
