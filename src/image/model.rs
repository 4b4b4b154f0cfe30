use std::sync::{Arc, Weak};

use crate::foundation::core::{Affine, Argb32};
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::foundation::fixed::Fixed;
use crate::image::bits::BitsImage;
use crate::image::format::{fetch_pixel, store_pixel};
use crate::image::gradient::{ConicalGradient, Gradient, LinearGradient, RadialGradient};
use crate::image::region::Region;
use crate::memory::access::{
    DirectAccess, MemoryAccess, ReadMemoryFn, WrappedAccess, WriteMemoryFn,
};

/// Shared handle to an image. The strong count is the reference count.
pub type ImageRef = Arc<Image>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Sampling policy outside the source's defined domain.
pub enum Repeat {
    /// Transparent outside.
    #[default]
    None,
    /// Tile.
    Normal,
    /// Clamp to the nearest edge.
    Pad,
    /// Tile with every other copy mirrored.
    Reflect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Filter {
    #[default]
    Fast,
    Good,
    Best,
    Nearest,
    Bilinear,
    /// `filter_params` holds `[width, height, k0, k1, ...]`.
    Convolution,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// Hint that a paint source varies along one device axis only.
pub enum SourceClass {
    #[default]
    Unknown,
    /// Every pixel of a scanline has the same value.
    Horizontal,
    /// Every scanline is identical.
    Vertical,
}

/// Non-owning reference to a raster image supplying per-pixel alpha.
#[derive(Clone, Debug)]
pub struct AlphaMap {
    pub image: Weak<Image>,
    pub origin_x: i32,
    pub origin_y: i32,
}

/// State shared by every image kind.
#[derive(Clone, Default)]
pub struct ImageHeader {
    clip_region: Option<Region>,
    transform: Option<Affine>,
    repeat: Repeat,
    filter: Filter,
    filter_params: Vec<Fixed>,
    alpha_map: Option<AlphaMap>,
    component_alpha: bool,
    read_func: Option<ReadMemoryFn>,
    write_func: Option<WriteMemoryFn>,
}

impl std::fmt::Debug for ImageHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHeader")
            .field("clip_region", &self.clip_region)
            .field("transform", &self.transform)
            .field("repeat", &self.repeat)
            .field("filter", &self.filter)
            .field("filter_params", &self.filter_params)
            .field("alpha_map", &self.alpha_map)
            .field("component_alpha", &self.component_alpha)
            .field("read_func", &self.read_func.is_some())
            .field("write_func", &self.write_func.is_some())
            .finish()
    }
}

impl ImageHeader {
    pub fn clip_region(&self) -> Option<&Region> {
        self.clip_region.as_ref()
    }

    pub fn transform(&self) -> Option<&Affine> {
        self.transform.as_ref()
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn filter_params(&self) -> &[Fixed] {
        &self.filter_params
    }

    pub fn n_filter_params(&self) -> usize {
        self.filter_params.len()
    }

    pub fn alpha_map(&self) -> Option<&AlphaMap> {
        self.alpha_map.as_ref()
    }

    /// The alpha map image, if it is still alive.
    pub fn alpha_map_image(&self) -> Option<(ImageRef, i32, i32)> {
        let map = self.alpha_map.as_ref()?;
        match map.image.upgrade() {
            Some(image) => Some((image, map.origin_x, map.origin_y)),
            None => {
                tracing::trace!("alpha map dropped; ignoring");
                None
            }
        }
    }

    pub fn component_alpha(&self) -> bool {
        self.component_alpha
    }

    /// Accessor strategy for this image; `None` means direct access.
    pub fn accessors(&self) -> Option<WrappedAccess<'_>> {
        if self.read_func.is_none() && self.write_func.is_none() {
            return None;
        }
        Some(WrappedAccess {
            read: self.read_func.as_ref(),
            write: self.write_func.as_ref(),
        })
    }

    /// Convolution kernel as `(width, height, weights)`.
    pub fn convolution_kernel(&self) -> PixcompResult<(i32, i32, &[Fixed])> {
        let params = &self.filter_params;
        if params.len() < 2 {
            return Err(PixcompError::contract(
                "convolution filter needs width and height parameters",
            ));
        }
        let (w, h) = (params[0].floor_int(), params[1].floor_int());
        if w <= 0 || h <= 0 || params[0].frac() != 0 || params[1].frac() != 0 {
            return Err(PixcompError::contract(format!(
                "convolution kernel size {}x{} must be positive integers",
                params[0].to_f64(),
                params[1].to_f64()
            )));
        }
        let weights = &params[2..];
        if weights.len() != (w as usize) * (h as usize) {
            return Err(PixcompError::contract(format!(
                "convolution kernel {w}x{h} needs {} weights, got {}",
                w * h,
                weights.len()
            )));
        }
        Ok((w, h, weights))
    }
}

/// Variant payloads of an [`Image`].
#[derive(Clone, Debug)]
pub enum ImageKind {
    Bits(BitsImage),
    /// Premultiplied ARGB32 color.
    Solid(Argb32),
    Linear(LinearGradient),
    Radial(RadialGradient),
    Conical(ConicalGradient),
}

/// A paint source or destination: shared header plus one kind payload.
#[derive(Clone, Debug)]
pub struct Image {
    header: ImageHeader,
    kind: ImageKind,
    class: SourceClass,
}

impl Image {
    fn from_kind(kind: ImageKind) -> Self {
        let mut image = Self {
            header: ImageHeader::default(),
            kind,
            class: SourceClass::Unknown,
        };
        image.class = image.derive_class();
        image
    }

    pub fn bits(bits: BitsImage) -> Self {
        Self::from_kind(ImageKind::Bits(bits))
    }

    pub fn solid(color: Argb32) -> Self {
        Self::from_kind(ImageKind::Solid(color))
    }

    pub fn linear(gradient: LinearGradient) -> Self {
        Self::from_kind(ImageKind::Linear(gradient))
    }

    pub fn radial(gradient: RadialGradient) -> Self {
        Self::from_kind(ImageKind::Radial(gradient))
    }

    pub fn conical(gradient: ConicalGradient) -> Self {
        Self::from_kind(ImageKind::Conical(gradient))
    }

    pub fn into_ref(self) -> ImageRef {
        Arc::new(self)
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    pub fn kind(&self) -> &ImageKind {
        &self.kind
    }

    pub fn class(&self) -> SourceClass {
        self.class
    }

    pub fn as_bits(&self) -> Option<&BitsImage> {
        match &self.kind {
            ImageKind::Bits(bits) => Some(bits),
            _ => None,
        }
    }

    /// Stops and color table of a gradient image.
    pub fn gradient(&self) -> Option<&Gradient> {
        match &self.kind {
            ImageKind::Linear(g) => Some(&g.gradient),
            ImageKind::Radial(g) => Some(&g.gradient),
            ImageKind::Conical(g) => Some(&g.gradient),
            ImageKind::Bits(_) | ImageKind::Solid(_) => None,
        }
    }

    pub fn gradient_mut(&mut self) -> Option<&mut Gradient> {
        match &mut self.kind {
            ImageKind::Linear(g) => Some(&mut g.gradient),
            ImageKind::Radial(g) => Some(&mut g.gradient),
            ImageKind::Conical(g) => Some(&mut g.gradient),
            ImageKind::Bits(_) | ImageKind::Solid(_) => None,
        }
    }

    fn derive_class(&self) -> SourceClass {
        match &self.kind {
            ImageKind::Solid(_) => SourceClass::Horizontal,
            ImageKind::Linear(g) => {
                let translation_only = self.header.transform.is_none_or(|t| {
                    let [a, b, c, d, _, _] = t.as_coeffs();
                    a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
                });
                if !translation_only {
                    SourceClass::Unknown
                } else if g.p1.x == g.p2.x {
                    SourceClass::Horizontal
                } else if g.p1.y == g.p2.y {
                    SourceClass::Vertical
                } else {
                    SourceClass::Unknown
                }
            }
            _ => SourceClass::Unknown,
        }
    }

    /// Set or clear the device-to-source transform; re-derives the class hint.
    pub fn set_transform(&mut self, transform: Option<Affine>) -> PixcompResult<()> {
        if let Some(t) = transform {
            if !t.is_finite() || t.determinant() == 0.0 {
                return Err(PixcompError::contract("transform must be finite and invertible"));
            }
        }
        self.header.transform = transform;
        self.class = self.derive_class();
        Ok(())
    }

    pub fn with_transform(mut self, transform: Affine) -> PixcompResult<Self> {
        self.set_transform(Some(transform))?;
        Ok(self)
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.header.repeat = repeat;
        self
    }

    pub fn with_filter(mut self, filter: Filter, params: Vec<Fixed>) -> Self {
        self.header.filter = filter;
        self.header.filter_params = params;
        self
    }

    pub fn with_clip_region(mut self, region: Option<Region>) -> Self {
        self.header.clip_region = region;
        self
    }

    pub fn with_component_alpha(mut self, component_alpha: bool) -> Self {
        self.header.component_alpha = component_alpha;
        self
    }

    /// Route raster access through caller accessors. Either side may be absent.
    pub fn with_accessors(
        mut self,
        read: Option<ReadMemoryFn>,
        write: Option<WriteMemoryFn>,
    ) -> Self {
        self.header.read_func = read;
        self.header.write_func = write;
        self
    }

    /// Attach a raster alpha map. Only a weak reference is kept.
    pub fn with_alpha_map(mut self, map: &ImageRef, origin_x: i32, origin_y: i32) -> PixcompResult<Self> {
        if map.as_bits().is_none() {
            return Err(PixcompError::contract("alpha map must be a raster image"));
        }
        self.header.alpha_map = Some(AlphaMap {
            image: Arc::downgrade(map),
            origin_x,
            origin_y,
        });
        Ok(self)
    }

    pub fn without_alpha_map(mut self) -> Self {
        self.header.alpha_map = None;
        self
    }

    fn raster(&self) -> PixcompResult<&BitsImage> {
        self.as_bits()
            .ok_or_else(|| PixcompError::contract("pixel access needs a raster image"))
    }

    /// Read one stored pixel as premultiplied ARGB32.
    pub fn pixel(&self, x: i32, y: i32) -> PixcompResult<Argb32> {
        let bits = self.raster()?;
        if !bits.contains(x, y) {
            return Err(PixcompError::contract(format!(
                "pixel ({x}, {y}) outside {}x{} image",
                bits.width(),
                bits.height()
            )));
        }
        let buf = bits.read()?;
        let offset = bits.pixel_offset(x, y);
        Ok(match self.header.accessors() {
            Some(acc) => pixel_with(&acc, bits, &buf, offset),
            None => pixel_with(&DirectAccess, bits, &buf, offset),
        })
    }

    /// Store one premultiplied ARGB32 pixel.
    pub fn set_pixel(&self, x: i32, y: i32, value: Argb32) -> PixcompResult<()> {
        let bits = self.raster()?;
        if !bits.contains(x, y) {
            return Err(PixcompError::contract(format!(
                "pixel ({x}, {y}) outside {}x{} image",
                bits.width(),
                bits.height()
            )));
        }
        let mut buf = bits.write()?;
        let offset = bits.pixel_offset(x, y);
        match self.header.accessors() {
            Some(acc) => set_pixel_with(&acc, bits, &mut buf, offset, value),
            None => set_pixel_with(&DirectAccess, bits, &mut buf, offset, value),
        }
        Ok(())
    }
}

fn pixel_with<A: MemoryAccess>(acc: &A, bits: &BitsImage, buf: &[u8], offset: usize) -> Argb32 {
    fetch_pixel(acc, bits.format(), bits.indexed(), buf, offset)
}

fn set_pixel_with<A: MemoryAccess>(
    acc: &A,
    bits: &BitsImage,
    buf: &mut [u8],
    offset: usize,
    value: Argb32,
) {
    store_pixel(acc, bits.format(), bits.indexed(), buf, offset, value);
}

#[cfg(test)]
#[path = "../../tests/unit/image/model.rs"]
mod tests;
