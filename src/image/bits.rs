use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::foundation::core::IntRect;
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::image::format::{Indexed, PixelFormat};

/// Shared raster storage.
pub type PixelBuffer = Arc<RwLock<Vec<u8>>>;

/// Raster image storage.
///
/// `rowstride` is in bytes and may be negative for a bottom-up buffer, in
/// which case row 0 starts at `(height - 1) * |rowstride|`.
///
/// The buffer is shared, so its length is re-checked each time it is locked
/// through [`BitsImage::read`] or [`BitsImage::write`].
#[derive(Clone, Debug)]
pub struct BitsImage {
    format: PixelFormat,
    indexed: Option<Arc<Indexed>>,
    width: u32,
    height: u32,
    rowstride: i32,
    /// `|rowstride| * height`.
    min_len: usize,
    bits: PixelBuffer,
}

impl BitsImage {
    /// Wrap an existing buffer after checking its geometry.
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        rowstride: i32,
        bits: PixelBuffer,
    ) -> PixcompResult<Self> {
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(PixcompError::contract(format!(
                "image size {width}x{height} exceeds the coordinate range"
            )));
        }
        let stride = rowstride.unsigned_abs() as usize;
        let min_stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| PixcompError::contract("row size overflow"))?;
        if stride < min_stride {
            return Err(PixcompError::contract(format!(
                "rowstride {rowstride} shorter than a {width}-pixel {format:?} row"
            )));
        }
        let needed = stride
            .checked_mul(height as usize)
            .ok_or_else(|| PixcompError::contract("buffer size overflow"))?;
        let len = bits
            .read()
            .map_err(|_| PixcompError::resource("pixel buffer lock poisoned"))?
            .len();
        if len < needed {
            return Err(PixcompError::contract(format!(
                "buffer holds {len} bytes, {needed} needed for {height} rows of {stride}"
            )));
        }
        Ok(Self {
            format,
            indexed: None,
            width,
            height,
            rowstride,
            min_len: needed,
            bits,
        })
    }

    /// Allocate a zeroed image with rows padded to 4 bytes.
    pub fn alloc(format: PixelFormat, width: u32, height: u32) -> PixcompResult<Self> {
        let row = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .and_then(|r| r.checked_add(3))
            .map(|r| r & !3)
            .ok_or_else(|| PixcompError::contract("row size overflow"))?;
        let rowstride = i32::try_from(row)
            .map_err(|_| PixcompError::contract(format!("rowstride {row} out of range")))?;
        let len = row
            .checked_mul(height as usize)
            .ok_or_else(|| PixcompError::contract("buffer size overflow"))?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|e| PixcompError::resource(format!("pixel buffer: {e}")))?;
        buf.resize(len, 0);
        Self::new(format, width, height, rowstride, Arc::new(RwLock::new(buf)))
    }

    /// Build an `A8R8G8B8` image from premultiplied pixels in row order.
    pub fn from_argb32(width: u32, height: u32, pixels: &[u32]) -> PixcompResult<Self> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(PixcompError::contract(format!(
                "expected {expected} pixels, got {}",
                pixels.len()
            )));
        }
        let buf: Vec<u8> = pixels.iter().flat_map(|p| p.to_ne_bytes()).collect();
        let rowstride = i32::try_from(width as usize * 4)
            .map_err(|_| PixcompError::contract("rowstride out of range"))?;
        Self::new(
            PixelFormat::A8R8G8B8,
            width,
            height,
            rowstride,
            Arc::new(RwLock::new(buf)),
        )
    }

    pub fn with_indexed(mut self, indexed: Arc<Indexed>) -> Self {
        self.indexed = Some(indexed);
        self
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn indexed(&self) -> Option<&Indexed> {
        self.indexed.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rowstride(&self) -> i32 {
        self.rowstride
    }

    pub fn bits(&self) -> &PixelBuffer {
        &self.bits
    }

    pub fn bounds(&self) -> IntRect {
        IntRect::from_origin_size(0, 0, self.width, self.height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bounds().contains(x, y)
    }

    /// True when both images store their pixels in the same buffer.
    pub fn shares_storage(&self, other: &BitsImage) -> bool {
        Arc::ptr_eq(&self.bits, &other.bits)
    }

    /// Byte offset of the first pixel of row `y`; `y` must be in bounds.
    #[inline]
    pub fn row_offset(&self, y: i32) -> usize {
        let stride = self.rowstride.unsigned_abs() as usize;
        let y = y as usize;
        if self.rowstride >= 0 {
            y * stride
        } else {
            (self.height as usize - 1 - y) * stride
        }
    }

    /// Byte offset of pixel `(x, y)`; both must be in bounds.
    #[inline]
    pub fn pixel_offset(&self, x: i32, y: i32) -> usize {
        self.row_offset(y) + x as usize * self.format.bytes_per_pixel()
    }

    /// Lock the buffer for reading. Fails when the buffer was shrunk below
    /// the image geometry through [`BitsImage::bits`].
    pub fn read(&self) -> PixcompResult<RwLockReadGuard<'_, Vec<u8>>> {
        let buf = self
            .bits
            .read()
            .map_err(|_| PixcompError::resource("pixel buffer lock poisoned"))?;
        self.check_len(buf.len())?;
        Ok(buf)
    }

    /// Lock the buffer for writing; same length check as [`BitsImage::read`].
    pub fn write(&self) -> PixcompResult<RwLockWriteGuard<'_, Vec<u8>>> {
        let buf = self
            .bits
            .write()
            .map_err(|_| PixcompError::resource("pixel buffer lock poisoned"))?;
        self.check_len(buf.len())?;
        Ok(buf)
    }

    fn check_len(&self, len: usize) -> PixcompResult<()> {
        if len < self.min_len {
            return Err(PixcompError::contract(format!(
                "buffer holds {len} bytes, {} needed for {}x{} {:?}",
                self.min_len, self.width, self.height, self.format
            )));
        }
        Ok(())
    }

    pub(crate) fn validate_palette(&self) -> PixcompResult<()> {
        if self.format.is_indexed() && self.indexed.is_none() {
            return Err(PixcompError::contract(format!(
                "{:?} image has no palette",
                self.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/bits.rs"]
mod tests;
