//! Pixel formats and their fetch/store codecs.
//!
//! Fetch expands a stored pixel to premultiplied ARGB32; store narrows it
//! back. All access goes through a [`MemoryAccess`] strategy.

use crate::foundation::core::Argb32;
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::memory::access::MemoryAccess;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    A8R8G8B8,
    X8R8G8B8,
    A8B8G8R8,
    X8B8G8R8,
    /// 24 bpp, stored as three bytes: blue, green, red.
    R8G8B8,
    R5G6B5,
    A8,
    /// 8 bpp palette index; needs an [`Indexed`] palette.
    C8,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::A8R8G8B8
            | PixelFormat::X8R8G8B8
            | PixelFormat::A8B8G8R8
            | PixelFormat::X8B8G8R8 => 4,
            PixelFormat::R8G8B8 => 3,
            PixelFormat::R5G6B5 => 2,
            PixelFormat::A8 | PixelFormat::C8 => 1,
        }
    }

    pub const fn bits_per_pixel(self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::A8R8G8B8 | PixelFormat::A8B8G8R8 | PixelFormat::A8
        )
    }

    pub const fn is_indexed(self) -> bool {
        matches!(self, PixelFormat::C8)
    }

    /// `store(fetch(raw)) == raw` for every stored value, so a same-format
    /// `Src` copy may move raw bytes.
    pub const fn is_raw_stable(self) -> bool {
        matches!(
            self,
            PixelFormat::A8R8G8B8
                | PixelFormat::A8B8G8R8
                | PixelFormat::R8G8B8
                | PixelFormat::R5G6B5
                | PixelFormat::A8
        )
    }
}

/// Number of entries in the 15-bit reverse color map.
pub const INDEXED_ENT_LEN: usize = 1 << 15;

/// Palette for indexed formats. The reverse map always holds
/// [`INDEXED_ENT_LEN`] entries.
#[derive(Clone, PartialEq, Eq)]
pub struct Indexed {
    rgba: [u32; 256],
    ent: Vec<u8>,
}

impl std::fmt::Debug for Indexed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexed").finish_non_exhaustive()
    }
}

impl Indexed {
    pub fn new(rgba: [u32; 256], ent: Vec<u8>) -> PixcompResult<Self> {
        if ent.len() != INDEXED_ENT_LEN {
            return Err(PixcompError::contract(format!(
                "indexed reverse map needs {INDEXED_ENT_LEN} entries, got {}",
                ent.len()
            )));
        }
        Ok(Self { rgba, ent })
    }

    /// Build a palette from up to 256 colors, filling the reverse map with
    /// the nearest color by squared RGB distance.
    pub fn from_colors(colors: &[u32]) -> PixcompResult<Self> {
        if colors.is_empty() || colors.len() > 256 {
            return Err(PixcompError::contract(format!(
                "palette needs 1..=256 colors, got {}",
                colors.len()
            )));
        }
        let mut rgba = [0u32; 256];
        rgba[..colors.len()].copy_from_slice(colors);

        let mut ent = Vec::new();
        ent.try_reserve_exact(INDEXED_ENT_LEN)
            .map_err(|e| PixcompError::resource(format!("palette reverse map: {e}")))?;
        for rgb15 in 0..INDEXED_ENT_LEN as u32 {
            let probe = expand_rgb15(rgb15);
            let mut best = 0usize;
            let mut best_dist = u32::MAX;
            for (i, &c) in colors.iter().enumerate() {
                let d = rgb_distance(probe, c);
                if d < best_dist {
                    best = i;
                    best_dist = d;
                }
            }
            ent.push(best as u8);
        }
        Ok(Self { rgba, ent })
    }

    /// Palette index to premultiplied ARGB32.
    pub fn rgba(&self) -> &[u32; 256] {
        &self.rgba
    }

    /// RGB555 to palette index.
    pub fn ent(&self) -> &[u8] {
        &self.ent
    }

    pub fn lookup(&self, value: Argb32) -> u8 {
        self.ent[rgb15(value) as usize]
    }
}

fn rgb_distance(a: u32, b: u32) -> u32 {
    let mut sum = 0;
    for shift in [0, 8, 16] {
        let d = ((a >> shift) & 0xff).abs_diff((b >> shift) & 0xff);
        sum += d * d;
    }
    sum
}

fn expand_rgb15(v: u32) -> u32 {
    let r = (v >> 10) & 0x1f;
    let g = (v >> 5) & 0x1f;
    let b = v & 0x1f;
    ((r << 3 | r >> 2) << 16) | ((g << 3 | g >> 2) << 8) | (b << 3 | b >> 2)
}

#[inline]
pub const fn rgb15(v: Argb32) -> u32 {
    ((v >> 3) & 0x001f) | ((v >> 6) & 0x03e0) | ((v >> 9) & 0x7c00)
}

#[inline]
pub const fn expand_565(s: u32) -> Argb32 {
    let r = ((s << 8) & 0x00f8_0000) | ((s << 3) & 0x0007_0000);
    let g = ((s << 5) & 0xfc00) | ((s >> 1) & 0x0300);
    let b = ((s << 3) & 0xf8) | ((s >> 2) & 0x07);
    0xff00_0000 | r | g | b
}

#[inline]
pub const fn narrow_565(s: Argb32) -> u32 {
    ((s >> 3) & 0x001f) | ((s >> 5) & 0x07e0) | ((s >> 8) & 0xf800)
}

#[inline]
const fn swap_rb(p: u32) -> u32 {
    (p & 0xff00_ff00) | ((p >> 16) & 0xff) | ((p & 0xff) << 16)
}

/// Decode the pixel stored at `offset`.
#[inline]
pub fn fetch_pixel<A: MemoryAccess>(
    acc: &A,
    format: PixelFormat,
    indexed: Option<&Indexed>,
    buf: &[u8],
    offset: usize,
) -> Argb32 {
    match format {
        PixelFormat::A8R8G8B8 => acc.read(buf, offset, 4),
        PixelFormat::X8R8G8B8 => acc.read(buf, offset, 4) | 0xff00_0000,
        PixelFormat::A8B8G8R8 => swap_rb(acc.read(buf, offset, 4)),
        PixelFormat::X8B8G8R8 => swap_rb(acc.read(buf, offset, 4)) | 0xff00_0000,
        PixelFormat::R8G8B8 => {
            0xff00_0000
                | (acc.read(buf, offset + 2, 1) << 16)
                | (acc.read(buf, offset + 1, 1) << 8)
                | acc.read(buf, offset, 1)
        }
        PixelFormat::R5G6B5 => expand_565(acc.read(buf, offset, 2)),
        PixelFormat::A8 => acc.read(buf, offset, 1) << 24,
        PixelFormat::C8 => {
            let index = acc.read(buf, offset, 1) as usize;
            indexed.map_or(0, |pal| pal.rgba[index & 0xff])
        }
    }
}

/// Encode `value` into the pixel at `offset`.
#[inline]
pub fn store_pixel<A: MemoryAccess>(
    acc: &A,
    format: PixelFormat,
    indexed: Option<&Indexed>,
    buf: &mut [u8],
    offset: usize,
    value: Argb32,
) {
    match format {
        PixelFormat::A8R8G8B8 => acc.write(buf, offset, value, 4),
        PixelFormat::X8R8G8B8 => acc.write(buf, offset, value & 0x00ff_ffff, 4),
        PixelFormat::A8B8G8R8 => acc.write(buf, offset, swap_rb(value), 4),
        PixelFormat::X8B8G8R8 => acc.write(buf, offset, swap_rb(value) & 0x00ff_ffff, 4),
        PixelFormat::R8G8B8 => {
            acc.write(buf, offset, value & 0xff, 1);
            acc.write(buf, offset + 1, (value >> 8) & 0xff, 1);
            acc.write(buf, offset + 2, (value >> 16) & 0xff, 1);
        }
        PixelFormat::R5G6B5 => acc.write(buf, offset, narrow_565(value), 2),
        PixelFormat::A8 => acc.write(buf, offset, value >> 24, 1),
        PixelFormat::C8 => {
            let index = indexed.map_or(0, |pal| pal.lookup(value));
            acc.write(buf, offset, u32::from(index), 1);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/format.rs"]
mod tests;
