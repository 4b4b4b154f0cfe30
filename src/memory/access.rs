//! Pixel memory access, either direct or routed through caller accessors.
//!
//! Routines that touch a raster buffer pick the strategy once, at their top,
//! and run a body generic over [`MemoryAccess`]:
//!
//! ```ignore
//! match header.accessors() {
//!     Some(wrapped) => fetch_row_with(&wrapped, ..),
//!     None => fetch_row_with(&DirectAccess, ..),
//! }
//! ```

use std::sync::Arc;

/// Read `size` bytes (1, 2 or 4) at `offset`, native byte order.
pub type ReadMemoryFn = Arc<dyn Fn(&[u8], usize, usize) -> u32 + Send + Sync>;

/// Write the low `size` bytes (1, 2 or 4) of a value at `offset`, native byte order.
pub type WriteMemoryFn = Arc<dyn Fn(&mut [u8], usize, u32, usize) + Send + Sync>;

pub trait MemoryAccess {
    fn read(&self, buf: &[u8], offset: usize, size: usize) -> u32;

    fn write(&self, buf: &mut [u8], offset: usize, value: u32, size: usize);

    fn copy_wrapped(&self, dst: &mut [u8], dst_off: usize, src: &[u8], src_off: usize, len: usize) {
        for i in 0..len {
            let v = self.read(src, src_off + i, 1);
            self.write(dst, dst_off + i, v, 1);
        }
    }

    fn fill_wrapped(&self, dst: &mut [u8], offset: usize, byte: u8, len: usize) {
        for i in 0..len {
            self.write(dst, offset + i, u32::from(byte), 1);
        }
    }
}

/// Plain slice access.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectAccess;

#[inline]
pub fn read_direct(buf: &[u8], offset: usize, size: usize) -> u32 {
    match size {
        1 => u32::from(buf[offset]),
        2 => u32::from(u16::from_ne_bytes([buf[offset], buf[offset + 1]])),
        _ => u32::from_ne_bytes([
            buf[offset],
            buf[offset + 1],
            buf[offset + 2],
            buf[offset + 3],
        ]),
    }
}

#[inline]
pub fn write_direct(buf: &mut [u8], offset: usize, value: u32, size: usize) {
    match size {
        1 => buf[offset] = value as u8,
        2 => buf[offset..offset + 2].copy_from_slice(&(value as u16).to_ne_bytes()),
        _ => buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes()),
    }
}

impl MemoryAccess for DirectAccess {
    #[inline]
    fn read(&self, buf: &[u8], offset: usize, size: usize) -> u32 {
        read_direct(buf, offset, size)
    }

    #[inline]
    fn write(&self, buf: &mut [u8], offset: usize, value: u32, size: usize) {
        write_direct(buf, offset, value, size);
    }

    fn copy_wrapped(&self, dst: &mut [u8], dst_off: usize, src: &[u8], src_off: usize, len: usize) {
        dst[dst_off..dst_off + len].copy_from_slice(&src[src_off..src_off + len]);
    }

    fn fill_wrapped(&self, dst: &mut [u8], offset: usize, byte: u8, len: usize) {
        dst[offset..offset + len].fill(byte);
    }
}

/// Access through an image's accessor callbacks. A missing side falls back
/// to direct access.
#[derive(Clone, Copy)]
pub struct WrappedAccess<'a> {
    pub read: Option<&'a ReadMemoryFn>,
    pub write: Option<&'a WriteMemoryFn>,
}

impl std::fmt::Debug for WrappedAccess<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappedAccess")
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

impl MemoryAccess for WrappedAccess<'_> {
    #[inline]
    fn read(&self, buf: &[u8], offset: usize, size: usize) -> u32 {
        match self.read {
            Some(read) => read(buf, offset, size),
            None => read_direct(buf, offset, size),
        }
    }

    #[inline]
    fn write(&self, buf: &mut [u8], offset: usize, value: u32, size: usize) {
        match self.write {
            Some(write) => write(buf, offset, value, size),
            None => write_direct(buf, offset, value, size),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory/access.rs"]
mod tests;
