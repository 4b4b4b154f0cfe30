//! The compositing dispatcher: request validation, clipping, and per-row
//! fetch/combine/store passes.

use rayon::prelude::*;
use smallvec::{SmallVec, smallvec};

use crate::blend::operator::{CombineEntry, Operator, lookup};
use crate::blend::unified::combine_mask_unified;
use crate::compose::request::{ComposeOptions, ComposeRequest};
use crate::foundation::core::{Argb32, IntRect};
use crate::foundation::error::{PixcompError, PixcompResult};
use crate::image::bits::BitsImage;
use crate::image::format::store_pixel;
use crate::image::model::{Filter, Image, SourceClass};
use crate::image::region::Span;
use crate::memory::access::{DirectAccess, MemoryAccess, WrappedAccess};
use crate::sample::{self, fetch_scanline};

type Spans = SmallVec<[Span; 4]>;

fn scratch_row(len: usize, fill: u32) -> PixcompResult<Vec<u32>> {
    let mut row = Vec::new();
    row.try_reserve_exact(len)
        .map_err(|e| PixcompError::resource(format!("scanline scratch of {len} pixels: {e}")))?;
    row.resize(len, fill);
    Ok(row)
}

/// Destination rectangle after clipping to the raster bounds and the clip
/// region's extents; `None` when nothing is left.
fn clip_rect(dest: &Image, bits: &BitsImage, rect: IntRect) -> Option<IntRect> {
    let mut rect = rect.intersect(bits.bounds());
    if let Some(region) = dest.header().clip_region() {
        rect = rect.intersect(region.extents());
    }
    (!rect.is_empty()).then_some(rect)
}

fn row_spans(dest: &Image, rect: IntRect, y: i32) -> Spans {
    match dest.header().clip_region() {
        Some(region) => region.row_spans(y, rect.x1, rect.x2),
        None => smallvec![(rect.x1, rect.x2)],
    }
}

struct RowBuffers {
    src: Vec<u32>,
    mask: Vec<u32>,
    dest: Vec<u32>,
}

impl RowBuffers {
    fn new(width: usize) -> PixcompResult<Self> {
        Ok(Self {
            src: scratch_row(width, 0)?,
            mask: scratch_row(width, 0xffff_ffff)?,
            dest: scratch_row(width, 0)?,
        })
    }
}

/// Everything resolved once per call, shared by every row.
struct RowPlan<'a> {
    request: &'a ComposeRequest<'a>,
    entry: &'static CombineEntry,
    rect: IntRect,
    component: bool,
    /// First source row, reused for every row of a vertical source.
    src_row: Option<Vec<u32>>,
    mask_row: Option<Vec<u32>>,
}

impl RowPlan<'_> {
    fn src_origin(&self, y: i32) -> (i32, i32) {
        let req = self.request;
        (
            req.src_x.wrapping_add(self.rect.x1.wrapping_sub(req.dest_x)),
            req.src_y.wrapping_add(y.wrapping_sub(req.dest_y)),
        )
    }

    fn mask_origin(&self, y: i32) -> (i32, i32) {
        let req = self.request;
        (
            req.mask_x.wrapping_add(self.rect.x1.wrapping_sub(req.dest_x)),
            req.mask_y.wrapping_add(y.wrapping_sub(req.dest_y)),
        )
    }

    /// Combine row `y` into `bufs.dest`.
    fn compute_row(&self, y: i32, bufs: &mut RowBuffers) -> PixcompResult<()> {
        let req = self.request;
        match &self.src_row {
            Some(row) => bufs.src.copy_from_slice(row),
            None => {
                let (sx, sy) = self.src_origin(y);
                fetch_scanline(req.src, sx, sy, &mut bufs.src)?;
            }
        }
        if let Some(mask) = req.mask {
            match &self.mask_row {
                Some(row) => bufs.mask.copy_from_slice(row),
                None => {
                    let (mx, my) = self.mask_origin(y);
                    fetch_scanline(mask, mx, my, &mut bufs.mask)?;
                }
            }
        }
        sample::fetch_destination(req.dest, self.rect.x1, y, &mut bufs.dest)?;

        if self.component {
            (self.entry.component)(&mut bufs.dest, &bufs.src, &bufs.mask);
        } else {
            if req.mask.is_some() {
                combine_mask_unified(&mut bufs.src, &bufs.mask);
            }
            (self.entry.unified)(&mut bufs.dest, &bufs.src);
        }
        Ok(())
    }
}

/// Fetch the first row once when every row of `image` is identical.
fn vertical_row(image: &Image, x: i32, y: i32, width: usize) -> PixcompResult<Option<Vec<u32>>> {
    if image.class() != SourceClass::Vertical || image.header().alpha_map().is_some() {
        return Ok(None);
    }
    let mut row = scratch_row(width, 0)?;
    fetch_scanline(image, x, y, &mut row)?;
    Ok(Some(row))
}

fn validate<'a>(
    request: &ComposeRequest<'a>,
) -> PixcompResult<(&'static CombineEntry, &'a BitsImage)> {
    let dest_bits = request
        .dest
        .as_bits()
        .ok_or_else(|| PixcompError::contract("destination must be a raster image"))?;
    if request.width == 0 || request.height == 0 {
        return Err(PixcompError::contract(format!(
            "composite rectangle {}x{} is empty",
            request.width, request.height
        )));
    }
    let entry = lookup(request.op)?;
    sample::validate(request.src)?;
    if let Some(mask) = request.mask {
        sample::validate(mask)?;
    }
    sample::validate_destination(request.dest)?;
    Ok((entry, dest_bits))
}

/// Blend `request.src` through `request.mask` into `request.dest` with
/// `request.op`.
///
/// The component-alpha combine path is used when the source or the
/// destination has `component_alpha` set, and also when the mask does, so a
/// per-channel mask is never collapsed to its alpha. Otherwise the unified
/// path runs.
///
/// Contract violations are reported before any pixel is written. A request
/// clipped away entirely is a no-op.
#[tracing::instrument(
    skip(request, options),
    fields(op = ?request.op, width = request.width, height = request.height)
)]
pub fn composite(request: &ComposeRequest<'_>, options: &ComposeOptions) -> PixcompResult<()> {
    options.validate()?;
    let (entry, dest_bits) = validate(request)?;

    let requested = IntRect::from_origin_size(
        request.dest_x,
        request.dest_y,
        u32::from(request.width),
        u32::from(request.height),
    );
    let Some(rect) = clip_rect(request.dest, dest_bits, requested) else {
        tracing::debug!("composite fully clipped");
        return Ok(());
    };

    if matches!(
        request.op,
        Operator::Dst | Operator::DisjointDst | Operator::ConjointDst
    ) {
        tracing::debug!("destination operator leaves pixels unchanged");
        return Ok(());
    }
    if try_clear_fast_path(request, dest_bits, rect)? {
        return Ok(());
    }
    if try_src_copy_fast_path(request, dest_bits, rect)? {
        return Ok(());
    }

    let width = (rect.x2 - rect.x1) as usize;
    let component = request.src.header().component_alpha()
        || request.mask.is_some_and(|m| m.header().component_alpha())
        || request.dest.header().component_alpha();

    let mut plan = RowPlan {
        request,
        entry,
        rect,
        component,
        src_row: None,
        mask_row: None,
    };
    let (sx, sy) = plan.src_origin(rect.y1);
    plan.src_row = vertical_row(request.src, sx, sy, width)?;
    if let Some(mask) = request.mask {
        let (mx, my) = plan.mask_origin(rect.y1);
        plan.mask_row = vertical_row(mask, mx, my, width)?;
    }

    if options.parallel {
        if !reads_destination_storage(request, dest_bits) {
            return composite_rows_parallel(&plan, dest_bits, width, options.threads);
        }
        tracing::debug!("source aliases destination storage; compositing rows serially");
    }
    composite_rows_serial(&plan, dest_bits, width)
}

/// True when the source or mask reads pixels the composite writes; rows must
/// then be processed in order.
fn reads_destination_storage(request: &ComposeRequest<'_>, dest_bits: &BitsImage) -> bool {
    let mut written: SmallVec<[BitsImage; 2]> = smallvec![dest_bits.clone()];
    if let Some((map, _, _)) = request.dest.header().alpha_map_image()
        && let Some(bits) = map.as_bits()
    {
        written.push(bits.clone());
    }
    let reads = |image: &Image| {
        let mut own = image.as_bits().cloned().into_iter().collect::<SmallVec<[BitsImage; 2]>>();
        if let Some((map, _, _)) = image.header().alpha_map_image()
            && let Some(bits) = map.as_bits()
        {
            own.push(bits.clone());
        }
        own.iter().any(|r| written.iter().any(|w| w.shares_storage(r)))
    };
    reads(request.src) || request.mask.is_some_and(|m| reads(m))
}

fn composite_rows_serial(plan: &RowPlan<'_>, dest_bits: &BitsImage, width: usize) -> PixcompResult<()> {
    let mut bufs = RowBuffers::new(width)?;
    for y in plan.rect.y1..plan.rect.y2 {
        let spans = row_spans(plan.request.dest, plan.rect, y);
        if spans.is_empty() {
            continue;
        }
        plan.compute_row(y, &mut bufs)?;
        store_row(plan.request.dest, dest_bits, plan.rect.x1, y, &spans, &bufs.dest)?;
    }
    Ok(())
}

fn composite_rows_parallel(
    plan: &RowPlan<'_>,
    dest_bits: &BitsImage,
    width: usize,
    threads: Option<usize>,
) -> PixcompResult<()> {
    let rows: Vec<(i32, Spans)> = (plan.rect.y1..plan.rect.y2)
        .map(|y| (y, row_spans(plan.request.dest, plan.rect, y)))
        .filter(|(_, spans)| !spans.is_empty())
        .collect();

    let compute = || {
        rows.par_iter()
            .map(|(y, _)| -> PixcompResult<Vec<u32>> {
                let mut bufs = RowBuffers::new(width)?;
                plan.compute_row(*y, &mut bufs)?;
                Ok(bufs.dest)
            })
            .collect::<Vec<_>>()
    };
    let computed = match threads {
        Some(n) => build_thread_pool(n)?.install(compute),
        None => compute(),
    };
    tracing::debug!(rows = rows.len(), "rows computed in parallel");

    for ((y, spans), row) in rows.iter().zip(computed) {
        store_row(plan.request.dest, dest_bits, plan.rect.x1, *y, spans, &row?)?;
    }
    Ok(())
}

fn build_thread_pool(threads: usize) -> PixcompResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(PixcompError::contract(
            "compose option 'threads' must be >= 1 when set",
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PixcompError::resource(format!("failed to build rayon thread pool: {e}")))
}

/// Store the spans of a combined row, then mirror its alpha into the
/// destination's alpha map.
fn store_row(
    dest: &Image,
    bits: &BitsImage,
    x1: i32,
    y: i32,
    spans: &[Span],
    row: &[u32],
) -> PixcompResult<()> {
    {
        let mut buf = bits.write()?;
        match dest.header().accessors() {
            Some(acc) => store_spans_with(&acc, bits, &mut buf, x1, 0, y, spans, row, !0),
            None => store_spans_with(&DirectAccess, bits, &mut buf, x1, 0, y, spans, row, !0),
        }
    }

    if let Some((map, ox, oy)) = dest.header().alpha_map_image()
        && let Some(map_bits) = map.as_bits()
    {
        let my = y.wrapping_sub(oy);
        if my < 0 || my >= map_bits.height() as i32 {
            return Ok(());
        }
        let mut buf = map_bits.write()?;
        match map.header().accessors() {
            Some(acc) => store_spans_with(&acc, map_bits, &mut buf, x1, ox, my, spans, row, 0xff00_0000),
            None => store_spans_with(
                &DirectAccess,
                map_bits,
                &mut buf,
                x1,
                ox,
                my,
                spans,
                row,
                0xff00_0000,
            ),
        }
    }
    Ok(())
}

/// Store `row` (starting at device column `x1`) over `spans`, shifted left
/// by `x_shift` into `bits` row `y`. Columns outside `bits` are skipped.
#[allow(clippy::too_many_arguments)]
fn store_spans_with<A: MemoryAccess>(
    acc: &A,
    bits: &BitsImage,
    buf: &mut [u8],
    x1: i32,
    x_shift: i32,
    y: i32,
    spans: &[Span],
    row: &[u32],
    keep: u32,
) {
    let width = bits.width() as i32;
    for &(a, b) in spans {
        for x in a..b {
            let tx = x.wrapping_sub(x_shift);
            if tx < 0 || tx >= width {
                continue;
            }
            let px = row[(x - x1) as usize] & keep;
            store_pixel(acc, bits.format(), bits.indexed(), buf, bits.pixel_offset(tx, y), px);
        }
    }
}

fn try_clear_fast_path(
    request: &ComposeRequest<'_>,
    dest_bits: &BitsImage,
    rect: IntRect,
) -> PixcompResult<bool> {
    let eligible = matches!(
        request.op,
        Operator::Clear | Operator::DisjointClear | Operator::ConjointClear
    ) && request.mask.is_none()
        && !dest_bits.format().is_indexed()
        && request.dest.header().alpha_map().is_none();
    if !eligible {
        return Ok(false);
    }
    tracing::debug!("clear fast path");

    let bpp = dest_bits.format().bytes_per_pixel();
    let mut buf = dest_bits.write()?;
    match request.dest.header().accessors() {
        Some(acc) => clear_spans_with(&acc, request.dest, dest_bits, &mut buf, rect, bpp),
        None => clear_spans_with(&DirectAccess, request.dest, dest_bits, &mut buf, rect, bpp),
    }
    Ok(true)
}

fn clear_spans_with<A: MemoryAccess>(
    acc: &A,
    dest: &Image,
    bits: &BitsImage,
    buf: &mut [u8],
    rect: IntRect,
    bpp: usize,
) {
    for y in rect.y1..rect.y2 {
        for (a, b) in row_spans(dest, rect, y) {
            acc.fill_wrapped(buf, bits.pixel_offset(a, y), 0, (b - a) as usize * bpp);
        }
    }
}

fn try_src_copy_fast_path(
    request: &ComposeRequest<'_>,
    dest_bits: &BitsImage,
    rect: IntRect,
) -> PixcompResult<bool> {
    if !matches!(
        request.op,
        Operator::Src | Operator::DisjointSrc | Operator::ConjointSrc
    ) || request.mask.is_some()
    {
        return Ok(false);
    }
    let Some(src_bits) = request.src.as_bits() else {
        return Ok(false);
    };
    let src_header = request.src.header();
    let format = dest_bits.format();
    let eligible = src_bits.format() == format
        && format.is_raw_stable()
        && src_header.transform().is_none()
        && src_header.filter() != Filter::Convolution
        && src_header.alpha_map().is_none()
        && src_header.accessors().is_none()
        && request.dest.header().alpha_map().is_none()
        && !src_bits.shares_storage(dest_bits);
    if !eligible {
        return Ok(false);
    }

    // No repeat needed: the source rectangle lies inside the source.
    let sx = i64::from(request.src_x) + i64::from(rect.x1) - i64::from(request.dest_x);
    let sy = i64::from(request.src_y) + i64::from(rect.y1) - i64::from(request.dest_y);
    let w = i64::from(rect.x2 - rect.x1);
    let h = i64::from(rect.y2 - rect.y1);
    if sx < 0 || sy < 0 || sx + w > i64::from(src_bits.width()) || sy + h > i64::from(src_bits.height())
    {
        return Ok(false);
    }
    tracing::debug!("src copy fast path");

    let src_buf = src_bits.read()?;
    let mut dest_buf = dest_bits.write()?;
    let dx = (sx - i64::from(rect.x1)) as i32;
    let dy = (sy - i64::from(rect.y1)) as i32;
    let copy = SrcCopy {
        dest: request.dest,
        dest_bits,
        src_bits,
        src_buf: &src_buf,
        rect,
        dx,
        dy,
    };
    match request.dest.header().accessors() {
        Some(acc) => copy.run(
            &WrappedAccess {
                read: None,
                write: acc.write,
            },
            &mut dest_buf,
        ),
        None => copy.run(&DirectAccess, &mut dest_buf),
    }
    Ok(true)
}

struct SrcCopy<'a> {
    dest: &'a Image,
    dest_bits: &'a BitsImage,
    src_bits: &'a BitsImage,
    src_buf: &'a [u8],
    rect: IntRect,
    /// Source minus destination coordinates.
    dx: i32,
    dy: i32,
}

impl SrcCopy<'_> {
    fn run<A: MemoryAccess>(&self, acc: &A, dest_buf: &mut [u8]) {
        let bpp = self.dest_bits.format().bytes_per_pixel();
        for y in self.rect.y1..self.rect.y2 {
            for (a, b) in row_spans(self.dest, self.rect, y) {
                acc.copy_wrapped(
                    dest_buf,
                    self.dest_bits.pixel_offset(a, y),
                    self.src_buf,
                    self.src_bits.pixel_offset(a + self.dx, y + self.dy),
                    (b - a) as usize * bpp,
                );
            }
        }
    }
}

/// Fill `rect` of a raster image with one premultiplied pixel, honoring its
/// clip region, accessors and alpha map.
pub fn fill_rect(image: &Image, rect: IntRect, pixel: Argb32) -> PixcompResult<()> {
    let bits = image
        .as_bits()
        .ok_or_else(|| PixcompError::contract("fill target must be a raster image"))?;
    bits.validate_palette()?;
    let Some(rect) = clip_rect(image, bits, rect) else {
        tracing::debug!("fill fully clipped");
        return Ok(());
    };
    let row = scratch_row((rect.x2 - rect.x1) as usize, pixel)?;
    for y in rect.y1..rect.y2 {
        let spans = row_spans(image, rect, y);
        if !spans.is_empty() {
            store_row(image, bits, rect.x1, y, &spans, &row)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/dispatch.rs"]
mod tests;
