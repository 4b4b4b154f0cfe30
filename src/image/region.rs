use smallvec::SmallVec;

use crate::foundation::core::IntRect;

/// A set of rectangles limiting which destination pixels may be written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    rects: SmallVec<[IntRect; 4]>,
}

/// Half-open `[x1, x2)` span of one row.
pub type Span = (i32, i32);

impl Region {
    /// Empty rectangles are dropped; overlapping ones are allowed.
    pub fn new(rects: impl IntoIterator<Item = IntRect>) -> Self {
        Self {
            rects: rects.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    pub fn from_rect(rect: IntRect) -> Self {
        Self::new([rect])
    }

    pub fn rects(&self) -> &[IntRect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Bounding box of the region; an empty rectangle when the region is empty.
    pub fn extents(&self) -> IntRect {
        let mut it = self.rects.iter();
        let Some(first) = it.next() else {
            return IntRect::new(0, 0, 0, 0);
        };
        it.fold(*first, |acc, r| IntRect {
            x1: acc.x1.min(r.x1),
            y1: acc.y1.min(r.y1),
            x2: acc.x2.max(r.x2),
            y2: acc.y2.max(r.y2),
        })
    }

    pub fn intersect_rect(&self, rect: IntRect) -> Self {
        Self::new(self.rects.iter().map(|r| r.intersect(rect)))
    }

    /// Sorted, non-overlapping spans of row `y` inside both the region and
    /// `[x1, x2)`.
    pub fn row_spans(&self, y: i32, x1: i32, x2: i32) -> SmallVec<[Span; 4]> {
        let mut spans: SmallVec<[Span; 4]> = self
            .rects
            .iter()
            .filter(|r| r.y1 <= y && y < r.y2)
            .map(|r| (r.x1.max(x1), r.x2.min(x2)))
            .filter(|(a, b)| a < b)
            .collect();
        spans.sort_unstable();

        let mut merged: SmallVec<[Span; 4]> = SmallVec::new();
        for (a, b) in spans {
            match merged.last_mut() {
                Some(last) if a <= last.1 => last.1 = last.1.max(b),
                _ => merged.push((a, b)),
            }
        }
        merged
    }
}
