use core::cell::Cell;
use core::fmt;

use crate::color_index::{ColorIndex, MULTIPLIER, RIGHT_SHIFT};
use crate::histogram::Histogram;

/// A color channel, used to address one pair of box bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Red,
    Green,
    Blue,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Red, Axis::Green, Axis::Blue];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::Red => 0,
            Axis::Green => 1,
            Axis::Blue => 2,
        }
    }

    /// The two remaining axes, in red-green-blue order.
    pub const fn others(self) -> [Axis; 2] {
        match self {
            Axis::Red => [Axis::Green, Axis::Blue],
            Axis::Green => [Axis::Red, Axis::Blue],
            Axis::Blue => [Axis::Red, Axis::Green],
        }
    }
}

/// An axis-aligned box in 5-bit color space.
///
/// Bounds are inclusive bucket coordinates. The box borrows the histogram it
/// was cut from; derived values (volume, population, average color) are
/// computed on first use and memoized. Cuts never change a box's bounds,
/// they produce new boxes via [`with_bounds`](Self::with_bounds).
#[derive(Clone)]
pub struct VBox<'h> {
    lo: [u8; 3],
    hi: [u8; 3],
    histogram: &'h Histogram,
    volume: Cell<Option<u32>>,
    count: Cell<Option<u32>>,
    avg: Cell<Option<[u8; 3]>>,
}

impl<'h> VBox<'h> {
    /// Box spanning `lo[axis]..=hi[axis]` on every axis (red, green, blue order).
    pub fn new(lo: [u8; 3], hi: [u8; 3], histogram: &'h Histogram) -> Self {
        debug_assert!(lo.iter().zip(hi.iter()).all(|(l, h)| l <= h));
        Self {
            lo,
            hi,
            histogram,
            volume: Cell::new(None),
            count: Cell::new(None),
            avg: Cell::new(None),
        }
    }

    /// Smallest box containing every full-precision sample.
    ///
    /// Returns `None` when there are no samples.
    pub fn from_pixels(pixels: &[ColorIndex], histogram: &'h Histogram) -> Option<Self> {
        let (first, rest) = pixels.split_first()?;
        let mut lo = first.bucket(RIGHT_SHIFT);
        let mut hi = lo;
        for pixel in rest {
            let bucket = pixel.bucket(RIGHT_SHIFT);
            for c in 0..3 {
                lo[c] = lo[c].min(bucket[c]);
                hi[c] = hi[c].max(bucket[c]);
            }
        }
        Some(Self::new(lo, hi, histogram))
    }

    #[inline]
    pub fn bounds(&self, axis: Axis) -> (u8, u8) {
        (self.lo[axis.index()], self.hi[axis.index()])
    }

    /// A copy of this box with new bounds on one axis.
    pub fn with_bounds(&self, axis: Axis, lo: u8, hi: u8) -> Self {
        let mut lows = self.lo;
        let mut highs = self.hi;
        lows[axis.index()] = lo;
        highs[axis.index()] = hi;
        Self::new(lows, highs, self.histogram)
    }

    /// Structural copy sharing the same histogram.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn histogram(&self) -> &'h Histogram {
        self.histogram
    }

    /// Drop memoized values so they are recomputed on next access.
    pub fn invalidate(&self) {
        self.volume.set(None);
        self.count.set(None);
        self.avg.set(None);
    }

    fn extent(&self, axis: Axis) -> u32 {
        let (lo, hi) = self.bounds(axis);
        (hi - lo) as u32 + 1
    }

    pub fn volume(&self) -> u32 {
        if let Some(v) = self.volume.get() {
            return v;
        }
        let v = self.extent(Axis::Red) * self.extent(Axis::Green) * self.extent(Axis::Blue);
        self.volume.set(Some(v));
        v
    }

    /// Whether scanning the histogram is cheaper than scanning the box.
    #[inline]
    fn scan_histogram(&self) -> bool {
        self.volume() as usize > self.histogram.len()
    }

    /// Number of pixels inside the box.
    pub fn count(&self) -> u32 {
        if let Some(c) = self.count.get() {
            return c;
        }
        let c = if self.scan_histogram() {
            self.count_by_histogram()
        } else {
            self.count_by_grid()
        };
        self.count.set(Some(c));
        c
    }

    /// Population by testing every histogram entry for containment.
    pub fn count_by_histogram(&self) -> u32 {
        self.histogram
            .iter()
            .filter(|&(index, _)| self.contains(index, RIGHT_SHIFT))
            .map(|(_, count)| count)
            .sum()
    }

    /// Population by looking up every grid cell of the box.
    pub fn count_by_grid(&self) -> u32 {
        self.cells().map(|index| self.histogram.get(index)).sum()
    }

    /// Population-weighted mean color, sampled at bucket centers.
    ///
    /// An empty box yields its geometric midpoint.
    pub fn avg(&self) -> rgb::RGB<u8> {
        if let Some([r, g, b]) = self.avg.get() {
            return rgb::RGB { r, g, b };
        }

        let mut ntot = 0u64;
        // Sums of count * (2 * coord + 1); halved at the end to place each
        // bucket at its center without floating point.
        let mut sums = [0u64; 3];
        let mut accumulate = |index: ColorIndex, count: u32| {
            let bucket = index.bucket(RIGHT_SHIFT);
            ntot += count as u64;
            for c in 0..3 {
                sums[c] += count as u64 * (2 * bucket[c] as u64 + 1);
            }
        };
        if self.scan_histogram() {
            for (index, count) in self.histogram.iter() {
                if self.contains(index, RIGHT_SHIFT) {
                    accumulate(index, count);
                }
            }
        } else {
            for index in self.cells() {
                let count = self.histogram.get(index);
                if count > 0 {
                    accumulate(index, count);
                }
            }
        }

        let mult = MULTIPLIER as u64;
        let avg = if ntot > 0 {
            sums.map(|s| (s * mult / (2 * ntot)) as u8)
        } else {
            let mid = |c: usize| {
                (mult * (self.lo[c] as u64 + self.hi[c] as u64 + 1) / 2).min(255) as u8
            };
            [mid(0), mid(1), mid(2)]
        };
        self.avg.set(Some(avg));
        rgb::RGB {
            r: avg[0],
            g: avg[1],
            b: avg[2],
        }
    }

    /// Whether a full-precision index falls inside the box once its channels
    /// are shifted right by `shift`.
    #[inline]
    pub fn contains(&self, index: ColorIndex, shift: u32) -> bool {
        let bucket = index.bucket(shift);
        (0..3).all(|c| self.lo[c] <= bucket[c] && bucket[c] <= self.hi[c])
    }

    /// Channel with the widest range. Ties prefer red, then green.
    pub fn longest_axis(&self) -> Axis {
        let r = self.extent(Axis::Red);
        let g = self.extent(Axis::Green);
        let b = self.extent(Axis::Blue);
        if r >= g && r >= b {
            Axis::Red
        } else if g >= b {
            Axis::Green
        } else {
            Axis::Blue
        }
    }

    /// Every grid cell of the box, red-major.
    fn cells(&self) -> impl Iterator<Item = ColorIndex> + '_ {
        let [r1, g1, b1] = self.lo;
        let [r2, g2, b2] = self.hi;
        (r1..=r2).flat_map(move |r| {
            (g1..=g2).flat_map(move |g| (b1..=b2).map(move |b| ColorIndex::from_bucket(r, g, b)))
        })
    }
}

impl fmt::Debug for VBox<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VBox")
            .field("r", &(self.lo[0]..=self.hi[0]))
            .field("g", &(self.lo[1]..=self.hi[1]))
            .field("b", &(self.lo[2]..=self.hi[2]))
            .field("count", &self.count.get())
            .finish()
    }
}
