extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::color_index::{ColorIndex, SIG_BITS};

/// Pixel population per 5-bit color bucket.
///
/// Built once per palette extraction and read-only afterwards; every
/// [`VBox`](crate::vbox::VBox) borrows the same histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    buckets: BTreeMap<ColorIndex, u32>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Population of a bucket, zero when absent.
    #[inline]
    pub fn get(&self, index: ColorIndex) -> u32 {
        self.buckets.get(&index).copied().unwrap_or(0)
    }

    /// Number of occupied buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Occupied buckets in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorIndex, u32)> + '_ {
        self.buckets.iter().map(|(&k, &v)| (k, v))
    }

    /// Total population across all buckets.
    pub fn total(&self) -> u64 {
        self.buckets.values().map(|&c| c as u64).sum()
    }

    fn add(&mut self, index: ColorIndex, count: u32) {
        *self.buckets.entry(index).or_insert(0) += count;
    }
}

/// Accumulates accepted samples into a 5-bit [`Histogram`] and the
/// full-precision sample list.
///
/// Builders are mergeable so histogram construction can be split across
/// threads; the merged result does not depend on how samples were divided.
#[derive(Debug, Clone, Default)]
pub struct HistogramBuilder {
    histogram: Histogram,
    pixels: Vec<ColorIndex>,
}

impl HistogramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(samples: usize) -> Self {
        Self {
            histogram: Histogram::new(),
            pixels: Vec::with_capacity(samples),
        }
    }

    #[inline]
    pub fn push(&mut self, pixel: rgb::RGB<u8>) {
        self.pixels.push(ColorIndex::encode(pixel.r, pixel.g, pixel.b, 8));
        self.histogram
            .add(ColorIndex::encode(pixel.r, pixel.g, pixel.b, SIG_BITS), 1);
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (index, count) in other.histogram.buckets {
            self.histogram.add(index, count);
        }
        self.pixels.extend(other.pixels);
        self
    }

    /// Finish into the histogram and the full-precision sample indices.
    pub fn finish(self) -> (Histogram, Vec<ColorIndex>) {
        (self.histogram, self.pixels)
    }
}

/// Build a histogram from a sequence of already-filtered samples.
pub fn build_histogram<I>(samples: I) -> (Histogram, Vec<ColorIndex>)
where
    I: IntoIterator<Item = rgb::RGB<u8>>,
{
    let samples = samples.into_iter();
    let mut builder = HistogramBuilder::with_capacity(samples.size_hint().0);
    for pixel in samples {
        builder.push(pixel);
    }
    builder.finish()
}

/// Detect whether the samples use at most `max_colors` distinct 8-bit colors.
///
/// Returns each distinct color with its occurrence count, `None` as soon as
/// more than `max_colors` colors are seen.
pub(crate) fn detect_exact_palette(
    pixels: &[ColorIndex],
    max_colors: usize,
) -> Option<Vec<(ColorIndex, u32)>> {
    let mut seen: BTreeMap<ColorIndex, u32> = BTreeMap::new();
    for &p in pixels {
        *seen.entry(p).or_insert(0) += 1;
        if seen.len() > max_colors {
            return None;
        }
    }
    Some(seen.into_iter().collect())
}
