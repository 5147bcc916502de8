extern crate alloc;
use alloc::vec::Vec;

use crate::color_index::ColorIndex;
use crate::error::PaletteError;
use crate::histogram::{Histogram, HistogramBuilder};
use crate::source::PixelSource;

/// Highest transparency (0 opaque, 127 invisible) a pixel may have and still
/// be sampled.
pub const TRANSPARENCY_THRESHOLD: u8 = 62;

/// A pixel is near-white when every channel is above this value.
pub const WHITE_THRESHOLD: u8 = 250;

/// Sample count above which the histogram is built in parallel.
#[cfg(feature = "rayon")]
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Transparency on the 0..=127 scale, derived from 8-bit alpha.
#[inline]
pub fn transparency(alpha: u8) -> u8 {
    127 - (alpha >> 1)
}

#[inline]
pub fn is_clearly_visible(pixel: rgb::RGBA<u8>) -> bool {
    transparency(pixel.a) <= TRANSPARENCY_THRESHOLD
}

#[inline]
pub fn is_non_white(pixel: rgb::RGBA<u8>) -> bool {
    !(pixel.r > WHITE_THRESHOLD && pixel.g > WHITE_THRESHOLD && pixel.b > WHITE_THRESHOLD)
}

/// A rectangle of the image to sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Area {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn fits(&self, image_width: usize, image_height: usize) -> bool {
        matches!(self.x.checked_add(self.width), Some(right) if right <= image_width)
            && matches!(self.y.checked_add(self.height), Some(bottom) if bottom <= image_height)
    }
}

/// Walks every `quality`-th pixel of an area and keeps the visible,
/// non-white ones.
pub struct Sampler<'a, S: PixelSource + ?Sized> {
    source: &'a S,
    area: Area,
    quality: usize,
}

impl<'a, S: PixelSource + ?Sized> Sampler<'a, S> {
    /// Sample the whole image, or `area` when given.
    pub fn new(source: &'a S, area: Option<Area>, quality: usize) -> Result<Self, PaletteError> {
        let (width, height) = (source.width(), source.height());
        let area = match area {
            Some(area) if !area.fits(width, height) => {
                return Err(PaletteError::AreaOutOfBounds {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height,
                    image_width: width,
                    image_height: height,
                });
            }
            Some(area) => area,
            None => Area::new(0, 0, width, height),
        };
        Ok(Self {
            source,
            area,
            quality: quality.max(1),
        })
    }

    /// Number of pixels in the sampled area.
    pub fn pixel_count(&self) -> usize {
        self.area.width * self.area.height
    }

    /// The pixel at linear position `i` of the area, if it passes the
    /// visibility and whiteness filters.
    #[inline]
    pub fn sample_at(&self, i: usize) -> Option<rgb::RGB<u8>> {
        let x = self.area.x + i % self.area.width;
        let y = self.area.y + i / self.area.width;
        let pixel = self.source.pixel(x, y);
        (is_clearly_visible(pixel) && is_non_white(pixel)).then_some(rgb::RGB {
            r: pixel.r,
            g: pixel.g,
            b: pixel.b,
        })
    }

    /// Accepted samples in scan order.
    pub fn samples(&self) -> impl Iterator<Item = rgb::RGB<u8>> + '_ {
        (0..self.pixel_count())
            .step_by(self.quality)
            .filter_map(move |i| self.sample_at(i))
    }

    /// Histogram and full-precision sample list of the accepted samples.
    pub fn build_histogram(&self) -> (Histogram, Vec<ColorIndex>) {
        #[cfg(feature = "rayon")]
        if self.pixel_count() / self.quality >= PARALLEL_THRESHOLD {
            return self.build_histogram_par();
        }

        let mut builder = HistogramBuilder::with_capacity(self.pixel_count() / self.quality + 1);
        for pixel in self.samples() {
            builder.push(pixel);
        }
        builder.finish()
    }

    #[cfg(feature = "rayon")]
    fn build_histogram_par(&self) -> (Histogram, Vec<ColorIndex>) {
        use rayon::prelude::*;

        let steps = self.pixel_count().div_ceil(self.quality);
        (0..steps)
            .into_par_iter()
            .filter_map(|k| self.sample_at(k * self.quality))
            .fold(HistogramBuilder::new, |mut builder, pixel| {
                builder.push(pixel);
                builder
            })
            .reduce(HistogramBuilder::new, HistogramBuilder::merge)
            .finish()
    }
}
