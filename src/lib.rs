//! Dominant color and palette extraction with Modified Median Cut
//! Quantization (MMCQ).
//!
//! ```
//! use zenpalette::{PaletteConfig, get_color, get_palette};
//!
//! let pixels = vec![rgb::RGB { r: 200u8, g: 30, b: 40 }; 64];
//! let img = imgref::ImgVec::new(pixels, 8, 8);
//!
//! let palette = get_palette(&img, &PaletteConfig::new().color_count(4))?;
//! assert_eq!(palette[0].hex(), "#c81e28");
//!
//! let dominant = get_color(&img, &PaletteConfig::new())?;
//! assert_eq!(dominant.rgb(), [200, 30, 40]);
//! # Ok::<(), zenpalette::PaletteError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod color_index;
pub mod error;
pub mod histogram;
pub mod median_cut;
pub mod palette;
pub mod queue;
pub mod sample;
pub mod source;
pub mod vbox;

pub use error::PaletteError;
pub use palette::{Metrics, PaletteEntry};
pub use queue::BoxOrder;
pub use sample::Area;
pub use source::{ColorFormat, PixelSource, RawPixels};

use alloc::vec::Vec;

/// Color count used by [`get_color`].
pub const DOMINANT_COLOR_COUNT: u32 = 5;

/// Configuration for palette extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteConfig {
    /// Requested number of colors (2..=256). The result is approximate.
    pub color_count: u32,
    /// Sampling stride: every `quality`-th pixel is examined. 1 = every pixel.
    pub quality: u32,
    /// Restrict sampling to a rectangle of the image.
    pub area: Option<Area>,
    /// Attach count, volume and ratio to every entry.
    pub metrics: bool,
    /// Order of the returned entries.
    pub order: BoxOrder,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            color_count: 10,
            quality: 10,
            area: None,
            metrics: false,
            order: BoxOrder::Population,
        }
    }
}

impl PaletteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_count(mut self, n: u32) -> Self {
        self.color_count = n;
        self
    }

    pub fn quality(mut self, q: u32) -> Self {
        self.quality = q;
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    pub fn order(mut self, order: BoxOrder) -> Self {
        self.order = order;
        self
    }
}

/// Extract a palette of roughly `config.color_count` colors.
pub fn get_palette<S>(source: &S, config: &PaletteConfig) -> Result<Vec<PaletteEntry>, PaletteError>
where
    S: PixelSource + ?Sized,
{
    get_palette_filtered(source, config, |_| true)
}

/// Extract a palette and keep the entries accepted by `filter`.
///
/// If the filter rejects every entry, the most prevalent one is kept.
pub fn get_palette_filtered<S, F>(
    source: &S,
    config: &PaletteConfig,
    filter: F,
) -> Result<Vec<PaletteEntry>, PaletteError>
where
    S: PixelSource + ?Sized,
    F: FnMut(&PaletteEntry) -> bool,
{
    validate_config(config)?;

    let sampler = sample::Sampler::new(source, config.area, config.quality as usize)?;
    let (histogram, pixels) = sampler.build_histogram();
    if pixels.is_empty() {
        return Err(PaletteError::EmptyInput);
    }
    log::debug!(
        "sampled {} of {} pixels into {} buckets",
        pixels.len(),
        sampler.pixel_count(),
        histogram.len()
    );

    let max_colors = config.color_count as usize;
    let total = pixels.len() as u64;
    let mut palette = match histogram::detect_exact_palette(&pixels, max_colors) {
        Some(exact) => {
            log::debug!("{} distinct colors, skipping median cut", exact.len());
            palette::from_exact(exact, total, config.metrics)
        }
        None => {
            let queue = median_cut::quantize(&histogram, &pixels, max_colors);
            palette::from_boxes(queue, config.order, total, config.metrics)
        }
    };

    palette::retain_or_first(&mut palette, filter);
    Ok(palette)
}

/// The dominant color: the first entry of a
/// [`DOMINANT_COLOR_COUNT`]-color palette.
///
/// `config.color_count` is ignored.
pub fn get_color<S>(source: &S, config: &PaletteConfig) -> Result<PaletteEntry, PaletteError>
where
    S: PixelSource + ?Sized,
{
    get_color_filtered(source, config, |_| true)
}

pub fn get_color_filtered<S, F>(
    source: &S,
    config: &PaletteConfig,
    filter: F,
) -> Result<PaletteEntry, PaletteError>
where
    S: PixelSource + ?Sized,
    F: FnMut(&PaletteEntry) -> bool,
{
    let config = config.clone().color_count(DOMINANT_COLOR_COUNT);
    get_palette_filtered(source, &config, filter)?
        .into_iter()
        .next()
        .ok_or(PaletteError::EmptyInput)
}

fn validate_config(config: &PaletteConfig) -> Result<(), PaletteError> {
    if config.color_count < 2 || config.color_count > 256 {
        return Err(PaletteError::InvalidColorCount(config.color_count));
    }
    if config.quality < 1 {
        return Err(PaletteError::InvalidQuality(config.quality));
    }
    Ok(())
}
