use thiserror::Error;

use crate::vbox::Axis;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match {width}x{height} with {channels} channels")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("color count must be between 2 and 256, got {0}")]
    InvalidColorCount(u32),

    #[error("quality must be at least 1, got {0}")]
    InvalidQuality(u32),

    #[error(
        "area {width}x{height} at ({x}, {y}) is out of image bounds {image_width}x{image_height}"
    )]
    AreaOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        image_width: usize,
        image_height: usize,
    },

    #[error("image has no usable pixels (blank, transparent or white)")]
    EmptyInput,
}

/// Median cut failures. These indicate a box inconsistent with its
/// histogram and never escape the public API; quantization stops refining
/// and keeps the boxes it has.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CutError {
    #[error("no median plane found along {axis:?} for a box of {total} pixels")]
    NoMedian { axis: Axis, total: u32 },

    #[error("box has a single slice along {0:?} and cannot be cut")]
    SingleSlice(Axis),
}
