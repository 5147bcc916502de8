extern crate alloc;
use alloc::vec::Vec;

use crate::error::PaletteError;

/// Read-only access to the pixels of a decoded image.
///
/// Alpha follows the usual 8-bit convention: 255 is opaque, 0 is invisible.
pub trait PixelSource: Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Pixel at column `x`, row `y`. Callers stay within `width × height`.
    fn pixel(&self, x: usize, y: usize) -> rgb::RGBA<u8>;
}

/// Pixel types an [`imgref`] image can hold to act as a [`PixelSource`].
pub trait SourcePixel: Copy + Sync {
    fn to_rgba(self) -> rgb::RGBA<u8>;
}

impl SourcePixel for rgb::RGBA<u8> {
    #[inline]
    fn to_rgba(self) -> rgb::RGBA<u8> {
        self
    }
}

impl SourcePixel for rgb::RGB<u8> {
    #[inline]
    fn to_rgba(self) -> rgb::RGBA<u8> {
        rgb::RGBA {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 255,
        }
    }
}

impl<P: SourcePixel> PixelSource for imgref::Img<&[P]> {
    fn width(&self) -> usize {
        imgref::Img::width(self)
    }

    fn height(&self) -> usize {
        imgref::Img::height(self)
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> rgb::RGBA<u8> {
        self.buf()[y * self.stride() + x].to_rgba()
    }
}

impl<P: SourcePixel> PixelSource for imgref::Img<Vec<P>> {
    fn width(&self) -> usize {
        imgref::Img::width(self)
    }

    fn height(&self) -> usize {
        imgref::Img::height(self)
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> rgb::RGBA<u8> {
        self.buf()[y * self.stride() + x].to_rgba()
    }
}

/// Channel layout of a raw interleaved byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Rgb,
    Rgba,
    Argb,
    Bgr,
    Bgra,
}

impl ColorFormat {
    /// Bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorFormat::Rgb | ColorFormat::Bgr => 3,
            ColorFormat::Rgba | ColorFormat::Argb | ColorFormat::Bgra => 4,
        }
    }

    #[inline]
    fn parts(self, px: &[u8]) -> rgb::RGBA<u8> {
        let (r, g, b, a) = match self {
            ColorFormat::Rgb => (px[0], px[1], px[2], 255),
            ColorFormat::Rgba => (px[0], px[1], px[2], px[3]),
            ColorFormat::Argb => (px[1], px[2], px[3], px[0]),
            ColorFormat::Bgr => (px[2], px[1], px[0], 255),
            ColorFormat::Bgra => (px[2], px[1], px[0], px[3]),
        };
        rgb::RGBA { r, g, b, a }
    }
}

/// A tightly packed, row-major byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawPixels<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    format: ColorFormat,
}

impl<'a> RawPixels<'a> {
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        format: ColorFormat,
    ) -> Result<Self, PaletteError> {
        if width == 0 || height == 0 {
            return Err(PaletteError::ZeroDimension);
        }
        let channels = format.channels();
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels));
        if expected != Some(data.len()) {
            return Err(PaletteError::DimensionMismatch {
                len: data.len(),
                width,
                height,
                channels,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }
}

impl PixelSource for RawPixels<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> rgb::RGBA<u8> {
        let channels = self.format.channels();
        let start = (y * self.width + x) * channels;
        self.format.parts(&self.data[start..start + channels])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn raw_formats_reorder_channels() {
        let cases = [
            (ColorFormat::Rgb, vec![1u8, 2, 3]),
            (ColorFormat::Rgba, vec![1, 2, 3, 4]),
            (ColorFormat::Argb, vec![4, 1, 2, 3]),
            (ColorFormat::Bgr, vec![3, 2, 1]),
            (ColorFormat::Bgra, vec![3, 2, 1, 4]),
        ];
        for (format, data) in cases {
            let raw = RawPixels::new(&data, 1, 1, format).unwrap();
            assert_eq!(raw.format(), format);
            let px = raw.pixel(0, 0);
            assert_eq!((px.r, px.g, px.b), (1, 2, 3), "{format:?}");
            let expected_alpha = if format.channels() == 4 { 4 } else { 255 };
            assert_eq!(px.a, expected_alpha, "{format:?}");
        }
    }

    #[test]
    fn raw_rejects_bad_lengths() {
        let data = [0u8; 11];
        assert_eq!(
            RawPixels::new(&data, 2, 2, ColorFormat::Rgb).unwrap_err(),
            PaletteError::DimensionMismatch {
                len: 11,
                width: 2,
                height: 2,
                channels: 3
            }
        );
        assert_eq!(
            RawPixels::new(&data, 0, 2, ColorFormat::Rgb).unwrap_err(),
            PaletteError::ZeroDimension
        );
    }

    #[test]
    fn raw_addresses_rows() {
        let data = [10u8, 0, 0, 20, 0, 0, 30, 0, 0, 40, 0, 0];
        let raw = RawPixels::new(&data, 2, 2, ColorFormat::Rgb).unwrap();
        assert_eq!(raw.pixel(1, 0).r, 20);
        assert_eq!(raw.pixel(0, 1).r, 30);
    }

    #[test]
    fn imgref_respects_stride() {
        let buf: Vec<rgb::RGB<u8>> = (0..6u8).map(|i| rgb::RGB { r: i, g: 0, b: 0 }).collect();
        // 2x2 view into a 3-wide buffer
        let img = imgref::Img::new_stride(&buf[..], 2, 2, 3);
        assert_eq!(PixelSource::width(&img), 2);
        assert_eq!(img.pixel(1, 1).r, 4);
        assert_eq!(img.pixel(0, 0).a, 255);
    }

    #[test]
    fn imgvec_rgba_keeps_alpha() {
        let img = imgref::ImgVec::new(vec![rgb::RGBA { r: 1, g: 2, b: 3, a: 7 }], 1, 1);
        assert_eq!(img.pixel(0, 0).a, 7);
        assert_eq!(PixelSource::height(&img), 1);
    }
}
