//! Pixel buffers and stripe rasterization.
//!
//! The printer prints one stripe per image column: a vertical slice of the
//! image packed into bits, most significant bit first. Pixels at or below
//! the luminance threshold print black.

use crate::error::Error;

/// Luminance above which a pixel is considered white (no print).
const WHITE_THRESHOLD: u16 = 230;

enum Channels {
    Gray(Vec<u8>),
    Rgb(Vec<u8>),
}

/// A caller-supplied pixel image, grayscale or RGB, row-major.
///
/// Read-only input to the encoder; never mutated by the codec.
pub struct Bitmap {
    width: u32,
    height: u32,
    channels: Channels,
}

impl Bitmap {
    /// Wrap a grayscale buffer of `width * height` bytes.
    pub fn from_gray(width: u32, height: u32, data: Vec<u8>) -> Result<Self, Error> {
        if data.len() != (width * height) as usize {
            return Err(Error::InvalidConfig(format!(
                "gray buffer is {} bytes, expected {}x{} = {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Bitmap {
            width,
            height,
            channels: Channels::Gray(data),
        })
    }

    /// Wrap an RGB buffer of `width * height * 3` bytes.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, Error> {
        if data.len() != (width * height * 3) as usize {
            return Err(Error::InvalidConfig(format!(
                "rgb buffer is {} bytes, expected {}x{}x3 = {}",
                data.len(),
                width,
                height,
                width * height * 3
            )));
        }
        Ok(Bitmap {
            width,
            height,
            channels: Channels::Rgb(data),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)` prints black.
    ///
    /// RGB pixels use the mean of the three channels, compared without
    /// rounding loss (`r + g + b` against `3 * threshold`).
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        let idx = (y * self.width + x) as usize;
        match &self.channels {
            Channels::Gray(data) => u16::from(data[idx]) <= WHITE_THRESHOLD,
            Channels::Rgb(data) => {
                let sum = u16::from(data[idx * 3])
                    + u16::from(data[idx * 3 + 1])
                    + u16::from(data[idx * 3 + 2]);
                sum <= WHITE_THRESHOLD * 3
            }
        }
    }
}

/// Rasterize image column `x` into `stripe_count` packed bytes.
///
/// `y_offset` aligns the image height inside a possibly taller stripe:
/// output bit `stripe_idx * 8 + bit_index` samples source row
/// `stripe_idx * 8 + bit_index - y_offset`. Positions outside the image are
/// white.
pub fn raster_row(img: &Bitmap, stripe_count: usize, x: u32, y_offset: i32) -> Vec<u8> {
    let mut row = Vec::with_capacity(stripe_count);
    for stripe_idx in 0..stripe_count {
        let mut bits = 0u8;
        for bit_index in 0..8 {
            let y = (stripe_idx * 8 + bit_index) as i32 - y_offset;
            if x < img.width() && y >= 0 && (y as u32) < img.height() && img.is_black(x, y as u32) {
                bits |= 1 << (7 - bit_index);
            }
        }
        row.push(bits);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary() {
        let img = Bitmap::from_gray(2, 1, vec![230, 231]).unwrap();
        assert!(img.is_black(0, 0));
        assert!(!img.is_black(1, 0));
    }

    #[test]
    fn rgb_mean_does_not_truncate() {
        // Mean 230.67 is above the threshold even though integer division
        // would truncate it to 230.
        let img = Bitmap::from_rgb(2, 1, vec![231, 231, 230, 230, 230, 230]).unwrap();
        assert!(!img.is_black(0, 0));
        assert!(img.is_black(1, 0));
    }

    #[test]
    fn buffer_size_is_validated() {
        assert!(matches!(
            Bitmap::from_gray(3, 3, vec![0; 8]),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Bitmap::from_rgb(2, 2, vec![0; 11]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn bits_pack_msb_first() {
        // Single column, 8 rows: black at y = 0 and y = 7.
        let mut pixels = vec![255u8; 8];
        pixels[0] = 0;
        pixels[7] = 0;
        let img = Bitmap::from_gray(1, 8, pixels).unwrap();
        assert_eq!(raster_row(&img, 1, 0, 0), vec![0b1000_0001]);
    }

    #[test]
    fn offset_shifts_image_down_the_stripe() {
        // 16-dot stripe, 8-pixel-tall all-black image, offset 8: the image
        // lands in the second byte.
        let img = Bitmap::from_gray(1, 8, vec![0; 8]).unwrap();
        assert_eq!(raster_row(&img, 2, 0, 8), vec![0x00, 0xFF]);
    }

    #[test]
    fn out_of_bounds_is_white() {
        let img = Bitmap::from_gray(1, 8, vec![0; 8]).unwrap();
        assert_eq!(raster_row(&img, 1, 5, 0), vec![0x00]);
        assert_eq!(raster_row(&img, 1, 0, -8), vec![0x00]);
    }
}
