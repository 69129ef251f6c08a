//! Command stream assembly.
//!
//! The protocol here was reverse-engineered from what the Windows driver
//! sends. Many commands are documented in the Brother raster command
//! reference
//! (<http://download.brother.com/welcome/docp000771/cv_pth500p700e500_eng_raster_110.pdf>).

use log::{debug, info};

use crate::{
    error::Error,
    model::{Model, TapeSize},
    raster::{raster_row, Bitmap},
    tiff,
};

/// Default margin before every image, in dots.
pub const TOP_MARGIN_DEFAULT: u32 = 8;
/// Default margin after every image, in dots.
pub const BOTTOM_MARGIN_DEFAULT: u32 = 8;

/// Encoder configuration.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    model: Model,
    tape: TapeSize,
    top_margin: u32,
    bottom_margin: u32,
    compress: bool,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// Model and tape size are not modifiable after initialization.
    pub fn new(model: Model, tape: TapeSize) -> Config {
        Config {
            model,
            tape,
            top_margin: TOP_MARGIN_DEFAULT,
            bottom_margin: BOTTOM_MARGIN_DEFAULT,
            compress: false,
        }
    }

    /// Margin before every image, in dots.
    pub fn top_margin(self, dots: u32) -> Self {
        Config {
            top_margin: dots,
            ..self
        }
    }

    /// Margin after every image, in dots.
    pub fn bottom_margin(self, dots: u32) -> Self {
        Config {
            bottom_margin: dots,
            ..self
        }
    }

    /// Enable TIFF compression for row frames.
    ///
    /// Known to introduce artifacts on some printers, so off by default.
    pub fn compress(self, flag: bool) -> Self {
        Config {
            compress: flag,
            ..self
        }
    }

    /// Check the model/tape/margin combination before emitting anything.
    fn validate(&self) -> Result<u32, Error> {
        let stripe_size = self.model.stripe_size(self.tape)?;
        let cut_correction = self.model.cut_correction();
        if self.top_margin < cut_correction {
            return Err(Error::InvalidConfig(format!(
                "top margin {} is smaller than cut correction {} of {:?}",
                self.top_margin, cut_correction, self.model
            )));
        }
        Ok(stripe_size)
    }
}

/// Render images into the byte stream the printer consumes.
///
/// The stream is sent verbatim to TCP port 9100 on the printer, or written
/// to a file. No bytes are produced if the configuration is invalid.
pub fn render(images: &[Bitmap], config: &Config) -> Result<Vec<u8>, Error> {
    let stripe_size = config.validate()?;
    let stripe_count = (stripe_size / 8) as usize;
    let cut_correction = config.model.cut_correction();

    debug!("{:?}", config);

    let mut buf: Vec<u8> = Vec::new();

    // The Windows driver sends zero padding first, presumably to
    // synchronize the serial bus. Harmless over TCP.
    buf.extend_from_slice(&[0x00; 200]);

    buf.extend_from_slice(&[0x1B, 0x40]); // ESC @ : initialize
    buf.extend_from_slice(&[0x1B, 0x69, 0x61, 0x01]); // ESC i a : raster mode
    buf.extend_from_slice(&[0x1B, 0x69, 0x4D, 0x00]); // ESC i M : various mode, no auto cut
    buf.extend_from_slice(&[0x1B, 0x69, 0x64, 0x00, 0x00]); // ESC i d : margin 0

    let mut first = true;
    for img in images {
        if !first {
            buf.push(0x0C); // FF : next label
        }

        info!(
            "rendering {}x{} image on a {}-dot stripe",
            img.width(),
            img.height(),
            stripe_size
        );

        match config.model {
            Model::P950NW => {
                // "Raster number" is the printed length of the label.
                let raster_number = img.width() + config.top_margin + config.bottom_margin;

                buf.extend_from_slice(&[0x1B, 0x69, 0x7A]); // ESC i z : print information
                buf.push(0xC0); // PI_RECOVER | PI_QUALITY
                buf.push(0x00); // media type: not set
                buf.push(0x00); // media width in mm: not set
                buf.push(0x00); // media length: not set
                buf.extend_from_slice(&raster_number.to_le_bytes());
                buf.push(if first { 0x00 } else { 0x01 }); // starting page
                buf.push(0x00); // reserved
            }
            Model::Pt9800Pcn => {
                // Initialization specific to the 9800PCN. 0x12 is the
                // media width in mm (18mm).
                buf.extend_from_slice(&[0x1B, 0x69, 0x63, 0x8E, 0x01, 0x12, 0x00, 0x00]);

                // Feed amount; the cut correction below compensates for
                // this printer cutting early.
                buf.extend_from_slice(&[0x1B, 0x69, 0x64, 0x00, 0x00]);
            }
        }

        if config.compress {
            buf.extend_from_slice(&[0x4D, 0x02]); // M : TIFF compression
        } else {
            buf.extend_from_slice(&[0x4D, 0x00]); // M : no compression
        }

        // Margins are sent as empty lines instead of a margin setting for
        // compatibility across printers.
        for _ in 0..(config.top_margin - cut_correction) {
            buf.push(b'Z');
        }

        let y_offset = stripe_size as i32 - img.height() as i32;
        for x in 0..img.width() {
            let mut row = raster_row(img, stripe_count, x, y_offset);
            if config.compress {
                row = tiff::compress(&row);
            }
            buf.push(b'G');
            buf.extend_from_slice(&(row.len() as u16).to_le_bytes());
            buf.extend_from_slice(&row);
        }

        for _ in 0..(config.bottom_margin + cut_correction) {
            buf.push(b'Z');
        }

        first = false;
    }

    buf.push(0x1A); // Control-Z : print then eject
    Ok(buf)
}
