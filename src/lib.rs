//! P-Touch Raster Protocol Codec
//!
//! This crate encodes bitmap images into the raster command stream consumed
//! by Brother P-Touch printers (PT-P950NW, PT-9800PCN) and parses captured
//! command streams back into images. The byte stream is what gets sent to
//! TCP port 9100 on the printer; transport itself is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use ptouch_raster::{decode, render, Bitmap, Config, Model, TapeSize};
//!
//! let image = Bitmap::from_gray(2, 8, vec![0; 16]).unwrap();
//! let config = Config::new(Model::P950NW, TapeSize::Tape18mm);
//! let data = render(&[image], &config).unwrap();
//!
//! let decoded = decode(&data).unwrap();
//! assert_eq!(decoded.width(), 408);
//! ```

mod decoder;
mod encoder;
mod error;
mod model;
mod raster;
pub mod tiff;

pub use crate::{
    decoder::{decode, CompressionMode, LabelImage},
    encoder::{render, Config, BOTTOM_MARGIN_DEFAULT, TOP_MARGIN_DEFAULT},
    error::Error,
    model::{Model, TapeSize},
    raster::{raster_row, Bitmap},
};
