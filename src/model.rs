use crate::error::Error;

/// Supported printer models.
///
/// The model determines the stripe size (dots across the tape, always a
/// multiple of 8) and which per-image initialization sequence is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// PT-P950NW. Variable stripe size depending on tape width.
    P950NW, // TESTED
    /// PT-9800PCN. Fixed 312-dot stripe, 18mm tape only.
    Pt9800Pcn,
}

/// Tape width installed in the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeSize {
    Tape18mm,
    Tape36mm,
}

impl Model {
    /// Number of dots in one stripe for this model and tape width.
    ///
    /// Returns `InvalidConfig` for combinations the printer does not
    /// support, e.g. 36mm tape in a PT-9800PCN.
    pub fn stripe_size(&self, tape: TapeSize) -> Result<u32, Error> {
        let dots = match (self, tape) {
            (Self::P950NW, TapeSize::Tape18mm) => 408,
            (Self::P950NW, TapeSize::Tape36mm) => 536,
            (Self::Pt9800Pcn, TapeSize::Tape18mm) => 312,
            (Self::Pt9800Pcn, TapeSize::Tape36mm) => {
                return Err(Error::InvalidConfig(format!(
                    "{:?} does not support {:?}",
                    self, tape
                )))
            }
        };
        debug_assert!(dots % 8 == 0);
        Ok(dots)
    }

    /// Dots the printer cuts after the cut signal is sent.
    ///
    /// The encoder shifts the top and bottom margins by this amount so the
    /// physical cut lands where the caller asked for it.
    pub fn cut_correction(&self) -> u32 {
        match self {
            Self::P950NW => 0,
            Self::Pt9800Pcn => 8,
        }
    }
}
