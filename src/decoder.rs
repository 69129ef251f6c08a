//! Parse a captured command stream back into an image.
//!
//! A single forward scan over the byte stream with the printer's mode,
//! compression, margin and mirroring state threaded through it. Commands
//! outside the documented subset are hard errors; diagnostic-only commands
//! are logged and skipped.

use log::{debug, info, warn};

use crate::{error::Error, tiff};

/// Operating mode selected with `ESC i a`.
///
/// Raster-specific commands (`M`, `Z`, `G`, margin and print-information
/// settings) are only legal in [`OperatingMode::Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatingMode {
    EscP,
    Raster,
    /// Power-on default before any mode switch is seen.
    PTouch,
}

impl OperatingMode {
    fn from_code(code: u8, pos: usize) -> Result<Self, Error> {
        match code {
            0x00 => Ok(Self::EscP),
            0x01 => Ok(Self::Raster),
            0x02 => Ok(Self::PTouch),
            _ => Err(Error::Protocol {
                pos,
                reason: format!("invalid operating mode 0x{:02x}", code),
            }),
        }
    }
}

/// Row compression selected with the `M` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Raw,
    RunLength,
}

impl CompressionMode {
    fn from_code(code: u8, pos: usize) -> Result<Self, Error> {
        match code {
            0x00 => Ok(Self::Raw),
            0x02 => Ok(Self::RunLength),
            _ => Err(Error::Protocol {
                pos,
                reason: format!("invalid compression mode 0x{:02x}", code),
            }),
        }
    }
}

/// One parsed raster line, before finalization.
enum Row {
    /// A `Z` command: a line with no print data, width not yet known.
    Empty,
    /// A `G` command expanded to one cell per dot, `true` = black.
    Data(Vec<bool>),
}

/// A finalized decoded image.
///
/// Rows are uniform in length, margin rows are included, and the
/// protocol's default row reversal has been applied unless the stream
/// enabled mirroring.
pub struct LabelImage {
    rows: Vec<Vec<bool>>,
    margin: u16,
    mirroring: bool,
}

impl LabelImage {
    /// Image width in cells (the stripe size of the printing device).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Image height in rows, margin rows included.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Margin width discovered from the stream (`ESC i d`).
    pub fn margin(&self) -> u16 {
        self.margin
    }

    /// Whether the stream enabled mirrored printing.
    pub fn mirroring(&self) -> bool {
        self.mirroring
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn is_black(&self, x: usize, y: usize) -> bool {
        self.rows[y][x]
    }

    /// Render as a plain-text netpbm bitmap (`P1`).
    pub fn to_pbm(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"P1\n");
        out.extend_from_slice(format!("{} {}\n", self.width(), self.height()).as_bytes());
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            for (j, &cell) in row.iter().enumerate() {
                if j > 0 {
                    out.push(b' ');
                }
                out.push(if cell { b'1' } else { b'0' });
            }
        }
        out
    }
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
    mode: OperatingMode,
    compression: Option<CompressionMode>,
    margin: u16,
    mirroring: bool,
    rows: Vec<Row>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Parser {
            data,
            pos: 0,
            mode: OperatingMode::PTouch,
            compression: None,
            margin: 0,
            mirroring: false,
            rows: Vec::new(),
        }
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        match self.data.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(Error::Malformed(format!(
                "unexpected end of stream at position 0x{:x}",
                self.pos
            ))),
        }
    }

    fn read_u16_le(&mut self) -> Result<u16, Error> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], Error> {
        if self.pos + count > self.data.len() {
            return Err(Error::Malformed(format!(
                "need {} bytes at position 0x{:x} but only {} remain",
                count,
                self.pos,
                self.data.len() - self.pos
            )));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn run(&mut self) -> Result<(), Error> {
        // Skip synchronization zeroes at the start, if present.
        while self.pos < self.data.len() && self.data[self.pos] == 0 {
            self.pos += 1;
        }

        while self.pos < self.data.len() {
            let byte = self.data[self.pos];
            let raster = self.mode == OperatingMode::Raster;

            if raster && byte == b'M' {
                self.pos += 1;
                let code = self.read_u8()?;
                self.compression = Some(CompressionMode::from_code(code, self.pos - 1)?);
                debug!("compression mode: {:?}", self.compression);
            } else if raster && byte == b'Z' {
                // Zero raster graphics: an empty line.
                self.rows.push(Row::Empty);
                self.pos += 1;
            } else if raster && byte == b'G' {
                self.pos += 1;
                self.raster_line()?;
            } else if byte == 0xFF {
                debug!("print command at position 0x{:x}", self.pos);
                self.pos += 1;
            } else if raster && byte == 0x1A {
                debug!("print command with feeding at position 0x{:x}", self.pos);
                self.pos += 1;
            } else if byte == 0x0C || byte == 0x0F {
                info!("form feed at position 0x{:x}, ignoring", self.pos);
                self.pos += 1;
            } else if byte == 0x1B {
                self.pos += 1;
                self.escape()?;
            } else {
                return Err(Error::UnexpectedControlByte {
                    byte,
                    pos: self.pos,
                });
            }
        }
        Ok(())
    }

    /// Handle a `G` frame: length-prefixed row payload.
    fn raster_line(&mut self) -> Result<(), Error> {
        let frame_pos = self.pos - 1;
        let dlen = self.read_u16_le()? as usize;
        let payload = self.take(dlen)?;

        let binrow = match self.compression {
            Some(CompressionMode::RunLength) => tiff::decompress(payload)?,
            Some(CompressionMode::Raw) => payload.to_vec(),
            None => {
                return Err(Error::Protocol {
                    pos: frame_pos,
                    reason: "raster data before a compression mode was selected".into(),
                })
            }
        };

        let mut row = Vec::with_capacity(binrow.len() * 8);
        for byte in binrow {
            for bit in 0..8 {
                row.push((byte >> (7 - bit)) & 0x01 != 0);
            }
        }
        self.rows.push(Row::Data(row));
        Ok(())
    }

    /// Dispatch the command selector after an ESC byte.
    fn escape(&mut self) -> Result<(), Error> {
        let cmd = self.read_u8()?;
        match cmd {
            b'@' => {} // initialize
            b'i' => self.escape_i()?,
            _ => {
                return Err(Error::NotImplemented(format!(
                    "command {:?} / 0x{:02x}",
                    cmd as char, cmd
                )))
            }
        }
        Ok(())
    }

    fn escape_i(&mut self) -> Result<(), Error> {
        let raster = self.mode == OperatingMode::Raster;
        let subcmd = self.read_u8()?;

        match subcmd {
            b'a' => {
                let code = self.read_u8()?;
                self.mode = OperatingMode::from_code(code, self.pos - 1)?;
                debug!("operating mode: {:?}", self.mode);
            }
            b'c' => {
                let args = self.take(5)?;
                info!("9800PCN initialization: {}", hex::encode(args));
            }
            b'U' => {
                let subsubcmd = self.read_u8()?;
                if subsubcmd == b'B' {
                    let _ = self.read_u8()?; // baud rate, irrelevant here
                } else if raster && subsubcmd == b'J' {
                    let args = self.take(14)?;
                    warn!("unidentified command iUJ, args {}", hex::encode(args));
                } else {
                    return Err(Error::NotImplemented(format!(
                        "bus subsubcommand of iU in mode {:?}: 0x{:02x}",
                        self.mode, subsubcmd
                    )));
                }
            }
            b'z' if raster => {
                let args = self.take(10)?;
                info!("print information command: {}", hex::encode(args));
            }
            b'A' if raster => {
                let args = self.take(1)?;
                warn!("unknown command iA, args {}", hex::encode(args));
            }
            b'k' if raster => {
                let args = self.take(3)?;
                warn!("unknown command ik, args {}", hex::encode(args));
            }
            b'K' if raster => {
                let _ = self.read_u8()?; // advanced mode settings, irrelevant here
            }
            b'd' if raster => {
                self.margin = self.read_u16_le()?;
                debug!("margin: {}", self.margin);
            }
            b'M' => {
                let bits = self.read_u8()?;
                if bits & !0x04 != 0 {
                    return Err(Error::NotImplemented(format!(
                        "strange bits in various mode settings: 0x{:02x}",
                        bits
                    )));
                }
                self.mirroring = bits & 0x04 != 0;
                debug!("mirroring: {}", self.mirroring);
            }
            _ => {
                return Err(Error::NotImplemented(format!(
                    "subcommand i {:?} / 0x{:02x} in mode {:?}",
                    subcmd as char, subcmd, self.mode
                )))
            }
        }
        Ok(())
    }

    /// Expand empty rows, apply margins and the default row reversal.
    fn finalize(self) -> Result<LabelImage, Error> {
        let max_len = self
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::Data(cells) => Some(cells.len()),
                Row::Empty => None,
            })
            .max()
            .ok_or_else(|| Error::Malformed("stream contains no raster data rows".into()))?;

        let blank = vec![false; max_len];
        let mut rows = Vec::with_capacity(self.rows.len() + 2 * self.margin as usize);

        rows.resize(self.margin as usize, blank.clone());
        for row in self.rows {
            match row {
                Row::Empty => rows.push(blank.clone()),
                Row::Data(cells) => {
                    if cells.len() != max_len {
                        return Err(Error::Malformed(format!(
                            "row is {} cells wide, expected {}",
                            cells.len(),
                            max_len
                        )));
                    }
                    rows.push(cells);
                }
            }
        }
        rows.resize(rows.len() + self.margin as usize, blank);

        // The protocol stores rows reversed; mirrored printing suppresses
        // the reversal.
        if !self.mirroring {
            for row in &mut rows {
                row.reverse();
            }
        }

        Ok(LabelImage {
            rows,
            margin: self.margin,
            mirroring: self.mirroring,
        })
    }
}

/// Decode a raw command stream into a [`LabelImage`].
pub fn decode(data: &[u8]) -> Result<LabelImage, Error> {
    let mut parser = Parser::new(data);
    parser.run()?;
    let image = parser.finalize()?;
    info!(
        "decoded {}x{} image, margin {}, mirroring {}",
        image.width(),
        image.height(),
        image.margin(),
        image.mirroring()
    );
    Ok(image)
}
