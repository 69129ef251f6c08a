//! TIFF (pack bits) run-length codec for raster rows.
//!
//! Brother documents this scheme in the raster command reference
//! (<http://download.brother.com/welcome/docp000771/cv_pth500p700e500_eng_raster_110.pdf>,
//! pages 34 and 36). A non-negative tag byte `n` is followed by `n + 1`
//! literal bytes; a negative tag byte `-m` is followed by a single byte
//! repeated `m + 1` times.

use crate::error::Error;

/// Longest literal chunk one tag can describe (tag range 0..=127).
const MAX_LITERAL: usize = 128;
/// Most extra repeats one run tag can describe (tag range -1..=-128).
const MAX_REPEATS: usize = 128;

/// Compress a row of bytes.
///
/// Runs of two or more equal bytes become a repeat tag; everything else is
/// buffered and flushed as literal tags. Runs and literal stretches longer
/// than one tag can express are split across multiple tags.
pub fn compress(row: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut pos = 0;
    let mut literal_start = 0;

    while pos < row.len() {
        // Count how many further identical bytes follow the current one.
        let mut count = 0;
        while pos + count + 1 < row.len()
            && count < MAX_REPEATS
            && row[pos + count + 1] == row[pos + count]
        {
            count += 1;
        }

        if count > 0 {
            flush_literal(&mut out, &row[literal_start..pos]);

            out.push((count as u8).wrapping_neg());
            out.push(row[pos]);
            pos += count + 1;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }

    flush_literal(&mut out, &row[literal_start..pos]);
    out
}

fn flush_literal(out: &mut Vec<u8>, literal: &[u8]) {
    for chunk in literal.chunks(MAX_LITERAL) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
}

/// One decoded piece of a compressed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Raw bytes copied through unchanged.
    Literal(&'a [u8]),
    /// `value` repeated `count` times.
    Run { value: u8, count: usize },
}

/// Lazy decompressor.
///
/// Yields one [`Chunk`] per tag; stops after the first error.
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
}

/// Iterate over the chunks of a compressed buffer.
pub fn chunks(data: &[u8]) -> Chunks<'_> {
    Chunks { data, pos: 0 }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let tag = self.data[self.pos] as i8;
        let item = if tag < 0 {
            match self.data.get(self.pos + 1) {
                Some(&value) => {
                    self.pos += 2;
                    Ok(Chunk::Run {
                        value,
                        count: -(tag as isize) as usize + 1,
                    })
                }
                None => Err(Error::Malformed(format!(
                    "repeat tag at position {} has no value byte",
                    self.pos
                ))),
            }
        } else {
            let len = tag as usize + 1;
            let start = self.pos + 1;
            if start + len > self.data.len() {
                Err(Error::Malformed(format!(
                    "literal tag at position {} declares {} bytes but only {} remain",
                    self.pos,
                    len,
                    self.data.len() - start
                )))
            } else {
                self.pos = start + len;
                Ok(Chunk::Literal(&self.data[start..start + len]))
            }
        };

        if item.is_err() {
            self.pos = self.data.len();
        }
        Some(item)
    }
}

/// Decompress a whole buffer into a fresh `Vec<u8>`.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for chunk in chunks(data) {
        match chunk? {
            Chunk::Literal(bytes) => out.extend_from_slice(bytes),
            Chunk::Run { value, count } => out.resize(out.len() + count, value),
        }
    }
    Ok(out)
}
