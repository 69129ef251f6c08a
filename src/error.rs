//! Error types for encoding and decoding raster command streams.
//!
//! All errors are fatal for the current call; there are no retries inside
//! the codec. The caller decides whether to abort or skip the input.

use thiserror::Error;

/// Main error type for raster codec operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The input byte stream is truncated or structurally broken.
    ///
    /// Raised when a compression tag or row frame declares more bytes than
    /// remain in the buffer, or when finalization finds no usable rows.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// An unexpected control byte where a command was expected.
    ///
    /// This usually means the stream is corrupted or is not a P-Touch
    /// raster command stream at all.
    #[error("unexpected control byte 0x{byte:02x} at position 0x{pos:x}")]
    UnexpectedControlByte { byte: u8, pos: usize },

    /// A recognized command carried an argument outside the protocol.
    #[error("protocol error at position 0x{pos:x}: {reason}")]
    Protocol { pos: usize, reason: String },

    /// A recognized-but-unhandled command, subcommand or mode combination.
    ///
    /// Distinguished from [`Error::Protocol`] because it signals a known
    /// gap in the command subset rather than corrupted input.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Invalid configuration parameter provided.
    ///
    /// Raised before any output bytes are produced, e.g. for an unsupported
    /// model/tape combination or a margin smaller than the cut correction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
