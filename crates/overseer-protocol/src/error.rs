//! Error types for the frame codec.

use std::io;

use thiserror::Error;

/// Violations of the management framing rules.
///
/// Framing errors are fatal to the connection: once a field is misread the
/// reader cannot find the next field boundary again.
#[derive(Debug, Error)]
pub enum FramingError {
    /// A field tag did not match the tag the reader expected.
    #[error("expected tag 0x{expected:02X} but read 0x{found:02X}")]
    UnexpectedTag {
        /// Tag required at this position.
        expected: u8,
        /// Byte actually read.
        found: u8,
    },
    /// The stream ended inside a field.
    #[error("stream ended while reading {field}")]
    Truncated {
        /// Name of the field being read.
        field: &'static str,
    },
    /// A collection count was negative.
    #[error("invalid element count {count}")]
    NegativeCount {
        /// Count read from the wire.
        count: i32,
    },
    /// A collection is too large for the 32-bit count field.
    #[error("element count {count} does not fit the count field")]
    CountOverflow {
        /// Number of elements to encode.
        count: usize,
    },
    /// A string field did not contain valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    /// A string is too long for its 16-bit length prefix.
    #[error("string of {len} bytes exceeds the {max} byte limit")]
    StringTooLong {
        /// Encoded length of the string.
        len: usize,
        /// Largest encodable length.
        max: usize,
    },
    /// An opaque payload exceeded the configured size limit.
    #[error("opaque payload of {size} bytes exceeds the {max} byte limit")]
    OpaqueTooLarge {
        /// Announced or encoded payload size.
        size: usize,
        /// Largest accepted payload size.
        max: usize,
    },
}

/// Errors raised while reading or writing frame fields.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The byte stream violated the framing rules.
    #[error(transparent)]
    Framing(#[from] FramingError),
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An opaque payload could not be decoded into the requested type.
    #[error("failed to decode opaque {type_name}: {source}")]
    Decode {
        /// Type the payload was decoded into.
        type_name: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// A value could not be encoded as an opaque payload.
    #[error("failed to encode opaque {type_name}: {source}")]
    Encode {
        /// Type of the value being encoded.
        type_name: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl FrameError {
    /// Maps an I/O error raised while reading `field`.
    ///
    /// End-of-stream becomes [`FramingError::Truncated`]; every other I/O
    /// failure is kept as a transport error.
    pub(crate) fn from_read(field: &'static str, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Self::Framing(FramingError::Truncated { field })
        } else {
            Self::Io(error)
        }
    }
}
