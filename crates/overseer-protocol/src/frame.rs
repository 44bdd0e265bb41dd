//! Tagged field codec.
//!
//! Every value on the wire is preceded by a one-byte tag. Primitive fields
//! use the following encodings, all multi-byte integers being big endian:
//!
//! ```text
//! byte    : 1 byte
//! int     : i32, 4 bytes
//! utf8    : u16 length, then that many UTF-8 bytes
//! opaque  : u32 length, then a JSON document of that length
//! ```
//!
//! Opaque values are serde types with a closed set of variants, so decoding
//! never consults a runtime type registry.

use std::any::type_name;
use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FrameError, FramingError};

/// Largest opaque payload accepted in either direction (16 MiB).
pub const MAX_OPAQUE_BYTES: usize = 16 * 1024 * 1024;

/// Largest string encodable behind the 16-bit length prefix.
pub const MAX_UTF8_BYTES: usize = u16::MAX as usize;

/// Upper bound on slots reserved up front for an announced element count.
///
/// Counts come from the peer, so the reader grows past this bound only as
/// elements actually arrive.
pub const PREALLOCATION_LIMIT: usize = 1024;

/// Reads tagged fields from a byte stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
}

impl<R: Read> FrameReader<R> {
    /// Wraps a byte stream.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Consumes one tag byte and checks it against `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnexpectedTag`] on a mismatch and
    /// [`FramingError::Truncated`] when the stream has ended.
    pub fn expect_tag(&mut self, expected: u8) -> Result<(), FrameError> {
        let found = self.read_array::<1>("tag")?[0];
        if found == expected {
            Ok(())
        } else {
            Err(FramingError::UnexpectedTag { expected, found }.into())
        }
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream ends or fails.
    pub fn read_byte(&mut self) -> Result<u8, FrameError> {
        Ok(self.read_array::<1>("byte")?[0])
    }

    /// Reads a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream ends or fails.
    pub fn read_int(&mut self) -> Result<i32, FrameError> {
        Ok(i32::from_be_bytes(self.read_array::<4>("int")?))
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::InvalidUtf8`] for malformed text, or a
    /// truncation/I/O error from the stream.
    pub fn read_utf8(&mut self) -> Result<String, FrameError> {
        let len = usize::from(u16::from_be_bytes(self.read_array::<2>("string length")?));
        let bytes = self.read_vec("string", len)?;
        String::from_utf8(bytes).map_err(|_| FramingError::InvalidUtf8.into())
    }

    /// Reads a length-prefixed opaque value and decodes it as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::OpaqueTooLarge`] when the announced length
    /// exceeds [`MAX_OPAQUE_BYTES`], [`FrameError::Decode`] when the payload
    /// is not a valid `T`, or a truncation/I/O error from the stream.
    pub fn read_opaque<T: DeserializeOwned>(&mut self) -> Result<T, FrameError> {
        let announced = u32::from_be_bytes(self.read_array::<4>("opaque length")?);
        let size = usize::try_from(announced).unwrap_or(usize::MAX);
        if size > MAX_OPAQUE_BYTES {
            return Err(FramingError::OpaqueTooLarge {
                size,
                max: MAX_OPAQUE_BYTES,
            }
            .into());
        }
        let payload = self.read_vec("opaque payload", size)?;
        serde_json::from_slice(&payload).map_err(|source| FrameError::Decode {
            type_name: type_name::<T>(),
            source,
        })
    }

    /// Reads `tag` followed by a non-negative element count.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::NegativeCount`] for counts below zero, or any
    /// error raised while reading the tag or the integer.
    pub fn read_count(&mut self, tag: u8) -> Result<usize, FrameError> {
        self.expect_tag(tag)?;
        let count = self.read_int()?;
        usize::try_from(count).map_err(|_| FramingError::NegativeCount { count }.into())
    }

    /// Reads a counted list of tagged opaque elements.
    ///
    /// The list starts with `count_tag` and an element count; each element is
    /// preceded by `element_tag`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the count or by any element.
    pub fn read_tagged_list<T: DeserializeOwned>(
        &mut self,
        count_tag: u8,
        element_tag: u8,
    ) -> Result<Vec<T>, FrameError> {
        let count = self.read_count(count_tag)?;
        let mut elements = Vec::with_capacity(count.min(PREALLOCATION_LIMIT));
        for _ in 0..count {
            self.expect_tag(element_tag)?;
            elements.push(self.read_opaque()?);
        }
        Ok(elements)
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], FrameError> {
        let mut buf = [0_u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|error| FrameError::from_read(field, error))?;
        Ok(buf)
    }

    fn read_vec(&mut self, field: &'static str, len: usize) -> Result<Vec<u8>, FrameError> {
        let mut buf = vec![0_u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|error| FrameError::from_read(field, error))?;
        Ok(buf)
    }
}

/// Writes tagged fields to a byte stream.
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: Write> FrameWriter<W> {
    /// Wraps a byte stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes a tag byte.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream fails.
    pub fn write_tag(&mut self, tag: u8) -> Result<(), FrameError> {
        self.write_byte(tag)
    }

    /// Writes a single byte.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream fails.
    pub fn write_byte(&mut self, value: u8) -> Result<(), FrameError> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    /// Writes a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream fails.
    pub fn write_int(&mut self, value: i32) -> Result<(), FrameError> {
        self.inner.write_all(&value.to_be_bytes())?;
        Ok(())
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::StringTooLong`] when `value` exceeds
    /// [`MAX_UTF8_BYTES`], or an error when the stream fails.
    pub fn write_utf8(&mut self, value: &str) -> Result<(), FrameError> {
        let len = u16::try_from(value.len()).map_err(|_| FramingError::StringTooLong {
            len: value.len(),
            max: MAX_UTF8_BYTES,
        })?;
        self.inner.write_all(&len.to_be_bytes())?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Encodes `value` and writes it as a length-prefixed opaque payload.
    ///
    /// The value is fully encoded before any byte is written, so an encoding
    /// failure leaves the stream untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Encode`] when serialisation fails,
    /// [`FramingError::OpaqueTooLarge`] when the payload exceeds
    /// [`MAX_OPAQUE_BYTES`], or an error when the stream fails.
    pub fn write_opaque<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FrameError> {
        let payload = serde_json::to_vec(value).map_err(|source| FrameError::Encode {
            type_name: type_name::<T>(),
            source,
        })?;
        let too_large = || FramingError::OpaqueTooLarge {
            size: payload.len(),
            max: MAX_OPAQUE_BYTES,
        };
        if payload.len() > MAX_OPAQUE_BYTES {
            return Err(too_large().into());
        }
        let len = u32::try_from(payload.len()).map_err(|_| too_large())?;
        self.inner.write_all(&len.to_be_bytes())?;
        self.inner.write_all(&payload)?;
        Ok(())
    }

    /// Writes `tag` followed by an element count.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::CountOverflow`] when `count` does not fit an
    /// `i32`, or an error when the stream fails.
    pub fn write_count(&mut self, tag: u8, count: usize) -> Result<(), FrameError> {
        let encoded = i32::try_from(count).map_err(|_| FramingError::CountOverflow { count })?;
        self.write_tag(tag)?;
        self.write_int(encoded)
    }

    /// Writes a counted list of tagged opaque elements.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while writing the count or an element.
    pub fn write_tagged_list<T: Serialize>(
        &mut self,
        count_tag: u8,
        element_tag: u8,
        elements: &[T],
    ) -> Result<(), FrameError> {
        self.write_count(count_tag, elements.len())?;
        for element in elements {
            self.write_tag(element_tag)?;
            self.write_opaque(element)?;
        }
        Ok(())
    }

    /// Flushes the wrapped stream.
    ///
    /// # Errors
    ///
    /// Returns an error when the stream fails.
    pub fn flush(&mut self) -> Result<(), FrameError> {
        self.inner.flush()?;
        Ok(())
    }
}
