//! Tagged binary field codec for cluster request/response messages.
//!
//! A message body is a flat sequence of `(tag, value)` fields. Tags are
//! one-byte identifiers assigned by each concrete message type; the value
//! encoding depends on the declared field kind (64-bit integer, 32-bit
//! integer, UTF-8 string, raw byte run, or a nested [`WireRecord`]).
//! Decoding is tag-driven, not position-driven: readers loop over
//! [`FieldReader::next_tag`] until the stream is exhausted and dispatch each
//! tag themselves, so field order on the wire is never assumed.
//!
//! # Wire format
//!
//! Scalars are big-endian. Strings and byte runs are prefixed by an i32
//! length. Record sequences are written as an i32 count field followed by
//! that many records back to back, each record solely responsible for its
//! own byte layout.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Errors raised while encoding or decoding a wire message.
///
/// Every variant is fatal to the single message being processed: the caller
/// must treat the in-flight request as failed and surface a transport-level
/// failure rather than retry at this layer.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The stream ended before a complete value could be read.
    #[error("truncated stream: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A string field did not contain valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A tag outside the concrete message type's known set was encountered.
    #[error("unrecognized tag {tag} while decoding {message}")]
    UnrecognizedTag { tag: u8, message: &'static str },

    /// The body ended without carrying a field the message type requires.
    #[error("missing required field {field} while decoding {message}")]
    MissingField {
        field: &'static str,
        message: &'static str,
    },

    /// Encode-time internal-consistency failure: a sequence declared one
    /// size but iteration produced a different number of records. Indicates
    /// a programming defect; the encode is aborted before any bytes reach
    /// the transport.
    #[error("sequence declared {declared} records but iteration produced {written}")]
    CountMismatch { declared: usize, written: usize },

    /// A length or count prefix was negative or exceeds what the wire
    /// representation can carry.
    #[error("invalid length prefix: {length}")]
    InvalidLength { length: i64 },

    /// A nested value carried an unknown kind marker.
    #[error("unknown value kind marker {marker}")]
    UnknownValueKind { marker: u8 },
}

/// A value that knows how to write itself into, and read itself back from,
/// a message body. Used for the "nested serializable" field kind: richer
/// records whose byte layout the codec does not interpret.
pub trait WireRecord: Sized {
    /// Appends this record's wire representation to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidLength`] if a variable-length component
    /// exceeds the i32 length prefix.
    fn serialize_to(&self, out: &mut BytesMut) -> Result<(), WireError>;

    /// Reads one record from the front of `buf`, advancing it.
    ///
    /// # Errors
    ///
    /// Returns a [`WireError`] if the buffer is truncated or malformed.
    fn deserialize_from(buf: &mut Bytes) -> Result<Self, WireError>;
}

// ---------------------------------------------------------------------------
// Raw value helpers
// ---------------------------------------------------------------------------
// Shared by the field writer/reader and by WireRecord impls, which write
// their components raw (untagged) inside their own payload.

/// Appends an i32-length-prefixed byte run.
///
/// # Errors
///
/// Returns [`WireError::InvalidLength`] if `data` is longer than `i32::MAX`.
pub fn put_raw(out: &mut BytesMut, data: &[u8]) -> Result<(), WireError> {
    let len = i32::try_from(data.len()).map_err(|_| WireError::InvalidLength {
        length: i64::try_from(data.len()).unwrap_or(i64::MAX),
    })?;
    out.put_i32(len);
    out.put_slice(data);
    Ok(())
}

/// Appends an i32-length-prefixed UTF-8 string.
///
/// # Errors
///
/// Returns [`WireError::InvalidLength`] if the string is longer than
/// `i32::MAX` bytes.
pub fn put_str(out: &mut BytesMut, value: &str) -> Result<(), WireError> {
    put_raw(out, value.as_bytes())
}

fn take(buf: &mut Bytes, needed: usize) -> Result<Bytes, WireError> {
    if buf.remaining() < needed {
        return Err(WireError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(buf.split_to(needed))
}

fn ensure(buf: &Bytes, needed: usize) -> Result<(), WireError> {
    if buf.remaining() < needed {
        return Err(WireError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Reads one byte.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] if the buffer is empty.
pub fn get_u8(buf: &mut Bytes) -> Result<u8, WireError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

/// Reads a big-endian i32.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] if fewer than four bytes remain.
pub fn get_i32(buf: &mut Bytes) -> Result<i32, WireError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

/// Reads a big-endian i64.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] if fewer than eight bytes remain.
pub fn get_i64(buf: &mut Bytes) -> Result<i64, WireError> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

/// Reads a big-endian u64 (used for raw bit patterns, e.g. float bits).
///
/// # Errors
///
/// Returns [`WireError::Truncated`] if fewer than eight bytes remain.
pub fn get_u64(buf: &mut Bytes) -> Result<u64, WireError> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

/// Reads an i32-length-prefixed byte run.
///
/// # Errors
///
/// Returns [`WireError::InvalidLength`] for a negative prefix, or
/// [`WireError::Truncated`] if the run extends past the end of the buffer.
pub fn get_raw(buf: &mut Bytes) -> Result<Bytes, WireError> {
    let len = get_i32(buf)?;
    let len = usize::try_from(len).map_err(|_| WireError::InvalidLength {
        length: i64::from(len),
    })?;
    take(buf, len)
}

/// Reads an i32-length-prefixed UTF-8 string.
///
/// # Errors
///
/// As [`get_raw`], plus [`WireError::InvalidUtf8`] for malformed UTF-8.
pub fn get_str(buf: &mut Bytes) -> Result<String, WireError> {
    let raw = get_raw(buf)?;
    Ok(String::from_utf8(raw.to_vec())?)
}

/// Reads a non-negative i32 count prefix as a `usize`.
///
/// The count is additionally bounded by the bytes remaining in the buffer:
/// every record occupies at least one byte, so a larger count can only come
/// from a corrupt or truncated stream and would otherwise drive an
/// attacker-controlled allocation.
///
/// # Errors
///
/// Returns [`WireError::InvalidLength`] for a negative count or
/// [`WireError::Truncated`] if the count exceeds the remaining bytes.
pub fn get_count(buf: &mut Bytes) -> Result<usize, WireError> {
    let count = get_i32(buf)?;
    let count = usize::try_from(count).map_err(|_| WireError::InvalidLength {
        length: i64::from(count),
    })?;
    if count > buf.remaining() {
        return Err(WireError::Truncated {
            needed: count,
            remaining: buf.remaining(),
        });
    }
    Ok(count)
}

// ---------------------------------------------------------------------------
// FieldWriter
// ---------------------------------------------------------------------------

/// Appends tagged fields to a message body under construction.
///
/// One writer per message encode; concurrent encodes of distinct messages
/// never share mutable state.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: BytesMut,
}

impl FieldWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Appends a 64-bit integer field.
    pub fn put_i64(&mut self, tag: u8, value: i64) {
        self.buf.put_u8(tag);
        self.buf.put_i64(value);
    }

    /// Appends a 32-bit integer field.
    pub fn put_i32(&mut self, tag: u8, value: i32) {
        self.buf.put_u8(tag);
        self.buf.put_i32(value);
    }

    /// Appends a UTF-8 string field.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidLength`] if the string exceeds the i32
    /// length prefix.
    pub fn put_string(&mut self, tag: u8, value: &str) -> Result<(), WireError> {
        self.buf.put_u8(tag);
        put_str(&mut self.buf, value)
    }

    /// Appends a raw length-prefixed byte run field.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidLength`] if the run exceeds the i32
    /// length prefix.
    pub fn put_bytes(&mut self, tag: u8, value: &[u8]) -> Result<(), WireError> {
        self.buf.put_u8(tag);
        put_raw(&mut self.buf, value)
    }

    /// Appends a record-sequence field: an i32 count followed by each record
    /// in iteration order, serialized by the record itself.
    ///
    /// The number of records the iterator yields must equal `declared`; a
    /// mismatch is an internal-consistency failure and aborts the encode.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::CountMismatch`] if iteration produced a
    /// different number of records than declared, or propagates record
    /// serialization errors.
    pub fn put_record_sequence<'a, R, I>(
        &mut self,
        tag: u8,
        declared: usize,
        records: I,
    ) -> Result<(), WireError>
    where
        R: WireRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let count = i32::try_from(declared).map_err(|_| WireError::InvalidLength {
            length: i64::try_from(declared).unwrap_or(i64::MAX),
        })?;
        self.put_i32(tag, count);

        let mut written = 0usize;
        for record in records {
            record.serialize_to(&mut self.buf)?;
            written += 1;
        }
        if written != declared {
            return Err(WireError::CountMismatch { declared, written });
        }
        Ok(())
    }

    /// Consumes the writer, yielding the finished message body.
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

// ---------------------------------------------------------------------------
// FieldReader
// ---------------------------------------------------------------------------

/// Consumes a message body as a sequence of tagged fields.
///
/// Drive it with a loop over [`FieldReader::next_tag`], dispatching each tag
/// to the matching typed read. Interpreting a tag is the concrete message
/// type's job; a tag it does not know is a protocol error, never silently
/// skipped.
#[derive(Debug)]
pub struct FieldReader {
    buf: Bytes,
}

impl FieldReader {
    /// Wraps a complete message body for reading.
    #[must_use]
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Returns the next field tag, or `None` once the stream is exhausted.
    pub fn next_tag(&mut self) -> Option<u8> {
        if self.buf.has_remaining() {
            Some(self.buf.get_u8())
        } else {
            None
        }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Reads a 64-bit integer value.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Truncated`] if the stream ends early.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        get_i64(&mut self.buf)
    }

    /// Reads a 32-bit integer value.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Truncated`] if the stream ends early.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        get_i32(&mut self.buf)
    }

    /// Reads a sequence count prefix.
    ///
    /// # Errors
    ///
    /// As [`get_count`].
    pub fn read_count(&mut self) -> Result<usize, WireError> {
        get_count(&mut self.buf)
    }

    /// Reads a UTF-8 string value.
    ///
    /// # Errors
    ///
    /// As [`get_str`].
    pub fn read_string(&mut self) -> Result<String, WireError> {
        get_str(&mut self.buf)
    }

    /// Reads a raw length-prefixed byte run.
    ///
    /// # Errors
    ///
    /// As [`get_raw`].
    pub fn read_bytes(&mut self) -> Result<Bytes, WireError> {
        get_raw(&mut self.buf)
    }

    /// Reads one nested record via its own deserialization routine.
    ///
    /// # Errors
    ///
    /// Propagates the record's [`WireError`].
    pub fn read_record<R: WireRecord>(&mut self) -> Result<R, WireError> {
        R::deserialize_from(&mut self.buf)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
