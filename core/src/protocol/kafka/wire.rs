//! Wire primitives shared by the request/response codec and the metadata log
//! decoder.
//!
//! Flexible protocol versions (KIP-482) encode lengths as unsigned varints
//! holding `actual + 1`, so `0` is free to mean "null". Every structure may be
//! followed by a tagged-fields block: a varint count and that many
//! `(tag, size, bytes)` triples. None of the APIs served here define tags, so
//! readers only need to skip them correctly.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

pub const UUID_LEN: usize = 16;

/// Topic ids and log directory ids travel as raw 16-byte UUIDs.
pub type Uuid = [u8; UUID_LEN];

/// A 64-bit value never needs more than ten 7-bit groups.
const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("input truncated while reading {field}")]
    Truncated { field: &'static str },
    #[error("varint overflow while reading {field}")]
    Overflow { field: &'static str },
    #[error("invalid length {length} for {field}")]
    InvalidLength { field: &'static str, length: i64 },
    #[error("invalid UTF-8 in {field}")]
    InvalidString { field: &'static str },
}

impl WireError {
    fn with_field(self, field: &'static str) -> Self {
        match self {
            Self::Truncated { .. } => Self::Truncated { field },
            Self::Overflow { .. } => Self::Overflow { field },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, WireError>;

/// Decode an unsigned LEB128 varint, returning the value and the number of
/// bytes it occupied.
pub fn read_unsigned_varint(input: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in input.iter().enumerate() {
        if i == MAX_VARINT_LEN || (i == MAX_VARINT_LEN - 1 && byte > 1) {
            return Err(WireError::Overflow { field: "varint" });
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(WireError::Truncated { field: "varint" })
}

/// Decode a zig-zag encoded signed varint.
pub fn read_signed_varint(input: &[u8]) -> Result<(i64, usize)> {
    let (raw, read) = read_unsigned_varint(input)?;
    Ok((zigzag_decode(raw), read))
}

fn zigzag_decode(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn encode_unsigned_varint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

pub fn encode_signed_varint(buf: &mut BytesMut, value: i64) {
    encode_unsigned_varint(buf, zigzag_encode(value));
}

/// Compact arrays carry `len + 1`; `0` would mean a null array.
pub fn encode_compact_array_len(buf: &mut BytesMut, len: usize) {
    encode_unsigned_varint(buf, len as u64 + 1);
}

pub fn encode_compact_string(buf: &mut BytesMut, value: &str) {
    encode_compact_bytes(buf, value.as_bytes());
}

pub fn encode_compact_nullable_string(buf: &mut BytesMut, value: Option<&str>) {
    match value {
        Some(value) => encode_compact_string(buf, value),
        None => encode_unsigned_varint(buf, 0),
    }
}

pub fn encode_compact_bytes(buf: &mut BytesMut, value: &[u8]) {
    encode_unsigned_varint(buf, value.len() as u64 + 1);
    buf.extend_from_slice(value);
}

pub fn encode_empty_tagged_fields(buf: &mut BytesMut) {
    buf.put_u8(0);
}

/// Forward-only reader over a borrowed buffer.
///
/// Every getter checks the remaining length first and reports the field it
/// was reading, so malformed input surfaces as an error instead of a panic.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes read since construction.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn ensure(&self, needed: usize, field: &'static str) -> Result<()> {
        if self.buf.len() < needed {
            return Err(WireError::Truncated { field });
        }
        Ok(())
    }

    pub fn skip(&mut self, len: usize, field: &'static str) -> Result<()> {
        self.ensure(len, field)?;
        self.buf.advance(len);
        self.consumed += len;
        Ok(())
    }

    pub fn read_slice(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        self.ensure(len, field)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        self.consumed += len;
        Ok(head)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        self.ensure(1, field)?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    pub fn read_i8(&mut self, field: &'static str) -> Result<i8> {
        self.ensure(1, field)?;
        self.consumed += 1;
        Ok(self.buf.get_i8())
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        self.ensure(2, field)?;
        self.consumed += 2;
        Ok(self.buf.get_u16())
    }

    pub fn read_i16(&mut self, field: &'static str) -> Result<i16> {
        self.ensure(2, field)?;
        self.consumed += 2;
        Ok(self.buf.get_i16())
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        self.ensure(4, field)?;
        self.consumed += 4;
        Ok(self.buf.get_u32())
    }

    pub fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        self.ensure(4, field)?;
        self.consumed += 4;
        Ok(self.buf.get_i32())
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64> {
        self.ensure(8, field)?;
        self.consumed += 8;
        Ok(self.buf.get_i64())
    }

    pub fn read_uuid(&mut self, field: &'static str) -> Result<Uuid> {
        let mut id = [0u8; UUID_LEN];
        id.copy_from_slice(self.read_slice(UUID_LEN, field)?);
        Ok(id)
    }

    pub fn read_unsigned_varint(&mut self, field: &'static str) -> Result<u64> {
        let (value, read) = read_unsigned_varint(self.buf).map_err(|e| e.with_field(field))?;
        self.skip(read, field)?;
        Ok(value)
    }

    pub fn read_signed_varint(&mut self, field: &'static str) -> Result<i64> {
        let (value, read) = read_signed_varint(self.buf).map_err(|e| e.with_field(field))?;
        self.skip(read, field)?;
        Ok(value)
    }

    /// Skip a tagged-fields block. Tag values are never interpreted.
    pub fn read_tag_buffer(&mut self) -> Result<()> {
        let count = self.read_unsigned_varint("tagged fields count")?;
        for _ in 0..count {
            self.read_unsigned_varint("tag id")?;
            let size = self.read_unsigned_varint("tag size")?;
            let size = usize::try_from(size).map_err(|_| WireError::InvalidLength {
                field: "tag size",
                length: i64::try_from(size).unwrap_or(i64::MAX),
            })?;
            self.skip(size, "tag value")?;
        }
        Ok(())
    }

    /// Compact length prefix: `None` for the null marker, otherwise the
    /// decoded byte count, checked against what is left in the buffer.
    fn read_compact_len(&mut self, field: &'static str) -> Result<Option<usize>> {
        let raw = self.read_unsigned_varint(field)?;
        if raw == 0 {
            return Ok(None);
        }
        let len = raw - 1;
        if len > self.remaining() as u64 {
            return Err(WireError::InvalidLength {
                field,
                length: i64::try_from(len).unwrap_or(i64::MAX),
            });
        }
        Ok(Some(len as usize))
    }

    pub fn read_compact_nullable_bytes(
        &mut self,
        field: &'static str,
    ) -> Result<Option<&'a [u8]>> {
        match self.read_compact_len(field)? {
            Some(len) => self.read_slice(len, field).map(Some),
            None => Ok(None),
        }
    }

    /// Non-nullable compact bytes; the null marker reads as empty.
    pub fn read_compact_bytes(&mut self, field: &'static str) -> Result<&'a [u8]> {
        Ok(self.read_compact_nullable_bytes(field)?.unwrap_or_default())
    }

    pub fn read_compact_nullable_string(&mut self, field: &'static str) -> Result<Option<String>> {
        self.read_compact_nullable_bytes(field)?
            .map(|raw| utf8(raw, field))
            .transpose()
    }

    pub fn read_compact_string(&mut self, field: &'static str) -> Result<String> {
        utf8(self.read_compact_bytes(field)?, field)
    }
}

pub(crate) fn utf8(raw: &[u8], field: &'static str) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidString { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_varint_known_encodings() {
        assert_eq!(read_unsigned_varint(&[0x00]).unwrap(), (0, 1));
        assert_eq!(read_unsigned_varint(&[0x7f]).unwrap(), (127, 1));
        assert_eq!(read_unsigned_varint(&[0xac, 0x02]).unwrap(), (300, 2));
        // Trailing bytes are left alone.
        assert_eq!(read_unsigned_varint(&[0x01, 0xff]).unwrap(), (1, 1));

        let mut buf = BytesMut::new();
        encode_unsigned_varint(&mut buf, 300);
        assert_eq!(&buf[..], &[0xac, 0x02]);
    }

    #[test]
    fn test_signed_varint_zigzag() {
        assert_eq!(read_signed_varint(&[0x01]).unwrap(), (-1, 1));
        assert_eq!(read_signed_varint(&[0x02]).unwrap(), (1, 1));
        assert_eq!(read_signed_varint(&[0x7f]).unwrap(), (-64, 1));

        for value in [0i64, -1, 1, 63, -64, 64, 1 << 40, i64::MIN, i64::MAX] {
            let mut buf = BytesMut::new();
            encode_signed_varint(&mut buf, value);
            assert_eq!(read_signed_varint(&buf).unwrap(), (value, buf.len()));
        }
    }

    #[test]
    fn test_varint_truncated_and_overflow() {
        assert!(matches!(
            read_unsigned_varint(&[]),
            Err(WireError::Truncated { .. })
        ));
        assert!(matches!(
            read_unsigned_varint(&[0x80, 0x80]),
            Err(WireError::Truncated { .. })
        ));
        assert!(matches!(
            read_unsigned_varint(&[0xff; 11]),
            Err(WireError::Overflow { .. })
        ));
        let mut too_wide = [0xff; 10];
        too_wide[9] = 0x02;
        assert!(matches!(
            read_unsigned_varint(&too_wide),
            Err(WireError::Overflow { .. })
        ));
    }

    #[test]
    fn test_reader_names_field_on_truncation() {
        let mut reader = WireReader::new(&[0x00, 0x01]);
        let err = reader.read_i32("session_id").unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                field: "session_id"
            }
        );
        // Failed reads do not advance.
        assert_eq!(reader.consumed(), 0);
        assert_eq!(reader.read_u16("short").unwrap(), 1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_tag_buffer_skips_values() {
        // two tags: (id 0, 3 bytes), (id 5, 0 bytes), followed by a marker byte
        let data = [0x02, 0x00, 0x03, 0xaa, 0xbb, 0xcc, 0x05, 0x00, 0x7e];
        let mut reader = WireReader::new(&data);
        reader.read_tag_buffer().unwrap();
        assert_eq!(reader.consumed(), 8);
        assert_eq!(reader.read_u8("marker").unwrap(), 0x7e);

        let mut short = WireReader::new(&[0x01, 0x00, 0x04, 0xaa]);
        assert!(matches!(
            short.read_tag_buffer(),
            Err(WireError::Truncated { field: "tag value" })
        ));
    }

    #[test]
    fn test_compact_string_conventions() {
        let mut buf = BytesMut::new();
        encode_compact_string(&mut buf, "foo");
        encode_compact_nullable_string(&mut buf, None);
        encode_compact_string(&mut buf, "");
        assert_eq!(&buf[..], &[0x04, b'f', b'o', b'o', 0x00, 0x01]);

        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.read_compact_string("name").unwrap(), "foo");
        assert_eq!(reader.read_compact_nullable_string("txn").unwrap(), None);
        assert_eq!(
            reader.read_compact_nullable_string("txn").unwrap(),
            Some(String::new())
        );
        assert!(reader.is_empty());
    }

    #[test]
    fn test_compact_length_past_end_is_rejected() {
        let mut reader = WireReader::new(&[0x05, b'a', b'b']);
        assert_eq!(
            reader.read_compact_bytes("records").unwrap_err(),
            WireError::InvalidLength {
                field: "records",
                length: 4
            }
        );
    }

    #[test]
    fn test_compact_string_rejects_invalid_utf8() {
        let mut reader = WireReader::new(&[0x02, 0xff]);
        assert_eq!(
            reader.read_compact_string("name").unwrap_err(),
            WireError::InvalidString { field: "name" }
        );
    }
}
