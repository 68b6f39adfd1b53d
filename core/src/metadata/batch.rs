//! Record batch framing of the metadata log.
//!
//! ```text
//! RecordBatch => base_offset:int64 batch_length:int32 partition_leader_epoch:int32
//!                magic:int8 crc:uint32 attributes:int16 last_offset_delta:int32
//!                base_timestamp:int64 max_timestamp:int64 producer_id:int64
//!                producer_epoch:int16 base_sequence:int32 records_count:int32
//!                records
//! ```
//!
//! CRCs are carried through but never verified, and compressed batches are
//! not supported.

use bytes::{BufMut, Bytes, BytesMut};

use super::record::Record;
use super::{MetadataLogError, Result};
use crate::protocol::kafka::wire::WireReader;

/// Fixed header size, records count included.
pub const RECORD_BATCH_HEADER_LEN: usize = 61;

/// base_offset(8) + batch_length(4); not covered by `batch_length`.
const LENGTH_PREFIX_LEN: usize = 12;

/// Bytes covered by `batch_length` that precede the records
/// (everything after the length field itself).
const BATCH_LENGTH_OVERHEAD: usize = RECORD_BATCH_HEADER_LEN - LENGTH_PREFIX_LEN;

const CURRENT_MAGIC: i8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatch {
    pub base_offset: i64,
    pub batch_length: i32,
    pub partition_leader_epoch: i32,
    pub magic: i8,
    pub crc: u32,
    pub attributes: i16,
    pub last_offset_delta: i32,
    pub base_timestamp: i64,
    pub max_timestamp: i64,
    pub producer_id: i64,
    pub producer_epoch: i16,
    pub base_sequence: i32,
    pub records: Vec<Record>,
}

impl RecordBatch {
    /// A non-transactional batch with `batch_length` filled in.
    pub fn new(base_offset: i64, records: Vec<Record>) -> Self {
        let mut batch = Self {
            base_offset,
            batch_length: 0,
            partition_leader_epoch: 0,
            magic: CURRENT_MAGIC,
            crc: 0,
            attributes: 0,
            last_offset_delta: records.len().saturating_sub(1) as i32,
            base_timestamp: 0,
            max_timestamp: 0,
            producer_id: -1,
            producer_epoch: -1,
            base_sequence: -1,
            records,
        };
        batch.batch_length = (BATCH_LENGTH_OVERHEAD + batch.encode_records().len()) as i32;
        batch
    }

    /// Decode one batch from the front of `input`, returning it with the
    /// number of bytes it occupied.
    pub fn decode(input: &[u8]) -> Result<(Self, usize)> {
        if input.len() < RECORD_BATCH_HEADER_LEN {
            return Err(MetadataLogError::TruncatedBatch {
                available: input.len(),
            });
        }

        let mut reader = WireReader::new(input);
        let base_offset = reader.read_i64("base offset")?;
        let batch_length = reader.read_i32("batch length")?;
        // A batch may not claim bytes past the end of the input.
        if batch_length < 0 || batch_length as usize > input.len() - LENGTH_PREFIX_LEN {
            return Err(MetadataLogError::InvalidBatchSize { batch_length });
        }
        let partition_leader_epoch = reader.read_i32("partition leader epoch")?;
        let magic = reader.read_i8("magic")?;
        let crc = reader.read_u32("crc")?;
        let attributes = reader.read_i16("attributes")?;
        let last_offset_delta = reader.read_i32("last offset delta")?;
        let base_timestamp = reader.read_i64("base timestamp")?;
        let max_timestamp = reader.read_i64("max timestamp")?;
        let producer_id = reader.read_i64("producer id")?;
        let producer_epoch = reader.read_i16("producer epoch")?;
        let base_sequence = reader.read_i32("base sequence")?;
        let records_count = reader.read_i32("records count")?;
        if records_count < 0 {
            return Err(MetadataLogError::InvalidRecordsCount(records_count));
        }

        let mut records = Vec::with_capacity((records_count as usize).min(reader.remaining()));
        for _ in 0..records_count {
            records.push(Record::decode(&mut reader)?);
        }

        let batch = Self {
            base_offset,
            batch_length,
            partition_leader_epoch,
            magic,
            crc,
            attributes,
            last_offset_delta,
            base_timestamp,
            max_timestamp,
            producer_id,
            producer_epoch,
            base_sequence,
            records,
        };
        Ok((batch, reader.consumed()))
    }

    fn encode_records(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        for (offset_delta, record) in self.records.iter().enumerate() {
            record.encode(offset_delta as i32, &mut buf);
        }
        buf
    }

    /// Encode header and records. `batch_length` and the records count are
    /// derived from the records; the stored `batch_length` is ignored.
    pub fn encode(&self, buf: &mut BytesMut) {
        let records = self.encode_records();
        buf.reserve(RECORD_BATCH_HEADER_LEN + records.len());
        buf.put_i64(self.base_offset);
        buf.put_i32((BATCH_LENGTH_OVERHEAD + records.len()) as i32);
        buf.put_i32(self.partition_leader_epoch);
        buf.put_i8(self.magic);
        buf.put_u32(self.crc);
        buf.put_i16(self.attributes);
        buf.put_i32(self.last_offset_delta);
        buf.put_i64(self.base_timestamp);
        buf.put_i64(self.max_timestamp);
        buf.put_i64(self.producer_id);
        buf.put_i16(self.producer_epoch);
        buf.put_i32(self.base_sequence);
        buf.put_i32(self.records.len() as i32);
        buf.extend_from_slice(&records);
    }
}

/// Decode a whole metadata log into its batches, in file order.
pub fn decode(raw: &[u8]) -> Result<Vec<RecordBatch>> {
    let mut batches = Vec::new();
    let mut rest = raw;
    while !rest.is_empty() {
        let (batch, consumed) = RecordBatch::decode(rest)?;
        rest = &rest[consumed..];
        batches.push(batch);
    }
    Ok(batches)
}

/// Encode batches back to back, as they appear in a log segment.
pub fn encode(batches: &[RecordBatch]) -> Bytes {
    let mut buf = BytesMut::new();
    for batch in batches {
        batch.encode(&mut buf);
    }
    buf.freeze()
}
