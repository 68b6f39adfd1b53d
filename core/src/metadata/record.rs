//! Records inside a metadata log batch and their typed payloads.
//!
//! ```text
//! Record => length:varint attributes:int8 timestamp_delta:varlong
//!           offset_delta:varint key_length:varint key value_length:varint
//!           value headers_count:uvarint
//! Value  => frame_version:uint8 type:uint8 payload
//! ```
//!
//! Only three payload types matter for building topic metadata. Everything
//! else decodes to [`RecordValue::Unknown`] and is skipped by the index.

use bytes::{BufMut, BytesMut};

use super::{MetadataLogError, Result};
use crate::protocol::kafka::wire::{
    encode_signed_varint, encode_unsigned_varint, Uuid, WireError, WireReader,
};

pub const FEATURE_LEVEL_RECORD_TYPE: u8 = 12;
pub const TOPIC_RECORD_TYPE: u8 = 2;
pub const PARTITION_RECORD_TYPE: u8 = 3;

const DEFAULT_FRAME_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub attributes: i8,
    pub value: RecordValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    FeatureLevel(FeatureLevelRecord),
    Topic(TopicRecord),
    Partition(PartitionRecord),
    Unknown { frame_version: u8, type_id: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLevelRecord {
    pub frame_version: u8,
    pub version: u8,
    pub name: String,
    pub feature_level: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord {
    pub frame_version: u8,
    pub version: u8,
    pub name: String,
    pub topic_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRecord {
    pub frame_version: u8,
    pub version: u8,
    pub partition_id: i32,
    pub topic_id: Uuid,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
    pub removing_replicas: Vec<i32>,
    pub adding_replicas: Vec<i32>,
    pub leader: i32,
    pub leader_epoch: i32,
    pub partition_epoch: i32,
    pub directories: Vec<Uuid>,
}

impl Record {
    pub fn new(value: RecordValue) -> Self {
        Self {
            attributes: 0,
            value,
        }
    }

    /// Decode one record. The reader ends up exactly past the record's
    /// trailing headers count; the leading length varint is not checked
    /// against what was actually consumed.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        reader.read_signed_varint("record length")?;
        let attributes = reader.read_i8("record attributes")?;
        reader.read_signed_varint("timestamp delta")?;
        reader.read_signed_varint("offset delta")?;

        let key_length = reader.read_signed_varint("key length")?;
        if key_length != -1 {
            let len = usize::try_from(key_length).map_err(|_| WireError::InvalidLength {
                field: "key",
                length: key_length,
            })?;
            reader.skip(len, "key")?;
        }

        let value_length = reader.read_signed_varint("value length")?;
        if value_length < 0 {
            return Err(MetadataLogError::NegativeValueLength(value_length));
        }
        let len = usize::try_from(value_length).map_err(|_| WireError::InvalidLength {
            field: "value",
            length: value_length,
        })?;
        let value = RecordValue::decode(reader.read_slice(len, "value")?)?;

        reader.read_unsigned_varint("headers count")?;

        Ok(Self { attributes, value })
    }

    /// Encode with zero timestamp delta, no key and no headers.
    pub fn encode(&self, offset_delta: i32, buf: &mut BytesMut) {
        let mut value = BytesMut::new();
        self.value.encode(&mut value);

        let mut body = BytesMut::with_capacity(value.len() + 8);
        body.put_i8(self.attributes);
        encode_signed_varint(&mut body, 0);
        encode_signed_varint(&mut body, i64::from(offset_delta));
        encode_signed_varint(&mut body, -1);
        encode_signed_varint(&mut body, value.len() as i64);
        body.extend_from_slice(&value);
        encode_unsigned_varint(&mut body, 0);

        encode_signed_varint(buf, body.len() as i64);
        buf.extend_from_slice(&body);
    }
}

impl RecordValue {
    pub fn decode(value: &[u8]) -> Result<Self> {
        let mut reader = WireReader::new(value);
        let frame_version = reader.read_u8("frame version")?;
        let type_id = reader.read_u8("record type")?;

        let value = match type_id {
            FEATURE_LEVEL_RECORD_TYPE => {
                RecordValue::FeatureLevel(decode_feature_level(frame_version, &mut reader)?)
            }
            TOPIC_RECORD_TYPE => RecordValue::Topic(decode_topic(frame_version, &mut reader)?),
            PARTITION_RECORD_TYPE => {
                RecordValue::Partition(decode_partition(frame_version, &mut reader)?)
            }
            type_id => RecordValue::Unknown {
                frame_version,
                type_id,
            },
        };
        Ok(value)
    }

    pub fn type_id(&self) -> u8 {
        match self {
            RecordValue::FeatureLevel(_) => FEATURE_LEVEL_RECORD_TYPE,
            RecordValue::Topic(_) => TOPIC_RECORD_TYPE,
            RecordValue::Partition(_) => PARTITION_RECORD_TYPE,
            RecordValue::Unknown { type_id, .. } => *type_id,
        }
    }

    pub fn frame_version(&self) -> u8 {
        match self {
            RecordValue::FeatureLevel(r) => r.frame_version,
            RecordValue::Topic(r) => r.frame_version,
            RecordValue::Partition(r) => r.frame_version,
            RecordValue::Unknown { frame_version, .. } => *frame_version,
        }
    }

    /// `Unknown` values encode as their two header bytes only.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.frame_version());
        buf.put_u8(self.type_id());
        match self {
            RecordValue::FeatureLevel(r) => {
                buf.put_u8(r.version);
                put_short_name(buf, &r.name);
                buf.put_i16(r.feature_level);
                buf.put_u8(0);
            }
            RecordValue::Topic(r) => {
                buf.put_u8(r.version);
                put_short_name(buf, &r.name);
                buf.put_slice(&r.topic_id);
                buf.put_u8(0);
            }
            RecordValue::Partition(r) => {
                buf.put_u8(r.version);
                buf.put_i32(r.partition_id);
                buf.put_slice(&r.topic_id);
                put_i32_array(buf, &r.replicas);
                put_i32_array(buf, &r.isr);
                put_i32_array(buf, &r.removing_replicas);
                put_i32_array(buf, &r.adding_replicas);
                buf.put_i32(r.leader);
                buf.put_i32(r.leader_epoch);
                buf.put_i32(r.partition_epoch);
                buf.put_u8(r.directories.len() as u8 + 1);
                for dir in &r.directories {
                    buf.put_slice(dir);
                }
                buf.put_u8(0);
            }
            RecordValue::Unknown { .. } => {}
        }
    }
}

impl TopicRecord {
    pub fn new(name: impl Into<String>, topic_id: Uuid) -> Self {
        Self {
            frame_version: DEFAULT_FRAME_VERSION,
            version: 0,
            name: name.into(),
            topic_id,
        }
    }
}

impl PartitionRecord {
    /// Single-replica partition led by `leader`.
    pub fn new(topic_id: Uuid, partition_id: i32, leader: i32) -> Self {
        Self {
            frame_version: DEFAULT_FRAME_VERSION,
            version: 1,
            partition_id,
            topic_id,
            replicas: vec![leader],
            isr: vec![leader],
            removing_replicas: Vec::new(),
            adding_replicas: Vec::new(),
            leader,
            leader_epoch: 0,
            partition_epoch: 0,
            directories: Vec::new(),
        }
    }
}

impl FeatureLevelRecord {
    pub fn new(name: impl Into<String>, feature_level: i16) -> Self {
        Self {
            frame_version: DEFAULT_FRAME_VERSION,
            version: 0,
            name: name.into(),
            feature_level,
        }
    }
}

// Names use a one-byte `len + 1` prefix. The subtraction wraps, so a zero
// byte claims 255 bytes and normally fails as truncated.
fn read_short_name(reader: &mut WireReader<'_>, field: &'static str) -> Result<String> {
    let len = reader.read_u8("name length")?.wrapping_sub(1);
    let raw = reader.read_slice(usize::from(len), field)?;
    Ok(String::from_utf8_lossy(raw).into_owned())
}

fn put_short_name(buf: &mut BytesMut, name: &str) {
    buf.put_u8(name.len() as u8 + 1);
    buf.put_slice(name.as_bytes());
}

/// One-byte `len + 1` count; a zero byte is treated as an empty array.
fn read_array_len(reader: &mut WireReader<'_>, field: &'static str) -> Result<usize> {
    Ok(usize::from(reader.read_u8(field)?.saturating_sub(1)))
}

fn read_i32_array(reader: &mut WireReader<'_>, field: &'static str) -> Result<Vec<i32>> {
    let len = read_array_len(reader, field)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(reader.read_i32(field)?);
    }
    Ok(values)
}

fn put_i32_array(buf: &mut BytesMut, values: &[i32]) {
    buf.put_u8(values.len() as u8 + 1);
    for value in values {
        buf.put_i32(*value);
    }
}

fn decode_feature_level(
    frame_version: u8,
    reader: &mut WireReader<'_>,
) -> Result<FeatureLevelRecord> {
    let version = reader.read_u8("feature level version")?;
    let name = read_short_name(reader, "feature name")?;
    let feature_level = reader.read_i16("feature level")?;
    reader.read_u8("tagged fields count")?;
    Ok(FeatureLevelRecord {
        frame_version,
        version,
        name,
        feature_level,
    })
}

fn decode_topic(frame_version: u8, reader: &mut WireReader<'_>) -> Result<TopicRecord> {
    let version = reader.read_u8("topic record version")?;
    let name = read_short_name(reader, "topic name")?;
    let topic_id = reader.read_uuid("topic id")?;
    reader.read_u8("tagged fields count")?;
    Ok(TopicRecord {
        frame_version,
        version,
        name,
        topic_id,
    })
}

fn decode_partition(frame_version: u8, reader: &mut WireReader<'_>) -> Result<PartitionRecord> {
    let version = reader.read_u8("partition record version")?;
    let partition_id = reader.read_i32("partition id")?;
    let topic_id = reader.read_uuid("topic id")?;
    let replicas = read_i32_array(reader, "replicas")?;
    let isr = read_i32_array(reader, "isr")?;
    let removing_replicas = read_i32_array(reader, "removing replicas")?;
    let adding_replicas = read_i32_array(reader, "adding replicas")?;
    let leader = reader.read_i32("leader")?;
    let leader_epoch = reader.read_i32("leader epoch")?;
    let partition_epoch = reader.read_i32("partition epoch")?;

    let dir_count = read_array_len(reader, "directories")?;
    let mut directories = Vec::with_capacity(dir_count);
    for _ in 0..dir_count {
        directories.push(reader.read_uuid("directories")?);
    }
    reader.read_u8("tagged fields count")?;

    Ok(PartitionRecord {
        frame_version,
        version,
        partition_id,
        topic_id,
        replicas,
        isr,
        removing_replicas,
        adding_replicas,
        leader,
        leader_epoch,
        partition_epoch,
        directories,
    })
}
