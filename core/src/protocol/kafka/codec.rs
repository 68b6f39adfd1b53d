//! Kafka Wire Protocol Codec
//!
//! Server-side decoding of request frames and encoding of response frames.
//!
//! - All integers are big-endian
//! - Compact arrays, strings and bytes carry `length + 1` as an unsigned varint
//! - Every response except ApiVersions uses the flexible header (v1), which
//!   appends an empty tag buffer after the correlation id
//!
//! Request frames are handed to [`KafkaCodec::decode_request`] with their
//! 4-byte size prefix still attached; [`KafkaCodec::encode_response`] returns a
//! complete frame including the prefix.

use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use super::messages::*;
use super::wire::{
    self, encode_compact_array_len, encode_compact_bytes, encode_compact_string,
    encode_empty_tagged_fields, encode_unsigned_varint, WireError, WireReader,
};
use super::{
    API_KEY_API_VERSIONS, API_KEY_DESCRIBE_TOPIC_PARTITIONS, API_KEY_FETCH, API_KEY_PRODUCE,
};

/// size(4) + api_key(2) + api_version(2) + correlation_id(4)
pub const REQUEST_HEADER_LEN: usize = 12;

pub const DEFAULT_MAX_FRAME_BYTES: usize = 100_000_000;

/// DescribeTopicPartitions never paginates; the cursor is always null.
const NULL_CURSOR: u8 = 0xff;

#[derive(Debug, Error)]
pub enum KafkaCodecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("request header too short: {available} bytes")]
    HeaderTooShort { available: usize },
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
    #[error("invalid count {count} for {field}")]
    InvalidCount { field: &'static str, count: i64 },
    #[error("unsupported response body for api key {0}")]
    UnsupportedBody(u16),
    #[error("invalid frame length: {0}")]
    InvalidFrameLength(i32),
    #[error("frame of {length} bytes exceeds limit of {max}")]
    FrameTooLarge { length: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, KafkaCodecError>;

/// Kafka protocol codec for the broker side of a connection
pub struct KafkaCodec;

impl KafkaCodec {
    /// Decode a complete request frame, size prefix included.
    ///
    /// Unknown api keys decode to [`RequestBody::ApiVersions`] so the client
    /// always receives a version catalogue.
    pub fn decode_request(data: &[u8]) -> Result<RequestEnvelope> {
        if data.len() < REQUEST_HEADER_LEN {
            return Err(KafkaCodecError::HeaderTooShort {
                available: data.len(),
            });
        }

        let mut reader = WireReader::new(data);
        let declared_size = reader.read_u32("message_size")?;
        let api_key = reader.read_u16("api_key")?;
        let api_version = reader.read_u16("api_version")?;
        let correlation_id = reader.read_u32("correlation_id")?;

        trace!(
            api_key,
            api_version,
            correlation_id,
            payload_len = reader.remaining(),
            "Decoding request"
        );

        let (client_id, body) = match api_key {
            API_KEY_DESCRIBE_TOPIC_PARTITIONS => {
                let client_id = Self::read_client_id(&mut reader)?;
                reader.skip(1, "header tagged fields")?;
                let body = Self::decode_describe_topic_partitions(&mut reader)?;
                (client_id, RequestBody::DescribeTopicPartitions(body))
            }
            API_KEY_FETCH => {
                let client_id = Self::read_client_id(&mut reader)?;
                reader.skip(1, "header tagged fields")?;
                let body = Self::decode_fetch(&mut reader)?;
                (client_id, RequestBody::Fetch(body))
            }
            API_KEY_PRODUCE => {
                let client_id = Self::read_client_id(&mut reader)?;
                reader.read_tag_buffer()?;
                let body = Self::decode_produce(&mut reader)?;
                (client_id, RequestBody::Produce(body))
            }
            other => {
                if other != API_KEY_API_VERSIONS {
                    debug!(
                        api_key = other,
                        "Unrecognised api key, answering with ApiVersions"
                    );
                }
                let client_id = Self::read_client_id(&mut reader).unwrap_or_default();
                (client_id, RequestBody::ApiVersions)
            }
        };

        Ok(RequestEnvelope {
            declared_size,
            api_key,
            api_version,
            correlation_id,
            client_id,
            body,
        })
    }

    /// Nullable int16-prefixed client id; a negative length means absent.
    fn read_client_id(reader: &mut WireReader<'_>) -> Result<Bytes> {
        let len = reader.read_i16("client_id length")?;
        if len < 0 {
            return Ok(Bytes::new());
        }
        let raw = reader.read_slice(len as usize, "client_id")?;
        Ok(Bytes::copy_from_slice(raw))
    }

    // ========================================================================
    // DESCRIBE TOPIC PARTITIONS REQUEST
    // ========================================================================

    fn decode_describe_topic_partitions(
        reader: &mut WireReader<'_>,
    ) -> Result<DescribeTopicPartitionsRequest> {
        let count = single_byte_length(reader, "topics count")?;
        let mut topics = Vec::with_capacity(count);
        for _ in 0..count {
            let name_len = single_byte_length(reader, "topic name length")?;
            let name = wire::utf8(reader.read_slice(name_len, "topic name")?, "topic name")?;
            reader.skip(1, "topic tagged fields")?;
            topics.push(DescribeTopicRequest { name });
        }

        if reader.remaining() >= 4 {
            reader.skip(4, "response_partition_limit")?;
        }
        let cursor = if reader.is_empty() {
            -1
        } else {
            reader.read_i8("cursor")?
        };

        Ok(DescribeTopicPartitionsRequest { topics, cursor })
    }

    // ========================================================================
    // FETCH REQUEST
    // ========================================================================

    fn decode_fetch(reader: &mut WireReader<'_>) -> Result<FetchRequest> {
        let max_wait_ms = reader.read_i32("max_wait_ms")?;
        let min_bytes = reader.read_i32("min_bytes")?;
        let max_bytes = reader.read_i32("max_bytes")?;
        let isolation_level = reader.read_i8("isolation_level")?;
        let session_id = reader.read_i32("session_id")?;
        let session_epoch = reader.read_i32("session_epoch")?;

        // Compact count; only the first topic id is ever served.
        let raw_count = reader.read_unsigned_varint("topics count")?;
        let mut topics = Vec::new();
        if raw_count > 1 {
            let topic_id = reader.read_uuid("topic_id")?;
            topics.push(FetchTopicRequest { topic_id });
        }

        Ok(FetchRequest {
            max_wait_ms,
            min_bytes,
            max_bytes,
            isolation_level,
            session_id,
            session_epoch,
            topics,
        })
    }

    // ========================================================================
    // PRODUCE REQUEST
    // ========================================================================

    fn decode_produce(reader: &mut WireReader<'_>) -> Result<ProduceRequest> {
        reader.read_compact_nullable_bytes("transactional_id")?;
        reader.skip(2, "acks")?;
        reader.skip(4, "timeout_ms")?;

        let topic_count = compact_count(reader.read_unsigned_varint("topics count")?);
        let mut topics = Vec::with_capacity(topic_count.min(reader.remaining()));
        for _ in 0..topic_count {
            let name = reader.read_compact_string("topic name")?;
            let partition_count = compact_count(reader.read_unsigned_varint("partitions count")?);
            let mut partitions = Vec::with_capacity(partition_count.min(reader.remaining()));
            for _ in 0..partition_count {
                let index = reader.read_i32("partition index")?;
                let records = Bytes::copy_from_slice(reader.read_compact_bytes("records")?);
                reader.read_tag_buffer()?;
                partitions.push(ProducePartitionRequest { index, records });
            }
            reader.read_tag_buffer()?;
            topics.push(ProduceTopicRequest { name, partitions });
        }

        Ok(ProduceRequest { topics })
    }

    /// Encode a response into a complete frame: `[u32 size][header][body]`,
    /// where size excludes its own four bytes.
    pub fn encode_response(response: &ResponseEnvelope) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(128);
        buf.put_u32(0);
        buf.put_u32(response.correlation_id);
        if response.body.has_flexible_header() {
            encode_empty_tagged_fields(&mut buf);
        }

        match &response.body {
            ResponseBody::ApiVersions(body) => Self::encode_api_versions(body, &mut buf),
            ResponseBody::DescribeTopicPartitions(body) => {
                Self::encode_describe_topic_partitions(body, &mut buf)
            }
            ResponseBody::Fetch(body) => Self::encode_fetch(body, &mut buf),
            ResponseBody::Produce(body) => Self::encode_produce(body, &mut buf),
        }

        let payload_len = buf.len() - 4;
        let size = u32::try_from(payload_len).map_err(|_| KafkaCodecError::FrameTooLarge {
            length: payload_len,
            max: u32::MAX as usize,
        })?;
        buf[..4].copy_from_slice(&size.to_be_bytes());

        trace!(
            correlation_id = response.correlation_id,
            api_key = response.body.api_key(),
            size,
            "Encoded response"
        );
        Ok(buf.freeze())
    }

    fn encode_api_versions(body: &ApiVersionsResponse, buf: &mut BytesMut) {
        buf.put_i16(body.error_code);
        encode_compact_array_len(buf, body.api_keys.len());
        for api in &body.api_keys {
            buf.put_u16(api.api_key);
            buf.put_u16(api.min_version);
            buf.put_u16(api.max_version);
            encode_empty_tagged_fields(buf);
        }
        buf.put_i32(body.throttle_time_ms);
        encode_empty_tagged_fields(buf);
    }

    fn encode_describe_topic_partitions(
        body: &DescribeTopicPartitionsResponse,
        buf: &mut BytesMut,
    ) {
        buf.put_i32(body.throttle_time_ms);
        encode_compact_array_len(buf, body.topics.len());
        for topic in &body.topics {
            buf.put_i16(topic.error_code);
            encode_compact_string(buf, &topic.name);
            buf.put_slice(&topic.topic_id);
            buf.put_u8(u8::from(topic.is_internal));
            encode_compact_array_len(buf, topic.partitions.len());
            for partition in &topic.partitions {
                buf.put_i16(partition.error_code);
                buf.put_i32(partition.partition_index);
                buf.put_i32(partition.leader_id);
                buf.put_i32(partition.leader_epoch);
                encode_compact_i32_array(buf, &partition.replicas);
                encode_compact_i32_array(buf, &partition.isr);
                encode_compact_i32_array(buf, &partition.eligible_leader_replicas);
                encode_compact_i32_array(buf, &partition.last_known_elr);
                encode_compact_i32_array(buf, &partition.offline_replicas);
                encode_empty_tagged_fields(buf);
            }
            buf.put_i32(topic.authorized_operations);
            encode_empty_tagged_fields(buf);
        }
        buf.put_u8(NULL_CURSOR);
        encode_empty_tagged_fields(buf);
    }

    fn encode_fetch(body: &FetchResponse, buf: &mut BytesMut) {
        buf.put_i32(body.throttle_time_ms);
        buf.put_i16(body.error_code);
        buf.put_i32(body.session_id);
        encode_compact_array_len(buf, body.responses.len());
        for topic in &body.responses {
            buf.put_slice(&topic.topic_id);
            encode_compact_array_len(buf, topic.partitions.len());
            for partition in &topic.partitions {
                buf.put_i32(partition.partition_index);
                buf.put_i16(partition.error_code);
                buf.put_i64(partition.high_watermark);
                buf.put_i64(partition.last_stable_offset);
                buf.put_i64(partition.log_start_offset);
                encode_compact_array_len(buf, partition.aborted_transactions.len());
                for aborted in &partition.aborted_transactions {
                    buf.put_i64(aborted.producer_id);
                    buf.put_i64(aborted.first_offset);
                    encode_empty_tagged_fields(buf);
                }
                buf.put_i32(partition.preferred_read_replica);
                encode_compact_bytes(buf, &partition.records);
                encode_empty_tagged_fields(buf);
            }
            encode_empty_tagged_fields(buf);
        }
        encode_empty_tagged_fields(buf);
    }

    fn encode_produce(body: &ProduceResponse, buf: &mut BytesMut) {
        encode_compact_array_len(buf, body.responses.len());
        for topic in &body.responses {
            encode_compact_string(buf, &topic.name);
            encode_compact_array_len(buf, topic.partitions.len());
            for partition in &topic.partitions {
                buf.put_i32(partition.index);
                buf.put_i16(partition.error_code);
                buf.put_i64(partition.base_offset);
                buf.put_i64(partition.log_append_time_ms);
                buf.put_i64(partition.log_start_offset);
                // record_errors (null), error_message (null), tagged fields
                encode_unsigned_varint(buf, 0);
                encode_unsigned_varint(buf, 0);
                encode_unsigned_varint(buf, 0);
            }
            encode_empty_tagged_fields(buf);
        }
        buf.put_i32(body.throttle_time_ms);
        encode_empty_tagged_fields(buf);
    }
}

pub(crate) fn encode_compact_i32_array(buf: &mut BytesMut, values: &[i32]) {
    encode_compact_array_len(buf, values.len());
    for value in values {
        buf.put_i32(*value);
    }
}

/// Compact count with the null marker folded into zero.
pub(crate) fn compact_count(raw: u64) -> usize {
    usize::try_from(raw.saturating_sub(1)).unwrap_or(usize::MAX)
}

/// One-byte compact length used by the DescribeTopicPartitions request.
fn single_byte_length(reader: &mut WireReader<'_>, field: &'static str) -> Result<usize> {
    let count = i64::from(reader.read_u8(field)?) - 1;
    if count < 0 {
        return Err(KafkaCodecError::InvalidCount { field, count });
    }
    Ok(count as usize)
}

/// Frame codec for length-prefixed Kafka messages.
///
/// Decoded frames keep their 4-byte prefix so the request decoder can report
/// the declared size. Outgoing items are already framed and written verbatim.
#[derive(Debug, Clone, Copy)]
pub struct KafkaFrameCodec {
    max_frame_bytes: usize,
}

impl KafkaFrameCodec {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }
}

impl Default for KafkaFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl Decoder for KafkaFrameCodec {
    type Item = Bytes;
    type Error = KafkaCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < 4 {
            return Ok(None);
        }

        let message_length = i32::from_be_bytes([src[0], src[1], src[2], src[3]]);
        if message_length < 0 {
            return Err(KafkaCodecError::InvalidFrameLength(message_length));
        }
        let message_length = message_length as usize;
        if message_length > self.max_frame_bytes {
            return Err(KafkaCodecError::FrameTooLarge {
                length: message_length,
                max: self.max_frame_bytes,
            });
        }

        let total_length = 4 + message_length;
        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        Ok(Some(src.split_to(total_length).freeze()))
    }
}

impl Encoder<Bytes> for KafkaFrameCodec {
    type Error = KafkaCodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::kafka::api_versions::SUPPORTED_APIS;

    fn frame(api_key: u16, api_version: u16, correlation_id: u32, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&((8 + payload.len()) as u32).to_be_bytes());
        buf.extend_from_slice(&api_key.to_be_bytes());
        buf.extend_from_slice(&api_version.to_be_bytes());
        buf.extend_from_slice(&correlation_id.to_be_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_header_too_short() {
        let err = KafkaCodec::decode_request(&[0, 0, 0, 8, 0, 18, 0, 4]).unwrap_err();
        assert!(matches!(
            err,
            KafkaCodecError::HeaderTooShort { available: 8 }
        ));
    }

    #[test]
    fn test_decode_api_versions_header() {
        let mut payload = vec![0x00, 0x03];
        payload.extend_from_slice(b"cli");
        payload.push(0);
        let data = frame(API_KEY_API_VERSIONS, 4, 0x1234_5678, &payload);

        let request = KafkaCodec::decode_request(&data).unwrap();
        assert_eq!(request.declared_size, 14);
        assert_eq!(request.api_key, 18);
        assert_eq!(request.api_version, 4);
        assert_eq!(request.correlation_id, 0x1234_5678);
        assert_eq!(&request.client_id[..], b"cli");
        assert_eq!(request.body, RequestBody::ApiVersions);
    }

    #[test]
    fn test_unknown_api_key_falls_back_to_api_versions() {
        // Header only, client id unreadable: still decodes.
        let data = frame(3, 9, 42, &[]);
        let request = KafkaCodec::decode_request(&data).unwrap();
        assert_eq!(request.api_key, 3);
        assert_eq!(request.body, RequestBody::ApiVersions);
        assert!(request.client_id.is_empty());
    }

    #[test]
    fn test_decode_describe_topic_partitions() {
        let mut payload = vec![0xff, 0xff, 0x00]; // null client id, tag byte
        payload.push(3); // two topics
        payload.push(4);
        payload.extend_from_slice(b"foo");
        payload.push(0);
        payload.push(4);
        payload.extend_from_slice(b"bar");
        payload.push(0);
        payload.extend_from_slice(&100i32.to_be_bytes());
        payload.push(0xff);
        let data = frame(API_KEY_DESCRIBE_TOPIC_PARTITIONS, 0, 7, &payload);

        let request = KafkaCodec::decode_request(&data).unwrap();
        let RequestBody::DescribeTopicPartitions(body) = request.body else {
            panic!("expected DescribeTopicPartitions body");
        };
        let names: Vec<_> = body.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["foo", "bar"]);
        assert_eq!(body.cursor, -1);
    }

    #[test]
    fn test_describe_topic_partitions_without_trailer() {
        let payload = [0x00, 0x00, 0x00, 0x02, 0x02, b'a', 0x00];
        let data = frame(API_KEY_DESCRIBE_TOPIC_PARTITIONS, 0, 1, &payload);
        let request = KafkaCodec::decode_request(&data).unwrap();
        let RequestBody::DescribeTopicPartitions(body) = request.body else {
            panic!("expected DescribeTopicPartitions body");
        };
        assert_eq!(body.topics.len(), 1);
        assert_eq!(body.cursor, -1);
    }

    #[test]
    fn test_describe_topic_partitions_rejects_zero_count_byte() {
        let payload = [0x00, 0x00, 0x00, 0x00];
        let data = frame(API_KEY_DESCRIBE_TOPIC_PARTITIONS, 0, 1, &payload);
        assert!(matches!(
            KafkaCodec::decode_request(&data),
            Err(KafkaCodecError::InvalidCount {
                field: "topics count",
                count: -1
            })
        ));
    }

    #[test]
    fn test_describe_topic_partitions_truncated_name() {
        let payload = [0x00, 0x00, 0x00, 0x02, 0x09, b'a', b'b'];
        let data = frame(API_KEY_DESCRIBE_TOPIC_PARTITIONS, 0, 1, &payload);
        assert!(matches!(
            KafkaCodec::decode_request(&data),
            Err(KafkaCodecError::Wire(WireError::Truncated {
                field: "topic name"
            }))
        ));
    }

    #[test]
    fn test_decode_fetch_reads_first_topic_only() {
        let mut payload = vec![0x00, 0x00, 0x00];
        payload.extend_from_slice(&500i32.to_be_bytes());
        payload.extend_from_slice(&1i32.to_be_bytes());
        payload.extend_from_slice(&(1i32 << 20).to_be_bytes());
        payload.push(0);
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&(-1i32).to_be_bytes());
        payload.push(3); // two topics declared
        payload.extend_from_slice(&[0xab; 16]);
        let data = frame(API_KEY_FETCH, 16, 9, &payload);

        let request = KafkaCodec::decode_request(&data).unwrap();
        let RequestBody::Fetch(body) = request.body else {
            panic!("expected Fetch body");
        };
        assert_eq!(body.max_wait_ms, 500);
        assert_eq!(body.session_epoch, -1);
        assert_eq!(
            body.topics,
            vec![FetchTopicRequest {
                topic_id: [0xab; 16]
            }]
        );
    }

    #[test]
    fn test_decode_fetch_empty_topics() {
        let mut payload = vec![0x00, 0x00, 0x00];
        payload.extend_from_slice(&[0u8; 21]);
        payload.push(1);
        let data = frame(API_KEY_FETCH, 16, 9, &payload);
        let RequestBody::Fetch(body) = KafkaCodec::decode_request(&data).unwrap().body else {
            panic!("expected Fetch body");
        };
        assert!(body.topics.is_empty());
    }

    #[test]
    fn test_decode_produce() {
        let mut payload = vec![0x00, 0x02, b'p', b'1', 0x00]; // client id, tags
        payload.push(0x00); // null transactional id
        payload.extend_from_slice(&(-1i16).to_be_bytes());
        payload.extend_from_slice(&1500i32.to_be_bytes());
        payload.push(2); // one topic
        payload.extend_from_slice(&[0x04, b'f', b'o', b'o']);
        payload.push(2); // one partition
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&[0x04, 1, 2, 3]);
        payload.push(0);
        payload.push(0);
        let data = frame(API_KEY_PRODUCE, 11, 5, &payload);

        let request = KafkaCodec::decode_request(&data).unwrap();
        assert_eq!(&request.client_id[..], b"p1");
        let RequestBody::Produce(body) = request.body else {
            panic!("expected Produce body");
        };
        assert_eq!(body.topics.len(), 1);
        assert_eq!(body.topics[0].name, "foo");
        assert_eq!(body.topics[0].partitions[0].index, 0);
        assert_eq!(&body.topics[0].partitions[0].records[..], &[1, 2, 3]);
    }

    #[test]
    fn test_decode_produce_truncated_records() {
        let mut payload = vec![0xff, 0xff, 0x00, 0x00];
        payload.extend_from_slice(&[0u8; 6]);
        payload.extend_from_slice(&[0x02, 0x02, b'x', 0x02]);
        payload.extend_from_slice(&0i32.to_be_bytes());
        payload.extend_from_slice(&[0x10, 1, 2]);
        let data = frame(API_KEY_PRODUCE, 11, 5, &payload);
        assert!(matches!(
            KafkaCodec::decode_request(&data),
            Err(KafkaCodecError::Wire(WireError::InvalidLength { field: "records", .. }))
        ));
    }

    #[test]
    fn test_encode_api_versions_exact_bytes() {
        let response = ResponseEnvelope {
            correlation_id: 7,
            body: ResponseBody::ApiVersions(ApiVersionsResponse {
                error_code: 0,
                api_keys: SUPPORTED_APIS.to_vec(),
                throttle_time_ms: 0,
            }),
        };
        let bytes = KafkaCodec::encode_response(&response).unwrap();

        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0, 0, 0, 40,
            0, 0, 0, 7,
            0, 0,
            5,
            0, 18, 0, 0, 0, 4, 0,
            0, 75, 0, 0, 0, 0, 0,
            0, 1, 0, 0, 0, 16, 0,
            0, 0, 0, 0, 0, 11, 0,
            0, 0, 0, 0,
            0,
        ];
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_encode_fetch_unknown_topic_bytes() {
        let response = ResponseEnvelope {
            correlation_id: 1,
            body: ResponseBody::Fetch(FetchResponse {
                throttle_time_ms: 0,
                error_code: 0,
                session_id: 0,
                responses: vec![FetchTopicResponse {
                    topic_id: [0x11; 16],
                    partitions: vec![FetchPartitionResponse {
                        partition_index: 0,
                        error_code: 100,
                        high_watermark: 0,
                        last_stable_offset: 0,
                        log_start_offset: 0,
                        aborted_transactions: Vec::new(),
                        preferred_read_replica: -1,
                        records: Bytes::new(),
                    }],
                }],
            }),
        };
        let bytes = KafkaCodec::encode_response(&response).unwrap();

        let mut expected = vec![0, 0, 0, 1, 0]; // correlation id, header tags
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        expected.push(2);
        expected.extend_from_slice(&[0x11; 16]);
        expected.push(2);
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 100]);
        expected.extend_from_slice(&[0u8; 24]);
        expected.push(1); // no aborted transactions
        expected.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        expected.push(1); // empty records
        expected.extend_from_slice(&[0, 0, 0]);

        assert_eq!(&bytes[4..], &expected[..]);
        assert_eq!(
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize,
            expected.len()
        );
    }

    #[test]
    fn test_frame_codec_waits_for_complete_frame() {
        let mut codec = KafkaFrameCodec::default();
        let mut src = BytesMut::from(&[0u8, 0, 0, 6, 1, 2][..]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        src.extend_from_slice(&[3, 4, 5, 6, 0xaa]);
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(&frame[..], &[0, 0, 0, 6, 1, 2, 3, 4, 5, 6]);
        assert_eq!(&src[..], &[0xaa]);
    }

    #[test]
    fn test_frame_codec_rejects_bad_lengths() {
        let mut codec = KafkaFrameCodec::new(16);
        let mut negative = BytesMut::from(&[0xffu8, 0xff, 0xff, 0xff][..]);
        assert!(matches!(
            codec.decode(&mut negative),
            Err(KafkaCodecError::InvalidFrameLength(-1))
        ));

        let mut oversized = BytesMut::from(&[0u8, 0, 0, 17][..]);
        assert!(matches!(
            codec.decode(&mut oversized),
            Err(KafkaCodecError::FrameTooLarge {
                length: 17,
                max: 16
            })
        ));
    }

    #[test]
    fn test_frame_codec_encodes_verbatim() {
        let mut codec = KafkaFrameCodec::default();
        let mut dst = BytesMut::new();
        codec
            .encode(Bytes::from_static(&[0, 0, 0, 1, 9]), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], &[0, 0, 0, 1, 9]);
    }
}
