//! Client side of the wire codec.
//!
//! [`encode_request`] produces frames that [`KafkaCodec::decode_request`]
//! accepts, and [`decode_response`] parses what
//! [`KafkaCodec::encode_response`] writes. Integration tests drive the broker
//! through these, and small tools can use them to talk to it.
//!
//! Request bodies are written in the flexible layout of the versions listed in
//! the ApiVersions catalogue. DescribeTopicPartitions counts and names are
//! read back by the broker as single bytes, so they round-trip only while each
//! stays below 127.
//!
//! [`KafkaCodec::decode_request`]: super::codec::KafkaCodec::decode_request
//! [`KafkaCodec::encode_response`]: super::codec::KafkaCodec::encode_response

use bytes::{BufMut, Bytes, BytesMut};

use super::api_versions::ApiVersionInfo;
use super::codec::{compact_count, KafkaCodecError, Result};
use super::messages::*;
use super::wire::{
    encode_compact_array_len, encode_compact_bytes, encode_compact_nullable_string,
    encode_compact_string, encode_empty_tagged_fields, WireReader,
};
use super::{
    API_KEY_API_VERSIONS, API_KEY_DESCRIBE_TOPIC_PARTITIONS, API_KEY_FETCH, API_KEY_PRODUCE,
};

const CLIENT_SOFTWARE_NAME: &str = "kraftmq";
const CLIENT_SOFTWARE_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_PARTITION_LIMIT: i32 = 100;
const DEFAULT_PARTITION_MAX_BYTES: i32 = 1 << 20;
const DEFAULT_PRODUCE_TIMEOUT_MS: i32 = 30_000;

/// Encode a request frame. `declared_size` is recomputed from the encoded
/// bytes; the value stored in the envelope is ignored.
pub fn encode_request(request: &RequestEnvelope) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    buf.put_u32(0);
    buf.put_u16(request.api_key);
    buf.put_u16(request.api_version);
    buf.put_u32(request.correlation_id);

    let client_id_len = request.client_id.len().min(i16::MAX as usize);
    buf.put_i16(client_id_len as i16);
    buf.put_slice(&request.client_id[..client_id_len]);
    encode_empty_tagged_fields(&mut buf);

    match &request.body {
        RequestBody::ApiVersions => {
            encode_compact_string(&mut buf, CLIENT_SOFTWARE_NAME);
            encode_compact_string(&mut buf, CLIENT_SOFTWARE_VERSION);
            encode_empty_tagged_fields(&mut buf);
        }
        RequestBody::DescribeTopicPartitions(body) => {
            encode_compact_array_len(&mut buf, body.topics.len());
            for topic in &body.topics {
                encode_compact_string(&mut buf, &topic.name);
                encode_empty_tagged_fields(&mut buf);
            }
            buf.put_i32(DEFAULT_PARTITION_LIMIT);
            buf.put_i8(body.cursor);
            encode_empty_tagged_fields(&mut buf);
        }
        RequestBody::Fetch(body) => encode_fetch(body, &mut buf),
        RequestBody::Produce(body) => encode_produce(body, &mut buf),
    }

    let size = (buf.len() - 4) as u32;
    buf[..4].copy_from_slice(&size.to_be_bytes());
    buf.freeze()
}

fn encode_fetch(body: &FetchRequest, buf: &mut BytesMut) {
    buf.put_i32(body.max_wait_ms);
    buf.put_i32(body.min_bytes);
    buf.put_i32(body.max_bytes);
    buf.put_i8(body.isolation_level);
    buf.put_i32(body.session_id);
    buf.put_i32(body.session_epoch);
    encode_compact_array_len(buf, body.topics.len());
    for topic in &body.topics {
        buf.put_slice(&topic.topic_id);
        // a single partition 0, read from the start of the log
        encode_compact_array_len(buf, 1);
        buf.put_i32(0);
        buf.put_i32(-1);
        buf.put_i64(0);
        buf.put_i32(-1);
        buf.put_i64(-1);
        buf.put_i32(DEFAULT_PARTITION_MAX_BYTES);
        encode_empty_tagged_fields(buf);
        encode_empty_tagged_fields(buf);
    }
    encode_compact_array_len(buf, 0);
    encode_compact_string(buf, "");
    encode_empty_tagged_fields(buf);
}

fn encode_produce(body: &ProduceRequest, buf: &mut BytesMut) {
    encode_compact_nullable_string(buf, None);
    buf.put_i16(-1);
    buf.put_i32(DEFAULT_PRODUCE_TIMEOUT_MS);
    encode_compact_array_len(buf, body.topics.len());
    for topic in &body.topics {
        encode_compact_string(buf, &topic.name);
        encode_compact_array_len(buf, topic.partitions.len());
        for partition in &topic.partitions {
            buf.put_i32(partition.index);
            encode_compact_bytes(buf, &partition.records);
            encode_empty_tagged_fields(buf);
        }
        encode_empty_tagged_fields(buf);
    }
    encode_empty_tagged_fields(buf);
}

/// Decode a complete response frame for a request sent with `api_key`.
pub fn decode_response(api_key: u16, data: &[u8]) -> Result<ResponseEnvelope> {
    let mut reader = WireReader::new(data);
    let size = reader.read_u32("message_size")?;
    if size as usize != reader.remaining() {
        return Err(KafkaCodecError::InvalidFrameLength(size as i32));
    }
    let correlation_id = reader.read_u32("correlation_id")?;

    let body = match api_key {
        API_KEY_API_VERSIONS => ResponseBody::ApiVersions(decode_api_versions(&mut reader)?),
        API_KEY_DESCRIBE_TOPIC_PARTITIONS => {
            reader.read_tag_buffer()?;
            ResponseBody::DescribeTopicPartitions(decode_describe_topic_partitions(&mut reader)?)
        }
        API_KEY_FETCH => {
            reader.read_tag_buffer()?;
            ResponseBody::Fetch(decode_fetch(&mut reader)?)
        }
        API_KEY_PRODUCE => {
            reader.read_tag_buffer()?;
            ResponseBody::Produce(decode_produce(&mut reader)?)
        }
        other => return Err(KafkaCodecError::UnsupportedBody(other)),
    };

    Ok(ResponseEnvelope {
        correlation_id,
        body,
    })
}

fn read_count(reader: &mut WireReader<'_>, field: &'static str) -> Result<usize> {
    Ok(compact_count(reader.read_unsigned_varint(field)?))
}

fn read_compact_i32_array(reader: &mut WireReader<'_>, field: &'static str) -> Result<Vec<i32>> {
    let count = read_count(reader, field)?;
    let mut values = Vec::new();
    for _ in 0..count {
        values.push(reader.read_i32(field)?);
    }
    Ok(values)
}

fn decode_api_versions(reader: &mut WireReader<'_>) -> Result<ApiVersionsResponse> {
    let error_code = reader.read_i16("error_code")?;
    let count = read_count(reader, "api_keys count")?;
    let mut api_keys = Vec::new();
    for _ in 0..count {
        let api_key = reader.read_u16("api_key")?;
        let min_version = reader.read_u16("min_version")?;
        let max_version = reader.read_u16("max_version")?;
        reader.read_tag_buffer()?;
        api_keys.push(ApiVersionInfo::new(api_key, min_version, max_version));
    }
    let throttle_time_ms = reader.read_i32("throttle_time_ms")?;
    reader.read_tag_buffer()?;
    Ok(ApiVersionsResponse {
        error_code,
        api_keys,
        throttle_time_ms,
    })
}

fn decode_describe_topic_partitions(
    reader: &mut WireReader<'_>,
) -> Result<DescribeTopicPartitionsResponse> {
    let throttle_time_ms = reader.read_i32("throttle_time_ms")?;
    let topic_count = read_count(reader, "topics count")?;
    let mut topics = Vec::new();
    for _ in 0..topic_count {
        let error_code = reader.read_i16("error_code")?;
        let name = reader
            .read_compact_nullable_string("topic name")?
            .unwrap_or_default();
        let topic_id = reader.read_uuid("topic_id")?;
        let is_internal = reader.read_u8("is_internal")? != 0;

        let partition_count = read_count(reader, "partitions count")?;
        let mut partitions = Vec::new();
        for _ in 0..partition_count {
            let error_code = reader.read_i16("partition error_code")?;
            let partition_index = reader.read_i32("partition_index")?;
            let leader_id = reader.read_i32("leader_id")?;
            let leader_epoch = reader.read_i32("leader_epoch")?;
            let replicas = read_compact_i32_array(reader, "replicas")?;
            let isr = read_compact_i32_array(reader, "isr")?;
            let eligible_leader_replicas =
                read_compact_i32_array(reader, "eligible_leader_replicas")?;
            let last_known_elr = read_compact_i32_array(reader, "last_known_elr")?;
            let offline_replicas = read_compact_i32_array(reader, "offline_replicas")?;
            reader.read_tag_buffer()?;
            partitions.push(DescribePartitionResponse {
                error_code,
                partition_index,
                leader_id,
                leader_epoch,
                replicas,
                isr,
                eligible_leader_replicas,
                last_known_elr,
                offline_replicas,
            });
        }

        let authorized_operations = reader.read_i32("topic_authorized_operations")?;
        reader.read_tag_buffer()?;
        topics.push(DescribeTopicResponse {
            error_code,
            name,
            topic_id,
            is_internal,
            partitions,
            authorized_operations,
        });
    }

    // 0xff is a null cursor; anything else starts a cursor struct.
    if reader.read_u8("next_cursor")? != 0xff {
        reader.read_compact_string("cursor topic name")?;
        reader.read_i32("cursor partition index")?;
        reader.read_tag_buffer()?;
    }
    reader.read_tag_buffer()?;

    Ok(DescribeTopicPartitionsResponse {
        throttle_time_ms,
        topics,
    })
}

fn decode_fetch(reader: &mut WireReader<'_>) -> Result<FetchResponse> {
    let throttle_time_ms = reader.read_i32("throttle_time_ms")?;
    let error_code = reader.read_i16("error_code")?;
    let session_id = reader.read_i32("session_id")?;

    let topic_count = read_count(reader, "responses count")?;
    let mut responses = Vec::new();
    for _ in 0..topic_count {
        let topic_id = reader.read_uuid("topic_id")?;
        let partition_count = read_count(reader, "partitions count")?;
        let mut partitions = Vec::new();
        for _ in 0..partition_count {
            let partition_index = reader.read_i32("partition_index")?;
            let error_code = reader.read_i16("partition error_code")?;
            let high_watermark = reader.read_i64("high_watermark")?;
            let last_stable_offset = reader.read_i64("last_stable_offset")?;
            let log_start_offset = reader.read_i64("log_start_offset")?;

            let aborted_count = read_count(reader, "aborted_transactions count")?;
            let mut aborted_transactions = Vec::new();
            for _ in 0..aborted_count {
                let producer_id = reader.read_i64("producer_id")?;
                let first_offset = reader.read_i64("first_offset")?;
                reader.read_tag_buffer()?;
                aborted_transactions.push(AbortedTransaction {
                    producer_id,
                    first_offset,
                });
            }

            let preferred_read_replica = reader.read_i32("preferred_read_replica")?;
            let records = reader
                .read_compact_nullable_bytes("records")?
                .map(Bytes::copy_from_slice)
                .unwrap_or_default();
            reader.read_tag_buffer()?;
            partitions.push(FetchPartitionResponse {
                partition_index,
                error_code,
                high_watermark,
                last_stable_offset,
                log_start_offset,
                aborted_transactions,
                preferred_read_replica,
                records,
            });
        }
        reader.read_tag_buffer()?;
        responses.push(FetchTopicResponse {
            topic_id,
            partitions,
        });
    }
    reader.read_tag_buffer()?;

    Ok(FetchResponse {
        throttle_time_ms,
        error_code,
        session_id,
        responses,
    })
}

fn decode_produce(reader: &mut WireReader<'_>) -> Result<ProduceResponse> {
    let topic_count = read_count(reader, "responses count")?;
    let mut responses = Vec::new();
    for _ in 0..topic_count {
        let name = reader.read_compact_string("topic name")?;
        let partition_count = read_count(reader, "partitions count")?;
        let mut partitions = Vec::new();
        for _ in 0..partition_count {
            let index = reader.read_i32("partition index")?;
            let error_code = reader.read_i16("error_code")?;
            let base_offset = reader.read_i64("base_offset")?;
            let log_append_time_ms = reader.read_i64("log_append_time_ms")?;
            let log_start_offset = reader.read_i64("log_start_offset")?;

            let record_errors = read_count(reader, "record_errors count")?;
            for _ in 0..record_errors {
                reader.read_i32("batch_index")?;
                reader.read_compact_nullable_string("batch_index_error_message")?;
                reader.read_tag_buffer()?;
            }
            reader.read_compact_nullable_string("error_message")?;
            reader.read_tag_buffer()?;

            partitions.push(ProducePartitionResponse {
                index,
                error_code,
                base_offset,
                log_append_time_ms,
                log_start_offset,
            });
        }
        reader.read_tag_buffer()?;
        responses.push(ProduceTopicResponse { name, partitions });
    }
    let throttle_time_ms = reader.read_i32("throttle_time_ms")?;
    reader.read_tag_buffer()?;

    Ok(ProduceResponse {
        responses,
        throttle_time_ms,
    })
}
