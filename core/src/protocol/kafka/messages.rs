//! Kafka Protocol Message Structures
//!
//! Typed requests and responses for the four APIs the broker serves. Request
//! and response bodies are closed enums, so every decoded request carries a
//! body and every response handed to the encoder has one.

use bytes::Bytes;

use super::api_versions::ApiVersionInfo;
use super::wire::Uuid;

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    /// Size prefix as sent by the client, excluding its own four bytes.
    pub declared_size: u32,
    pub api_key: u16,
    pub api_version: u16,
    pub correlation_id: u32,
    /// Raw client id; empty when absent or unreadable.
    pub client_id: Bytes,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Also used for any api key the broker does not recognise.
    ApiVersions,
    DescribeTopicPartitions(DescribeTopicPartitionsRequest),
    Fetch(FetchRequest),
    Produce(ProduceRequest),
}

// ============================================================================
// DESCRIBE TOPIC PARTITIONS (ApiKey = 75)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsRequest {
    pub topics: Vec<DescribeTopicRequest>,
    /// `-1` when the client sent no cursor.
    pub cursor: i8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsResponse {
    pub throttle_time_ms: i32,
    pub topics: Vec<DescribeTopicResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicResponse {
    pub error_code: i16,
    pub name: String,
    pub topic_id: Uuid,
    pub is_internal: bool,
    pub partitions: Vec<DescribePartitionResponse>,
    pub authorized_operations: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribePartitionResponse {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
    pub eligible_leader_replicas: Vec<i32>,
    pub last_known_elr: Vec<i32>,
    pub offline_replicas: Vec<i32>,
}

// ============================================================================
// FETCH (ApiKey = 1)
// ============================================================================

/// Only the leading fields of a v16 fetch are decoded; the broker stops after
/// the first topic id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub max_wait_ms: i32,
    pub min_bytes: i32,
    pub max_bytes: i32,
    pub isolation_level: i8,
    pub session_id: i32,
    pub session_epoch: i32,
    pub topics: Vec<FetchTopicRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTopicRequest {
    pub topic_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub throttle_time_ms: i32,
    pub error_code: i16,
    pub session_id: i32,
    pub responses: Vec<FetchTopicResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTopicResponse {
    pub topic_id: Uuid,
    pub partitions: Vec<FetchPartitionResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPartitionResponse {
    pub partition_index: i32,
    pub error_code: i16,
    pub high_watermark: i64,
    pub last_stable_offset: i64,
    pub log_start_offset: i64,
    pub aborted_transactions: Vec<AbortedTransaction>,
    /// `-1` means no preference.
    pub preferred_read_replica: i32,
    /// Raw record batches exactly as stored in the partition log.
    pub records: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortedTransaction {
    pub producer_id: i64,
    pub first_offset: i64,
}

// ============================================================================
// PRODUCE (ApiKey = 0)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceRequest {
    pub topics: Vec<ProduceTopicRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceTopicRequest {
    pub name: String,
    pub partitions: Vec<ProducePartitionRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducePartitionRequest {
    pub index: i32,
    pub records: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceResponse {
    pub responses: Vec<ProduceTopicResponse>,
    pub throttle_time_ms: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceTopicResponse {
    pub name: String,
    pub partitions: Vec<ProducePartitionResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducePartitionResponse {
    pub index: i32,
    pub error_code: i16,
    pub base_offset: i64,
    pub log_append_time_ms: i64,
    pub log_start_offset: i64,
}

// ============================================================================
// API VERSIONS (ApiKey = 18)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub error_code: i16,
    pub api_keys: Vec<ApiVersionInfo>,
    pub throttle_time_ms: i32,
}

/// A response ready for encoding. The frame size is derived by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub correlation_id: u32,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    ApiVersions(ApiVersionsResponse),
    DescribeTopicPartitions(DescribeTopicPartitionsResponse),
    Fetch(FetchResponse),
    Produce(ProduceResponse),
}

impl ResponseBody {
    /// Api key of the request this body answers.
    pub fn api_key(&self) -> u16 {
        match self {
            ResponseBody::ApiVersions(_) => super::API_KEY_API_VERSIONS,
            ResponseBody::DescribeTopicPartitions(_) => super::API_KEY_DESCRIBE_TOPIC_PARTITIONS,
            ResponseBody::Fetch(_) => super::API_KEY_FETCH,
            ResponseBody::Produce(_) => super::API_KEY_PRODUCE,
        }
    }

    /// ApiVersions keeps the v0 response header (no tag byte) so that clients
    /// can parse it before any version has been negotiated.
    pub fn has_flexible_header(&self) -> bool {
        !matches!(self, ResponseBody::ApiVersions(_))
    }
}
