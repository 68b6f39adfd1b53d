//! Kafka Wire Protocol Implementation
//!
//! ## Protocol Structure
//!
//! Requests and responses travel as length-prefixed frames over TCP:
//! ```text
//! RequestMessage  => MessageSize RequestHeader RequestBody
//! MessageSize     => uint32 (excludes itself)
//! RequestHeader   => api_key api_version correlation_id client_id TAG_BUFFER
//! ResponseMessage => MessageSize correlation_id [TAG_BUFFER] ResponseBody
//! ```
//!
//! ## Supported APIs
//!
//! - **ApiKey 0**: Produce (v0-v11) - append raw record batches to a partition log
//! - **ApiKey 1**: Fetch (v0-v16) - read partition 0 of a topic by id
//! - **ApiKey 18**: ApiVersions (v0-v4) - version negotiation
//! - **ApiKey 75**: DescribeTopicPartitions (v0) - topic and partition metadata
//!
//! Requests with any other api key are answered with the ApiVersions catalogue.

pub mod api_versions;
pub mod client_codec;
pub mod codec;
pub mod errors;
pub mod messages;
pub mod wire;

pub use api_versions::{ApiVersionInfo, MAX_API_VERSIONS_VERSION, SUPPORTED_APIS};
pub use codec::{KafkaCodec, KafkaCodecError, KafkaFrameCodec};
pub use errors::KafkaErrorCode;
pub use messages::*;
pub use wire::{Uuid, WireError, WireReader};

pub const API_KEY_PRODUCE: u16 = 0;
pub const API_KEY_FETCH: u16 = 1;
pub const API_KEY_API_VERSIONS: u16 = 18;
pub const API_KEY_DESCRIBE_TOPIC_PARTITIONS: u16 = 75;
