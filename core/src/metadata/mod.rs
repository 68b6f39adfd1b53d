//! # Cluster Metadata
//!
//! Decoding of the KRaft `__cluster_metadata` log and the topic index built
//! from it once at startup.
//!
//! - [`batch`] - record batch framing (61-byte header plus records)
//! - [`record`] - record framing and the feature level, topic and partition
//!   payloads
//! - [`index`] - arena of topics with by-name and by-id views
//! - [`loader`] - file loading with fallback to an empty index

pub mod batch;
pub mod index;
pub mod loader;
pub mod record;

pub use batch::{RecordBatch, RECORD_BATCH_HEADER_LEN};
pub use index::{MetadataIndex, MetadataLookup, PartitionMetadata, TopicMetadata};
pub use loader::{load_metadata, write_metadata_log};
pub use record::{FeatureLevelRecord, PartitionRecord, Record, RecordValue, TopicRecord};

use thiserror::Error;

use crate::protocol::kafka::wire::WireError;

#[derive(Debug, Error)]
pub enum MetadataLogError {
    #[error("record batch header truncated: {available} bytes available")]
    TruncatedBatch { available: usize },
    #[error("invalid record batch length: {batch_length}")]
    InvalidBatchSize { batch_length: i32 },
    #[error("invalid records count: {0}")]
    InvalidRecordsCount(i32),
    #[error("negative record value length: {0}")]
    NegativeValueLength(i64),
    #[error("metadata log wire error: {0}")]
    Wire(#[from] WireError),
}

pub type Result<T> = std::result::Result<T, MetadataLogError>;
