//! # Storage Module
//!
//! Partition logs as opaque byte streams. Produce appends the raw record
//! batches a client sent; Fetch returns the whole log of partition 0. Offsets
//! are never assigned or tracked.
//!
//! ## Modules
//!
//! - [`log`] - on-disk logs in the KRaft directory layout
//!
//! [`InMemoryLogStorage`] keeps logs in a sharded map for tests and for
//! running without a data directory.

pub mod log;

pub use log::{DiskLogStorage, DEFAULT_LOG_DIR, SEGMENT_FILE_NAME};

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use tracing::trace;

use crate::Result;

/// Load/append access to partition logs.
///
/// Implementations are called from blocking worker threads and may block.
pub trait LogStorage: Send + Sync {
    /// Entire contents of a partition log.
    fn load(&self, topic: &str, partition: i32) -> Result<Bytes>;

    /// Append `records` verbatim to the end of a partition log, creating it
    /// if needed.
    fn append(&self, topic: &str, partition: i32, records: &[u8]) -> Result<()>;
}

/// In-memory partition logs keyed by `(topic, partition)`.
///
/// DashMap shards the key space so appends to different partitions do not
/// contend.
#[derive(Debug, Default)]
pub struct InMemoryLogStorage {
    logs: DashMap<(String, i32), BytesMut>,
}

impl InMemoryLogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of partition logs that have received at least one append.
    pub fn partition_count(&self) -> usize {
        self.logs.len()
    }
}

impl LogStorage for InMemoryLogStorage {
    /// A partition that was never written loads as empty.
    fn load(&self, topic: &str, partition: i32) -> Result<Bytes> {
        let key = (topic.to_string(), partition);
        Ok(self
            .logs
            .get(&key)
            .map(|log| Bytes::copy_from_slice(&log))
            .unwrap_or_default())
    }

    fn append(&self, topic: &str, partition: i32, records: &[u8]) -> Result<()> {
        let mut log = self.logs.entry((topic.to_string(), partition)).or_default();
        log.extend_from_slice(records);
        trace!(
            topic,
            partition,
            appended = records.len(),
            total = log.len(),
            "In-memory append"
        );
        Ok(())
    }
}
