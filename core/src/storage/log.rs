use crate::{KraftmqError, Result};
use bytes::Bytes;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::LogStorage;

pub const DEFAULT_LOG_DIR: &str = "/tmp/kraft-combined-logs";

/// Each partition has a single segment starting at offset zero.
pub const SEGMENT_FILE_NAME: &str = "00000000000000000000.log";

/// Partition logs stored as `{base_dir}/{topic}-{partition}/00000000000000000000.log`.
#[derive(Debug, Clone)]
pub struct DiskLogStorage {
    base_dir: PathBuf,
}

impl DiskLogStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Segment file of a partition. Topic names that could escape the base
    /// directory are rejected.
    pub fn segment_path(&self, topic: &str, partition: i32) -> Result<PathBuf> {
        if topic.is_empty() || topic == "." || topic == ".." || topic.contains(['/', '\\']) {
            return Err(KraftmqError::Storage(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid topic name for log path: {:?}", topic),
            )));
        }
        Ok(self
            .base_dir
            .join(format!("{}-{}", topic, partition))
            .join(SEGMENT_FILE_NAME))
    }
}

impl Default for DiskLogStorage {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_DIR)
    }
}

impl LogStorage for DiskLogStorage {
    fn load(&self, topic: &str, partition: i32) -> Result<Bytes> {
        let path = self.segment_path(topic, partition)?;
        let data = fs::read(&path)?;
        debug!("Loaded {} bytes from {}", data.len(), path.display());
        Ok(Bytes::from(data))
    }

    fn append(&self, topic: &str, partition: i32, records: &[u8]) -> Result<()> {
        let path = self.segment_path(topic, partition)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(records)?;
        file.sync_data()?;

        debug!("Appended {} bytes to {}", records.len(), path.display());
        Ok(())
    }
}
