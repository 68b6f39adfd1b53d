use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use super::batch::{self, RecordBatch};
use super::index::MetadataIndex;

/// Read and index the metadata log at `path`.
///
/// A missing or undecodable log never stops the broker: the failure is logged
/// and an empty index is returned.
pub fn load_metadata(path: &Path) -> MetadataIndex {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to read metadata log {}: {}", path.display(), e);
            return MetadataIndex::empty();
        }
    };

    match batch::decode(&raw) {
        Ok(batches) => {
            let index = MetadataIndex::build(&batches);
            info!(
                "Loaded metadata log {} ({} batches, {} topics, {} partitions)",
                path.display(),
                batches.len(),
                index.topic_count(),
                index.partition_count()
            );
            index
        }
        Err(e) => {
            warn!("Failed to decode metadata log {}: {}", path.display(), e);
            MetadataIndex::empty()
        }
    }
}

/// Write `batches` as a fresh metadata log segment, creating parent
/// directories as needed.
pub fn write_metadata_log(path: &Path, batches: &[RecordBatch]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, batch::encode(batches))
}
