//! In-memory topic metadata built from decoded metadata log batches.
//!
//! Topics live in an arena; `by_name` and `by_id` map into it. A partition
//! record whose topic has not been seen yet creates a placeholder with an
//! empty name, registered by id only. When the topic record arrives later the
//! placeholder is completed in place, keeping its partitions.

use std::collections::HashMap;

use tracing::debug;

use super::batch::RecordBatch;
use super::record::{PartitionRecord, RecordValue, TopicRecord};
use crate::protocol::kafka::wire::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMetadata {
    pub name: String,
    pub topic_id: Uuid,
    pub partitions: Vec<PartitionMetadata>,
}

impl TopicMetadata {
    pub fn partition(&self, partition_index: i32) -> Option<&PartitionMetadata> {
        self.partitions
            .iter()
            .find(|p| p.partition_index == partition_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMetadata {
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
}

/// Read-only topic lookups used by the request processor.
pub trait MetadataLookup: Send + Sync {
    fn topic_by_name(&self, name: &str) -> Option<&TopicMetadata>;
    fn topic_by_id(&self, topic_id: &Uuid) -> Option<&TopicMetadata>;
}

#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    topics: Vec<TopicMetadata>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<Uuid, usize>,
}

impl MetadataIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fold every record of every batch, in order. Feature level and unknown
    /// records are ignored.
    pub fn build(batches: &[RecordBatch]) -> Self {
        let mut index = Self::empty();
        for record in batches.iter().flat_map(|batch| &batch.records) {
            match &record.value {
                RecordValue::Topic(topic) => index.apply_topic(topic),
                RecordValue::Partition(partition) => index.apply_partition(partition),
                RecordValue::FeatureLevel(_) | RecordValue::Unknown { .. } => {}
            }
        }
        debug!(
            topics = index.topic_count(),
            partitions = index.partition_count(),
            "Built metadata index"
        );
        index
    }

    fn apply_topic(&mut self, record: &TopicRecord) {
        match self.by_id.get(&record.topic_id) {
            Some(&slot) => {
                let entry = &mut self.topics[slot];
                if entry.name != record.name {
                    // Drop the stale name only if it still points at this slot.
                    if self.by_name.get(&entry.name) == Some(&slot) {
                        self.by_name.remove(&entry.name);
                    }
                    entry.name = record.name.clone();
                }
                self.by_name.insert(record.name.clone(), slot);
            }
            None => {
                let slot = self.topics.len();
                self.topics.push(TopicMetadata {
                    name: record.name.clone(),
                    topic_id: record.topic_id,
                    partitions: Vec::new(),
                });
                self.by_id.insert(record.topic_id, slot);
                self.by_name.insert(record.name.clone(), slot);
            }
        }
    }

    fn apply_partition(&mut self, record: &PartitionRecord) {
        let slot = match self.by_id.get(&record.topic_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.topics.len();
                self.topics.push(TopicMetadata {
                    name: String::new(),
                    topic_id: record.topic_id,
                    partitions: Vec::new(),
                });
                self.by_id.insert(record.topic_id, slot);
                slot
            }
        };

        self.topics[slot].partitions.push(PartitionMetadata {
            partition_index: record.partition_id,
            leader_id: record.leader,
            leader_epoch: record.leader_epoch,
            replicas: record.replicas.clone(),
            isr: record.isr.clone(),
        });
    }

    pub fn topic_by_name(&self, name: &str) -> Option<&TopicMetadata> {
        self.by_name.get(name).map(|&slot| &self.topics[slot])
    }

    pub fn topic_by_id(&self, topic_id: &Uuid) -> Option<&TopicMetadata> {
        self.by_id.get(topic_id).map(|&slot| &self.topics[slot])
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn partition_count(&self) -> usize {
        self.topics.iter().map(|t| t.partitions.len()).sum()
    }
}

impl MetadataLookup for MetadataIndex {
    fn topic_by_name(&self, name: &str) -> Option<&TopicMetadata> {
        MetadataIndex::topic_by_name(self, name)
    }

    fn topic_by_id(&self, topic_id: &Uuid) -> Option<&TopicMetadata> {
        MetadataIndex::topic_by_id(self, topic_id)
    }
}
