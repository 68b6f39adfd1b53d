//! Request processing: maps a decoded request to its response.
//!
//! Domain failures never abort processing. They are reported through protocol
//! error codes inside an otherwise well-formed response.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::metadata::{MetadataLookup, TopicMetadata};
use crate::metrics::BrokerMetrics;
use crate::protocol::kafka::{
    ApiVersionsResponse, DescribePartitionResponse, DescribeTopicPartitionsRequest,
    DescribeTopicPartitionsResponse, DescribeTopicResponse, FetchPartitionResponse, FetchRequest,
    FetchResponse, FetchTopicResponse, KafkaErrorCode, ProducePartitionRequest,
    ProducePartitionResponse, ProduceRequest, ProduceResponse, ProduceTopicResponse, RequestBody,
    RequestEnvelope, ResponseBody, ResponseEnvelope, MAX_API_VERSIONS_VERSION, SUPPORTED_APIS,
};
use crate::storage::LogStorage;

/// Fetch only ever serves this partition of a topic.
const FETCH_PARTITION: i32 = 0;

pub struct RequestProcessor {
    metadata: Arc<dyn MetadataLookup>,
    logs: Arc<dyn LogStorage>,
    metrics: Arc<BrokerMetrics>,
}

impl RequestProcessor {
    pub fn new(metadata: Arc<dyn MetadataLookup>, logs: Arc<dyn LogStorage>) -> Self {
        Self {
            metadata,
            logs,
            metrics: Arc::new(BrokerMetrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<BrokerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Produce the response for `request`, echoing its correlation id.
    pub fn process(&self, request: &RequestEnvelope) -> ResponseEnvelope {
        let body = match &request.body {
            RequestBody::ApiVersions => {
                ResponseBody::ApiVersions(self.handle_api_versions(request.api_version))
            }
            RequestBody::DescribeTopicPartitions(body) => {
                ResponseBody::DescribeTopicPartitions(self.handle_describe_topic_partitions(body))
            }
            RequestBody::Fetch(body) => ResponseBody::Fetch(self.handle_fetch(body)),
            RequestBody::Produce(body) => ResponseBody::Produce(self.handle_produce(body)),
        };

        ResponseEnvelope {
            correlation_id: request.correlation_id,
            body,
        }
    }

    fn handle_api_versions(&self, api_version: u16) -> ApiVersionsResponse {
        let error_code = if api_version > MAX_API_VERSIONS_VERSION {
            KafkaErrorCode::UnsupportedVersion
        } else {
            KafkaErrorCode::NoError
        };
        if error_code != KafkaErrorCode::NoError {
            debug!("ApiVersions v{}: {}", api_version, error_code);
        }

        ApiVersionsResponse {
            error_code: error_code.as_i16(),
            api_keys: SUPPORTED_APIS.to_vec(),
            throttle_time_ms: 0,
        }
    }

    fn handle_describe_topic_partitions(
        &self,
        request: &DescribeTopicPartitionsRequest,
    ) -> DescribeTopicPartitionsResponse {
        let mut topics: Vec<DescribeTopicResponse> = request
            .topics
            .iter()
            .map(|topic| match self.metadata.topic_by_name(&topic.name) {
                Some(meta) => describe_known_topic(meta),
                None => {
                    let error = KafkaErrorCode::UnknownTopicOrPartition;
                    debug!("DescribeTopicPartitions {}: {}", topic.name, error);
                    DescribeTopicResponse {
                        error_code: error.as_i16(),
                        name: topic.name.clone(),
                        topic_id: [0; 16],
                        is_internal: false,
                        partitions: Vec::new(),
                        authorized_operations: 0,
                    }
                }
            })
            .collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name));

        DescribeTopicPartitionsResponse {
            throttle_time_ms: 0,
            topics,
        }
    }

    fn handle_fetch(&self, request: &FetchRequest) -> FetchResponse {
        let responses = request
            .topics
            .iter()
            .map(|topic| {
                let partition = match self.metadata.topic_by_id(&topic.topic_id) {
                    Some(meta) => {
                        let records = self.load_records(&meta.name);
                        fetch_partition(KafkaErrorCode::NoError, records)
                    }
                    None => {
                        let error = KafkaErrorCode::UnknownTopicId;
                        debug!("Fetch {:02x?}: {}", topic.topic_id, error);
                        fetch_partition(error, Bytes::new())
                    }
                };
                FetchTopicResponse {
                    topic_id: topic.topic_id,
                    partitions: vec![partition],
                }
            })
            .collect();

        FetchResponse {
            throttle_time_ms: 0,
            error_code: KafkaErrorCode::NoError.as_i16(),
            session_id: 0,
            responses,
        }
    }

    /// A log that cannot be read is served as empty.
    fn load_records(&self, topic: &str) -> Bytes {
        match self.logs.load(topic, FETCH_PARTITION) {
            Ok(records) => records,
            Err(e) => {
                debug!(
                    "Serving empty records for {}-{}: {}",
                    topic, FETCH_PARTITION, e
                );
                Bytes::new()
            }
        }
    }

    fn handle_produce(&self, request: &ProduceRequest) -> ProduceResponse {
        let responses = request
            .topics
            .iter()
            .map(|topic| {
                let meta = self.metadata.topic_by_name(&topic.name);
                let partitions = topic
                    .partitions
                    .iter()
                    .map(|partition| self.produce_partition(&topic.name, meta, partition))
                    .collect();
                ProduceTopicResponse {
                    name: topic.name.clone(),
                    partitions,
                }
            })
            .collect();

        ProduceResponse {
            responses,
            throttle_time_ms: 0,
        }
    }

    fn produce_partition(
        &self,
        topic: &str,
        meta: Option<&TopicMetadata>,
        partition: &ProducePartitionRequest,
    ) -> ProducePartitionResponse {
        let known = meta.and_then(|m| m.partition(partition.index)).is_some();
        if !known {
            return produce_rejected(topic, partition.index);
        }

        match self.logs.append(topic, partition.index, &partition.records) {
            Ok(()) => ProducePartitionResponse {
                index: partition.index,
                error_code: KafkaErrorCode::NoError.as_i16(),
                base_offset: 0,
                log_append_time_ms: -1,
                log_start_offset: 0,
            },
            Err(e) => {
                warn!("Append to {}-{} failed: {}", topic, partition.index, e);
                self.metrics.produce_failure();
                produce_rejected(topic, partition.index)
            }
        }
    }
}

fn describe_known_topic(meta: &TopicMetadata) -> DescribeTopicResponse {
    DescribeTopicResponse {
        error_code: KafkaErrorCode::NoError.as_i16(),
        name: meta.name.clone(),
        topic_id: meta.topic_id,
        is_internal: false,
        partitions: meta
            .partitions
            .iter()
            .map(|p| DescribePartitionResponse {
                error_code: KafkaErrorCode::NoError.as_i16(),
                partition_index: p.partition_index,
                leader_id: p.leader_id,
                leader_epoch: p.leader_epoch,
                replicas: p.replicas.clone(),
                isr: p.isr.clone(),
                eligible_leader_replicas: Vec::new(),
                last_known_elr: Vec::new(),
                offline_replicas: Vec::new(),
            })
            .collect(),
        authorized_operations: 0,
    }
}

fn fetch_partition(error: KafkaErrorCode, records: Bytes) -> FetchPartitionResponse {
    FetchPartitionResponse {
        partition_index: FETCH_PARTITION,
        error_code: error.as_i16(),
        high_watermark: 0,
        last_stable_offset: 0,
        log_start_offset: 0,
        aborted_transactions: Vec::new(),
        preferred_read_replica: -1,
        records,
    }
}

fn produce_rejected(topic: &str, index: i32) -> ProducePartitionResponse {
    let error = KafkaErrorCode::UnknownTopicOrPartition;
    debug!("Produce {}-{}: {}", topic, index, error);
    ProducePartitionResponse {
        index,
        error_code: error.as_i16(),
        base_offset: -1,
        log_append_time_ms: -1,
        log_start_offset: -1,
    }
}
