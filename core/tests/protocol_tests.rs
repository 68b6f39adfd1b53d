use bytes::Bytes;
use kraftmq::protocol::kafka::client_codec::{decode_response, encode_request};
use kraftmq::protocol::kafka::{
    ApiVersionsResponse, DescribePartitionResponse, DescribeTopicPartitionsRequest,
    DescribeTopicPartitionsResponse, DescribeTopicRequest, DescribeTopicResponse,
    FetchPartitionResponse, FetchRequest, FetchResponse, FetchTopicRequest, FetchTopicResponse,
    KafkaCodec, KafkaCodecError, ProducePartitionRequest, ProducePartitionResponse,
    ProduceRequest, ProduceResponse, ProduceTopicRequest, ProduceTopicResponse, RequestBody,
    RequestEnvelope, ResponseBody, ResponseEnvelope, API_KEY_API_VERSIONS,
    API_KEY_DESCRIBE_TOPIC_PARTITIONS, API_KEY_FETCH, API_KEY_PRODUCE, SUPPORTED_APIS,
};

const TOPIC_ID: [u8; 16] = [0x71; 16];

fn request(api_key: u16, api_version: u16, body: RequestBody) -> RequestEnvelope {
    RequestEnvelope {
        declared_size: 0,
        api_key,
        api_version,
        correlation_id: 0x1234_5678,
        client_id: Bytes::from_static(b"kafka-cli"),
        body,
    }
}

fn round_trip_request(request: &RequestEnvelope) -> RequestEnvelope {
    let frame = encode_request(request);
    KafkaCodec::decode_request(&frame).expect("request should decode")
}

fn round_trip_response(response: &ResponseEnvelope) -> ResponseEnvelope {
    let frame = KafkaCodec::encode_response(response).expect("response should encode");
    let size = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    assert_eq!(size, frame.len() - 4, "size prefix must exclude itself");
    decode_response(response.body.api_key(), &frame).expect("response should decode")
}

#[test]
fn test_api_versions_request_round_trip() {
    let original = request(API_KEY_API_VERSIONS, 4, RequestBody::ApiVersions);
    let frame = encode_request(&original);
    let decoded = KafkaCodec::decode_request(&frame).unwrap();

    assert_eq!(decoded.declared_size as usize, frame.len() - 4);
    assert_eq!(decoded.api_key, API_KEY_API_VERSIONS);
    assert_eq!(decoded.api_version, 4);
    assert_eq!(decoded.correlation_id, 0x1234_5678);
    assert_eq!(decoded.client_id, Bytes::from_static(b"kafka-cli"));
    assert_eq!(decoded.body, RequestBody::ApiVersions);
}

#[test]
fn test_describe_topic_partitions_request_round_trip() {
    let body = DescribeTopicPartitionsRequest {
        topics: vec![
            DescribeTopicRequest {
                name: "orders".to_string(),
            },
            DescribeTopicRequest {
                name: "payments".to_string(),
            },
        ],
        cursor: -1,
    };
    let decoded = round_trip_request(&request(
        API_KEY_DESCRIBE_TOPIC_PARTITIONS,
        0,
        RequestBody::DescribeTopicPartitions(body.clone()),
    ));
    assert_eq!(decoded.body, RequestBody::DescribeTopicPartitions(body));
}

#[test]
fn test_fetch_request_round_trip() {
    let body = FetchRequest {
        max_wait_ms: 500,
        min_bytes: 1,
        max_bytes: 52_428_800,
        isolation_level: 0,
        session_id: 0,
        session_epoch: -1,
        topics: vec![FetchTopicRequest { topic_id: TOPIC_ID }],
    };
    let decoded = round_trip_request(&request(API_KEY_FETCH, 16, RequestBody::Fetch(body.clone())));
    assert_eq!(decoded.body, RequestBody::Fetch(body));
}

#[test]
fn test_fetch_request_without_topics() {
    let body = FetchRequest {
        max_wait_ms: 500,
        min_bytes: 1,
        max_bytes: 1024,
        isolation_level: 1,
        session_id: 7,
        session_epoch: 3,
        topics: Vec::new(),
    };
    let decoded = round_trip_request(&request(API_KEY_FETCH, 16, RequestBody::Fetch(body.clone())));
    assert_eq!(decoded.body, RequestBody::Fetch(body));
}

#[test]
fn test_produce_request_round_trip() {
    let body = ProduceRequest {
        topics: vec![ProduceTopicRequest {
            name: "orders".to_string(),
            partitions: vec![
                ProducePartitionRequest {
                    index: 0,
                    records: Bytes::from_static(b"\x00\x01batch-zero"),
                },
                ProducePartitionRequest {
                    index: 1,
                    records: Bytes::new(),
                },
            ],
        }],
    };
    let decoded =
        round_trip_request(&request(API_KEY_PRODUCE, 11, RequestBody::Produce(body.clone())));
    assert_eq!(decoded.body, RequestBody::Produce(body));
}

#[test]
fn test_unknown_api_key_decodes_as_api_versions() {
    let mut frame =
        encode_request(&request(API_KEY_API_VERSIONS, 0, RequestBody::ApiVersions)).to_vec();
    // Metadata (api key 3)
    frame[4..6].copy_from_slice(&3u16.to_be_bytes());
    let decoded = KafkaCodec::decode_request(&frame).unwrap();
    assert_eq!(decoded.api_key, 3);
    assert_eq!(decoded.body, RequestBody::ApiVersions);
}

#[test]
fn test_short_frame_is_rejected() {
    let result = KafkaCodec::decode_request(&[0, 0, 0, 4, 0, 18]);
    assert!(matches!(
        result,
        Err(KafkaCodecError::HeaderTooShort { available: 6 })
    ));
}

#[test]
fn test_api_versions_response_round_trip() {
    let response = ResponseEnvelope {
        correlation_id: 99,
        body: ResponseBody::ApiVersions(ApiVersionsResponse {
            error_code: 0,
            api_keys: SUPPORTED_APIS.to_vec(),
            throttle_time_ms: 0,
        }),
    };
    assert_eq!(round_trip_response(&response), response);
}

#[test]
fn test_describe_topic_partitions_response_round_trip() {
    let response = ResponseEnvelope {
        correlation_id: 5,
        body: ResponseBody::DescribeTopicPartitions(DescribeTopicPartitionsResponse {
            throttle_time_ms: 0,
            topics: vec![
                DescribeTopicResponse {
                    error_code: 0,
                    name: "orders".to_string(),
                    topic_id: TOPIC_ID,
                    is_internal: false,
                    partitions: vec![DescribePartitionResponse {
                        error_code: 0,
                        partition_index: 0,
                        leader_id: 1,
                        leader_epoch: 0,
                        replicas: vec![1],
                        isr: vec![1],
                        eligible_leader_replicas: Vec::new(),
                        last_known_elr: Vec::new(),
                        offline_replicas: Vec::new(),
                    }],
                    authorized_operations: 0,
                },
                DescribeTopicResponse {
                    error_code: 3,
                    name: "zzz".to_string(),
                    topic_id: [0; 16],
                    is_internal: false,
                    partitions: Vec::new(),
                    authorized_operations: 0,
                },
            ],
        }),
    };
    assert_eq!(round_trip_response(&response), response);
}

#[test]
fn test_fetch_response_round_trip() {
    let response = ResponseEnvelope {
        correlation_id: 6,
        body: ResponseBody::Fetch(FetchResponse {
            throttle_time_ms: 0,
            error_code: 0,
            session_id: 0,
            responses: vec![FetchTopicResponse {
                topic_id: TOPIC_ID,
                partitions: vec![FetchPartitionResponse {
                    partition_index: 0,
                    error_code: 0,
                    high_watermark: 0,
                    last_stable_offset: 0,
                    log_start_offset: 0,
                    aborted_transactions: Vec::new(),
                    preferred_read_replica: -1,
                    records: Bytes::from_static(b"raw record batches"),
                }],
            }],
        }),
    };
    assert_eq!(round_trip_response(&response), response);
}

#[test]
fn test_produce_response_round_trip() {
    let response = ResponseEnvelope {
        correlation_id: 7,
        body: ResponseBody::Produce(ProduceResponse {
            responses: vec![ProduceTopicResponse {
                name: "orders".to_string(),
                partitions: vec![
                    ProducePartitionResponse {
                        index: 0,
                        error_code: 0,
                        base_offset: 0,
                        log_append_time_ms: -1,
                        log_start_offset: 0,
                    },
                    ProducePartitionResponse {
                        index: 9,
                        error_code: 3,
                        base_offset: -1,
                        log_append_time_ms: -1,
                        log_start_offset: -1,
                    },
                ],
            }],
            throttle_time_ms: 0,
        }),
    };
    assert_eq!(round_trip_response(&response), response);
}

#[test]
fn test_truncated_response_is_rejected() {
    let response = ResponseEnvelope {
        correlation_id: 1,
        body: ResponseBody::ApiVersions(ApiVersionsResponse {
            error_code: 0,
            api_keys: SUPPORTED_APIS.to_vec(),
            throttle_time_ms: 0,
        }),
    };
    let frame = KafkaCodec::encode_response(&response).unwrap();
    let result = decode_response(API_KEY_API_VERSIONS, &frame[..frame.len() - 1]);
    assert!(matches!(result, Err(KafkaCodecError::InvalidFrameLength(_))));
}
