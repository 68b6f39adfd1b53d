//! # Protocol Module
//!
//! Kafka wire protocol support for the four APIs the broker serves:
//!
//! - **API 0**: Produce - append record batches to a partition log
//! - **API 1**: Fetch - read a partition log by topic id
//! - **API 18**: ApiVersions - protocol version negotiation (KIP-482 header rules)
//! - **API 75**: DescribeTopicPartitions - topic and partition metadata
//!
//! ## Modules
//!
//! - [`kafka`] - wire primitives, message types, request/response codecs and
//!   the TCP frame codec

pub mod kafka;
