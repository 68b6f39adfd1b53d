//! # kraftmq Core Library
//!
//! A single-node broker that speaks a subset of the Kafka wire protocol
//! (ApiVersions, DescribeTopicPartitions, Fetch and Produce) and answers
//! topic questions from a KRaft cluster metadata log.
//!
//! - [`protocol`] - request decoding and response encoding
//! - [`metadata`] - metadata log decoding and the topic index built from it
//! - [`storage`] - partition log files
//! - [`broker`] - TCP server and request processing
//! - [`config`] - broker settings from defaults, environment and CLI
//! - [`metrics`] - connection and request counters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kraftmq::{BrokerConfig, BrokerServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BrokerConfig::from_env()?;
//!     let server = BrokerServer::new(config)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod broker;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod protocol;
pub mod storage;

pub use broker::{BrokerServer, RequestProcessor};
pub use config::BrokerConfig;
pub use metadata::{MetadataIndex, MetadataLogError, MetadataLookup};
pub use metrics::{BrokerMetrics, MetricsSnapshot};
pub use protocol::kafka::{KafkaCodec, KafkaCodecError, RequestEnvelope, ResponseEnvelope};
pub use storage::{DiskLogStorage, InMemoryLogStorage, LogStorage};

use thiserror::Error;

/// kraftmq error types
///
/// # Example
///
/// ```rust,no_run
/// use kraftmq::{KraftmqError, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(()) => println!("Success"),
///         Err(KraftmqError::Storage(e)) => println!("Storage error: {}", e),
///         Err(KraftmqError::Network(msg)) => println!("Network error: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum KraftmqError {
    /// File I/O and socket errors
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    /// Invalid settings from the environment or command line
    #[error("Configuration error: {0}")]
    Config(String),

    /// Kafka wire protocol codec errors
    #[error("Kafka codec error: {0}")]
    KafkaCodec(#[from] protocol::kafka::KafkaCodecError),

    #[error("Metadata log error: {0}")]
    MetadataLog(#[from] metadata::MetadataLogError),
}

/// Result type alias for kraftmq operations
pub type Result<T> = std::result::Result<T, KraftmqError>;
