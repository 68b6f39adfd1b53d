pub mod settings;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::protocol::kafka::codec::DEFAULT_MAX_FRAME_BYTES;
use crate::storage::DEFAULT_LOG_DIR;

pub const DEFAULT_METADATA_LOG_PATH: &str =
    "/tmp/kraft-combined-logs/__cluster_metadata-0/00000000000000000000.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// KRaft metadata log segment read once at startup.
    pub metadata_log_path: PathBuf,
    /// Root directory of the partition logs.
    pub log_dir: PathBuf,
    /// Largest request frame accepted, size prefix excluded.
    pub max_frame_bytes: usize,
    /// Initial read buffer per connection.
    pub read_buffer_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9092,
            metadata_log_path: PathBuf::from(DEFAULT_METADATA_LOG_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            read_buffer_size: 8192,
        }
    }
}

impl BrokerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_metadata_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_log_path = path.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.max_frame_bytes == 0 {
            return Err("max_frame_bytes must be > 0".to_string());
        }
        if self.max_frame_bytes > i32::MAX as usize {
            return Err(
                "max_frame_bytes must fit in a signed 32-bit frame length".to_string(),
            );
        }
        if self.read_buffer_size == 0 {
            return Err("read_buffer_size must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BrokerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:9092");
        assert_eq!(config.log_dir, PathBuf::from("/tmp/kraft-combined-logs"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BrokerConfig::default();
        config.max_frame_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = BrokerConfig::default();
        config.read_buffer_size = 0;
        assert!(config.validate().is_err());

        assert!(BrokerConfig::default().with_host("").validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = BrokerConfig::default()
            .with_host("127.0.0.1")
            .with_port(19092)
            .with_log_dir("/var/lib/kraftmq");
        assert_eq!(config.bind_address(), "127.0.0.1:19092");
        assert_eq!(config.log_dir, PathBuf::from("/var/lib/kraftmq"));
    }
}
