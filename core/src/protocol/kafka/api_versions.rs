//! Kafka API Version Support
//!
//! The static catalogue advertised in every ApiVersions response.

use super::{
    API_KEY_API_VERSIONS, API_KEY_DESCRIBE_TOPIC_PARTITIONS, API_KEY_FETCH, API_KEY_PRODUCE,
};

/// Highest ApiVersions request version this broker answers without error.
pub const MAX_API_VERSIONS_VERSION: u16 = 4;

/// Supported version range for one API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersionInfo {
    pub api_key: u16,
    pub min_version: u16,
    pub max_version: u16,
}

impl ApiVersionInfo {
    pub const fn new(api_key: u16, min_version: u16, max_version: u16) -> Self {
        Self {
            api_key,
            min_version,
            max_version,
        }
    }
}

pub const SUPPORTED_APIS: [ApiVersionInfo; 4] = [
    ApiVersionInfo::new(API_KEY_API_VERSIONS, 0, MAX_API_VERSIONS_VERSION),
    ApiVersionInfo::new(API_KEY_DESCRIBE_TOPIC_PARTITIONS, 0, 0),
    ApiVersionInfo::new(API_KEY_FETCH, 0, 16),
    ApiVersionInfo::new(API_KEY_PRODUCE, 0, 11),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_ranges() {
        let ranges: Vec<(u16, u16, u16)> = SUPPORTED_APIS
            .iter()
            .map(|info| (info.api_key, info.min_version, info.max_version))
            .collect();
        assert_eq!(ranges, vec![(18, 0, 4), (75, 0, 0), (1, 0, 16), (0, 0, 11)]);
    }
}
