//! Kafka Error Codes
//!
//! The subset of protocol error codes this broker can put on the wire.
//! Domain failures (unknown topic, unsupported version) are reported through
//! these codes inside a well-formed response, never as a dropped connection.

/// Kafka protocol error codes (values match the official protocol)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum KafkaErrorCode {
    NoError = 0,
    UnknownTopicOrPartition = 3,
    UnsupportedVersion = 35,
    UnknownTopicId = 100,
}

impl KafkaErrorCode {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn message(self) -> &'static str {
        match self {
            KafkaErrorCode::NoError => "No error",
            KafkaErrorCode::UnknownTopicOrPartition => "The topic or partition does not exist",
            KafkaErrorCode::UnsupportedVersion => "The version of API is not supported",
            KafkaErrorCode::UnknownTopicId => "This server does not host this topic ID",
        }
    }
}

impl std::fmt::Display for KafkaErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.as_i16())
    }
}
