//! # Broker Metrics
//!
//! Lock-free counters updated on the connection hot path and logged when
//! connections close and at shutdown.
//!
//! ```rust,no_run
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! // Hot path: a relaxed atomic increment per event
//! let requests = AtomicU64::new(0);
//! requests.fetch_add(1, Ordering::Relaxed);
//! ```

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Keeps the two hottest counters on separate cache lines.
#[repr(align(64))]
#[derive(Debug, Default)]
struct CacheLineAligned<T>(T);

#[derive(Debug, Default)]
pub struct BrokerMetrics {
    active_connections: CacheLineAligned<AtomicUsize>,
    total_requests: CacheLineAligned<AtomicU64>,
    total_connections: AtomicU64,
    decode_errors: AtomicU64,
    produce_failures: AtomicU64,
}

/// Point-in-time copy of [`BrokerMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub active_connections: usize,
    pub total_connections: u64,
    pub total_requests: u64,
    pub decode_errors: u64,
    pub produce_failures: u64,
}

impl BrokerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn connection_opened(&self) {
        self.active_connections.0.fetch_add(1, Ordering::AcqRel);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn connection_closed(&self) {
        self.active_connections.0.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline(always)]
    pub fn request_received(&self) {
        self.total_requests.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn produce_failure(&self) {
        self.produce_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn active_connections(&self) -> usize {
        self.active_connections.0.load(Ordering::Acquire)
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.0.load(Ordering::Relaxed)
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_connections: self.active_connections(),
            total_connections: self.total_connections.load(Ordering::Relaxed),
            total_requests: self.total_requests(),
            decode_errors: self.decode_errors(),
            produce_failures: self.produce_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_gauge() {
        let metrics = BrokerMetrics::new();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active_connections, 1);
        assert_eq!(snapshot.total_connections, 2);
    }

    #[test]
    fn test_request_and_error_counters() {
        let metrics = BrokerMetrics::new();
        metrics.request_received();
        metrics.request_received();
        metrics.decode_error();
        metrics.produce_failure();

        assert_eq!(metrics.total_requests(), 2);
        assert_eq!(metrics.decode_errors(), 1);
        assert_eq!(metrics.snapshot().produce_failures, 1);
    }
}
