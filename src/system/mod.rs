//! System utilities and monitoring

/// Per-store Prometheus collectors
pub mod metrics;

pub use metrics::StoreMetrics;
