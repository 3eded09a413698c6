//! Dashboard display data.

pub mod metrics;

pub use metrics::{synthesize_business_metrics, BusinessMetrics};
