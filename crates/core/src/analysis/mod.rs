//! Usage analysis, business insights and the item relationship network.
//!
//! Everything here produces plain data; rendering is left to callers.

mod insights;
mod network;
mod usage;

pub use insights::{InsightThresholds, Insights, ServiceCount};
pub use network::{NetworkEdge, ServiceNetwork};
pub use usage::{monthly_usage, service_frequency, MonthlyUsage, ServiceUsage};

/// Default lift floor for network edges
pub const DEFAULT_NETWORK_MIN_LIFT: f64 = 1.0;

/// Default number of rules turned into network edges
pub const DEFAULT_MAX_CONNECTIONS: usize = 50;
