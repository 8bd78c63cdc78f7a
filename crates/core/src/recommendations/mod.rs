//! Cross-sell Recommendation Engine
//!
//! Read-only queries over a mined [`RuleSet`](crate::mining::RuleSet): by
//! service, by category, by calendar month, by a user's purchase history, and
//! bundle extraction.

mod engine;
mod tables;
mod types;

pub use engine::RecommendationEngine;
pub use tables::{CategoryLookup, RuleIndex, SeasonalIndex};
pub use types::*;

/// Default number of rules returned per query
pub const DEFAULT_TOP_N: usize = 5;

/// Minimum confidence for a rule to become a bundle
pub const DEFAULT_BUNDLE_MIN_CONFIDENCE: f64 = 0.3;

/// Minimum lift for a rule to become a bundle
pub const DEFAULT_BUNDLE_MIN_LIFT: f64 = 2.0;

/// Largest bundle, antecedent plus consequent
pub const DEFAULT_MAX_BUNDLE_SIZE: usize = 3;
