//! Types for the Recommendation Engine

use serde::{Deserialize, Serialize};

use crate::domain::Item;
use crate::mining::Rule;

/// A package of items proposed together from one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Antecedent items followed by consequent items
    pub items: Vec<Item>,
    /// Confidence of the source rule
    pub confidence: f64,
    /// Lift of the source rule
    pub lift: f64,
}

impl From<&Rule> for Bundle {
    fn from(rule: &Rule) -> Self {
        Self { items: rule.items().cloned().collect(), confidence: rule.confidence, lift: rule.lift }
    }
}

/// Thresholds for service-driven recommendations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceQuery {
    /// Maximum number of rules to return
    pub top_n: usize,
    /// Minimum rule confidence (default: 0.1)
    pub min_confidence: f64,
    /// Minimum rule lift (default: 1.0)
    pub min_lift: f64,
}

impl Default for ServiceQuery {
    fn default() -> Self {
        Self {
            top_n: super::DEFAULT_TOP_N,
            min_confidence: crate::mining::DEFAULT_MIN_CONFIDENCE,
            min_lift: crate::mining::DEFAULT_MIN_LIFT,
        }
    }
}

/// Thresholds for bundle extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BundleQuery {
    /// Minimum rule confidence (default: 0.3)
    pub min_confidence: f64,
    /// Minimum rule lift (default: 2.0)
    pub min_lift: f64,
    /// Largest bundle, counting antecedent and consequent items (default: 3)
    pub max_bundle_size: usize,
}

impl Default for BundleQuery {
    fn default() -> Self {
        Self {
            min_confidence: super::DEFAULT_BUNDLE_MIN_CONFIDENCE,
            min_lift: super::DEFAULT_BUNDLE_MIN_LIFT,
            max_bundle_size: super::DEFAULT_MAX_BUNDLE_SIZE,
        }
    }
}
