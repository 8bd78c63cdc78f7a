//! Frequent-itemset mining and association rule derivation.
//!
//! Data flows one way: observations -> [`TransactionMatrix`] ->
//! [`FrequentItemsets`] -> [`RuleSet`]. Every stage is a pure, synchronous
//! computation over its input.

mod apriori;
mod matrix;
mod rules;

pub use apriori::{FrequentItemsetMiner, FrequentItemsets, Itemset};
pub use matrix::{Transaction, TransactionMatrix, TransactionMatrixBuilder};
pub use rules::{Rule, RuleGenerator, RuleSet};

use crate::errors::MiningError;

/// Default minimum support ratio.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;

/// Default minimum confidence.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;

/// Default lift floor: only positively correlated rules are exposed.
pub const DEFAULT_MIN_LIFT: f64 = 1.0;

/// Thresholds for one end-to-end mining run.
#[derive(Clone, Debug, PartialEq)]
pub struct MiningOptions {
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    /// `None` searches until no candidates survive.
    pub max_itemset_size: Option<usize>,
    /// Turn an empty set of frequent itemsets into an error.
    pub require_rules: bool,
}

impl Default for MiningOptions {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_lift: DEFAULT_MIN_LIFT,
            max_itemset_size: None,
            require_rules: false,
        }
    }
}

/// Mines frequent itemsets and derives the rules that pass both thresholds.
pub fn mine_and_generate_rules(
    matrix: &TransactionMatrix,
    min_support: f64,
    min_confidence: f64,
    min_lift: f64,
) -> Result<RuleSet, MiningError> {
    mine_rules(
        matrix,
        &MiningOptions { min_support, min_confidence, min_lift, ..MiningOptions::default() },
    )
}

pub fn mine_rules(matrix: &TransactionMatrix, options: &MiningOptions) -> Result<RuleSet, MiningError> {
    validate_unit_interval("min_confidence", options.min_confidence)?;
    validate_min_lift(options.min_lift)?;

    let miner = match options.max_itemset_size {
        Some(max) => FrequentItemsetMiner::with_max_itemset_size(max),
        None => FrequentItemsetMiner::new(),
    };
    let frequent = miner.mine(matrix, options.min_support)?;

    let rules = RuleGenerator::new(options.min_confidence)
        .min_lift(options.min_lift)
        .require_non_empty(options.require_rules)
        .generate(&frequent)?;

    tracing::info!(
        event_name = "mining.rules.generated",
        transactions = matrix.len(),
        frequent_itemsets = frequent.len(),
        rules = rules.len(),
        min_support = options.min_support,
        min_confidence = options.min_confidence,
        min_lift = options.min_lift,
        "rule set generated"
    );

    Ok(rules)
}

pub(crate) fn validate_min_support(value: f64) -> Result<(), MiningError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::InvalidThreshold {
            name: "min_support",
            value,
            expected: "must be in (0, 1]",
        })
    }
}

pub(crate) fn validate_unit_interval(name: &'static str, value: f64) -> Result<(), MiningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MiningError::InvalidThreshold { name, value, expected: "must be in [0, 1]" })
    }
}

pub(crate) fn validate_min_lift(value: f64) -> Result<(), MiningError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(MiningError::InvalidThreshold {
            name: "min_lift",
            value,
            expected: "must be zero or greater",
        })
    }
}
