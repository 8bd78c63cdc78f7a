//! Association rule derivation from frequent itemsets.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::apriori::{FrequentItemsets, Itemset};
use super::{validate_min_lift, validate_unit_interval};
use crate::domain::Item;
use crate::errors::MiningError;

/// A directional association `antecedent -> consequent` split from one frequent itemset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rule {
    pub antecedent: Vec<Item>,
    pub consequent: Vec<Item>,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    /// `None` when confidence is 1 and conviction is unbounded.
    pub conviction: Option<f64>,
}

impl Rule {
    fn from_split(whole: &Itemset, antecedent: &Itemset, consequent: &Itemset, total: usize) -> Self {
        let total = total as f64;
        let joint = whole.support_count() as f64;
        let antecedent_count = antecedent.support_count() as f64;
        let consequent_count = consequent.support_count() as f64;

        let support = whole.support();
        let confidence = joint / antecedent_count;
        // Written over raw counts so that A->B and B->A produce bit-identical lift.
        let lift = (joint * total) / (antecedent_count * consequent_count);
        let leverage = support - antecedent.support() * consequent.support();
        let conviction = (confidence < 1.0).then(|| (1.0 - consequent.support()) / (1.0 - confidence));

        Self {
            antecedent: antecedent.items().to_vec(),
            consequent: consequent.items().to_vec(),
            antecedent_support: antecedent.support(),
            consequent_support: consequent.support(),
            support,
            confidence,
            lift,
            leverage,
            conviction,
        }
    }

    pub fn antecedent_contains(&self, item: &Item) -> bool {
        self.antecedent.binary_search(item).is_ok()
    }

    /// Antecedent items followed by consequent items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.antecedent.iter().chain(self.consequent.iter())
    }

    pub fn size(&self) -> usize {
        self.antecedent.len() + self.consequent.len()
    }
}

/// Rules of one mining run sorted by lift, then confidence, then generation order.
///
/// Cloning shares the underlying storage; the set is never mutated after creation.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Arc<[Rule]>,
}

impl RuleSet {
    pub fn from_rules(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| {
            b.lift.total_cmp(&a.lift).then_with(|| b.confidence.total_cmp(&a.confidence))
        });
        Self { rules: rules.into() }
    }

    pub fn empty() -> Self {
        Self { rules: Arc::from(Vec::new()) }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Rule> {
        self.rules.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    /// A new snapshot holding only rules with `lift >= min_lift`, order preserved.
    pub fn with_min_lift(&self, min_lift: f64) -> Self {
        let kept: Vec<Rule> = self.rules.iter().filter(|rule| rule.lift >= min_lift).cloned().collect();
        Self { rules: kept.into() }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for RuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.rules[..] == other.rules[..]
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rules.iter())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Expands frequent itemsets into rules, keeping those that reach `min_confidence`.
///
/// Lift is only filtered when a floor is set with [`RuleGenerator::min_lift`].
#[derive(Clone, Debug)]
pub struct RuleGenerator {
    min_confidence: f64,
    min_lift: Option<f64>,
    require_non_empty: bool,
}

impl RuleGenerator {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence, min_lift: None, require_non_empty: false }
    }

    pub fn min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = Some(min_lift);
        self
    }

    /// Fail with [`MiningError::NoFrequentItemsets`] instead of returning an empty set
    /// when there is nothing to derive rules from.
    pub fn require_non_empty(mut self, required: bool) -> Self {
        self.require_non_empty = required;
        self
    }

    pub fn generate(&self, frequent: &FrequentItemsets) -> Result<RuleSet, MiningError> {
        validate_unit_interval("min_confidence", self.min_confidence)?;
        if let Some(min_lift) = self.min_lift {
            validate_min_lift(min_lift)?;
        }

        if frequent.is_empty() {
            if self.require_non_empty {
                return Err(MiningError::NoFrequentItemsets {
                    min_support: frequent.min_support(),
                });
            }
            return Ok(RuleSet::empty());
        }

        let total = frequent.transaction_count();
        let mut rules = Vec::new();

        for whole in frequent.iter().filter(|itemset| itemset.len() >= 2) {
            let items = whole.items();
            if items.len() >= u64::BITS as usize {
                tracing::warn!(
                    event_name = "mining.rules.itemset_skipped",
                    size = items.len(),
                    "itemset too large to split into rules"
                );
                continue;
            }

            let full_mask = (1u64 << items.len()) - 1;
            for mask in 1..full_mask {
                let (antecedent, consequent) = split_by_mask(items, mask);
                let (Some(antecedent), Some(consequent)) =
                    (frequent.get(&antecedent), frequent.get(&consequent))
                else {
                    continue;
                };

                let rule = Rule::from_split(whole, antecedent, consequent, total);
                let lift_ok = self.min_lift.map_or(true, |min_lift| rule.lift >= min_lift);
                if rule.confidence >= self.min_confidence && lift_ok {
                    rules.push(rule);
                }
            }
        }

        Ok(RuleSet::from_rules(rules))
    }
}

fn split_by_mask(items: &[Item], mask: u64) -> (Vec<Item>, Vec<Item>) {
    let mut antecedent = Vec::new();
    let mut consequent = Vec::new();
    for (position, item) in items.iter().enumerate() {
        if mask & (1 << position) != 0 {
            antecedent.push(item.clone());
        } else {
            consequent.push(item.clone());
        }
    }
    (antecedent, consequent)
}
