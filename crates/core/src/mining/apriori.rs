//! Level-wise Apriori search for frequent itemsets.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use super::matrix::TransactionMatrix;
use super::validate_min_support;
use crate::domain::Item;
use crate::errors::MiningError;

/// A set of items together with how many transactions contain all of them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Itemset {
    items: Vec<Item>,
    support_count: usize,
    support: f64,
}

impl Itemset {
    /// Items in ascending order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn support_count(&self) -> usize {
        self.support_count
    }

    pub fn support(&self) -> f64 {
        self.support
    }
}

/// Output of one mining run, ordered by size and then lexicographically.
#[derive(Clone, Debug, Default)]
pub struct FrequentItemsets {
    itemsets: Vec<Itemset>,
    transaction_count: usize,
    min_support: f64,
    lookup: HashMap<Vec<Item>, usize>,
}

impl FrequentItemsets {
    fn new(itemsets: Vec<Itemset>, transaction_count: usize, min_support: f64) -> Self {
        let lookup = itemsets
            .iter()
            .enumerate()
            .map(|(index, itemset)| (itemset.items.clone(), index))
            .collect();
        Self { itemsets, transaction_count, min_support, lookup }
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// The support threshold these itemsets were mined at.
    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    pub fn iter(&self) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter()
    }

    pub fn of_size(&self, size: usize) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter().filter(move |itemset| itemset.len() == size)
    }

    /// Looks up a frequent itemset by its items. `items` must be sorted.
    pub fn get(&self, items: &[Item]) -> Option<&Itemset> {
        self.lookup.get(items).map(|&index| &self.itemsets[index])
    }

    pub fn max_size(&self) -> usize {
        self.itemsets.last().map(Itemset::len).unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrequentItemsetMiner {
    max_itemset_size: Option<usize>,
}

impl FrequentItemsetMiner {
    /// A miner without an itemset size cap.
    pub fn new() -> Self {
        Self { max_itemset_size: None }
    }

    pub fn with_max_itemset_size(max_itemset_size: usize) -> Self {
        Self { max_itemset_size: Some(max_itemset_size) }
    }

    pub fn mine(
        &self,
        matrix: &TransactionMatrix,
        min_support: f64,
    ) -> Result<FrequentItemsets, MiningError> {
        validate_min_support(min_support)?;
        if self.max_itemset_size == Some(0) {
            return Err(MiningError::InvalidThreshold {
                name: "max_itemset_size",
                value: 0.0,
                expected: "must be at least 1",
            });
        }
        if matrix.is_empty() {
            return Err(MiningError::EmptyInput);
        }

        let total = matrix.len();
        let vocabulary: Vec<Item> = matrix
            .transactions()
            .iter()
            .flat_map(|transaction| transaction.items().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let codes: HashMap<&Item, u32> =
            vocabulary.iter().enumerate().map(|(code, item)| (item, code as u32)).collect();

        // Vocabulary codes follow item order, so encoded baskets stay sorted.
        let baskets: Vec<Vec<u32>> = matrix
            .transactions()
            .iter()
            .map(|transaction| transaction.items().map(|item| codes[item]).collect())
            .collect();

        let is_frequent = |count: usize| count as f64 / total as f64 >= min_support;

        let mut single_counts = vec![0usize; vocabulary.len()];
        for basket in &baskets {
            for &code in basket {
                single_counts[code as usize] += 1;
            }
        }

        let mut level: Vec<(Vec<u32>, usize)> = single_counts
            .iter()
            .enumerate()
            .filter(|(_, count)| is_frequent(**count))
            .map(|(code, &count)| (vec![code as u32], count))
            .collect();

        tracing::debug!(
            event_name = "mining.apriori.level",
            size = 1,
            candidates = vocabulary.len(),
            frequent = level.len(),
            "apriori level complete"
        );

        let mut frequent: Vec<(Vec<u32>, usize)> = Vec::new();
        let mut size = 1;
        while !level.is_empty() {
            let candidates = if self.max_itemset_size.is_some_and(|max| size >= max) {
                Vec::new()
            } else {
                generate_candidates(&level)
            };
            frequent.append(&mut level);
            if candidates.is_empty() {
                break;
            }
            size += 1;

            let candidate_count = candidates.len();
            level = candidates
                .into_iter()
                .map(|candidate| {
                    let count = baskets
                        .iter()
                        .filter(|basket| basket.len() >= size && contains_all(basket, &candidate))
                        .count();
                    (candidate, count)
                })
                .filter(|(_, count)| is_frequent(*count))
                .collect();

            tracing::debug!(
                event_name = "mining.apriori.level",
                size,
                candidates = candidate_count,
                frequent = level.len(),
                "apriori level complete"
            );
        }

        let itemsets = frequent
            .into_iter()
            .map(|(codes, count)| Itemset {
                items: codes.iter().map(|&code| vocabulary[code as usize].clone()).collect(),
                support_count: count,
                support: count as f64 / total as f64,
            })
            .collect();

        Ok(FrequentItemsets::new(itemsets, total, min_support))
    }
}

/// Joins frequent (k-1)-itemsets sharing their first k-2 items, then drops any
/// candidate with an infrequent (k-1)-subset.
///
/// `level` must be sorted lexicographically; the output is as well.
fn generate_candidates(level: &[(Vec<u32>, usize)]) -> Vec<Vec<u32>> {
    let known: HashSet<&[u32]> = level.iter().map(|(items, _)| items.as_slice()).collect();
    let mut candidates = Vec::new();

    for (index, (left, _)) in level.iter().enumerate() {
        let prefix = &left[..left.len() - 1];
        for (right, _) in &level[index + 1..] {
            if &right[..right.len() - 1] != prefix {
                break;
            }

            let mut candidate = left.clone();
            candidate.push(right[right.len() - 1]);

            if all_subsets_frequent(&candidate, &known) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

fn all_subsets_frequent(candidate: &[u32], known: &HashSet<&[u32]>) -> bool {
    // Dropping either of the last two items yields one of the joined parents.
    (0..candidate.len().saturating_sub(2)).all(|skip| {
        let subset: Vec<u32> = candidate
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != skip)
            .map(|(_, &code)| code)
            .collect();
        known.contains(subset.as_slice())
    })
}

/// Both slices sorted ascending.
fn contains_all(basket: &[u32], candidate: &[u32]) -> bool {
    let mut basket = basket.iter();
    candidate.iter().all(|wanted| basket.by_ref().any(|code| code == wanted))
}
