//! Read-only lookup tables built once alongside a rule set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{CategoryId, Item, Observation, ServiceId};
use crate::mining::RuleSet;

/// Positions (into a [`RuleSet`]) of the rules whose antecedent mentions an item.
///
/// Position lists are ascending, so they are already in lift order.
#[derive(Clone, Debug, Default)]
pub struct RuleIndex {
    by_item: HashMap<Item, Vec<usize>>,
    by_service: HashMap<ServiceId, Vec<usize>>,
}

impl RuleIndex {
    pub fn build(rules: &RuleSet) -> Self {
        let mut index = Self::default();
        for (position, rule) in rules.iter().enumerate() {
            for item in &rule.antecedent {
                index.by_item.entry(item.clone()).or_default().push(position);

                let by_service = index.by_service.entry(item.service().clone()).or_default();
                // Two items of one service can share an antecedent.
                if by_service.last() != Some(&position) {
                    by_service.push(position);
                }
            }
        }
        index
    }

    pub fn with_item(&self, item: &Item) -> &[usize] {
        self.by_item.get(item).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn with_service(&self, service: &ServiceId) -> &[usize] {
        self.by_service.get(service).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Service <-> category membership as observed in the raw data.
#[derive(Clone, Debug, Default)]
pub struct CategoryLookup {
    services_by_category: HashMap<CategoryId, BTreeSet<ServiceId>>,
    categories_by_service: HashMap<ServiceId, BTreeSet<CategoryId>>,
}

impl CategoryLookup {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut lookup = Self::default();
        for observation in observations {
            lookup.insert(observation.service_id.clone(), observation.category_id.clone());
        }
        lookup
    }

    pub fn insert(&mut self, service: ServiceId, category: CategoryId) {
        self.services_by_category.entry(category.clone()).or_default().insert(service.clone());
        self.categories_by_service.entry(service).or_default().insert(category);
    }

    pub fn services_in(&self, category: &CategoryId) -> impl Iterator<Item = &ServiceId> {
        self.services_by_category.get(category).into_iter().flatten()
    }

    pub fn categories_of(&self, service: &ServiceId) -> impl Iterator<Item = &CategoryId> {
        self.categories_by_service.get(service).into_iter().flatten()
    }
}

/// Per-month purchase counts of each item, from dated observations.
#[derive(Clone, Debug, Default)]
pub struct SeasonalIndex {
    monthly: BTreeMap<u32, HashMap<Item, usize>>,
}

impl SeasonalIndex {
    /// `None` when no observation carries a date.
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        let mut index = Self::default();
        let mut dated = false;
        for observation in observations {
            let Some(month) = observation.month() else {
                continue;
            };
            dated = true;
            *index.monthly.entry(month).or_default().entry(observation.item()).or_default() += 1;
        }
        dated.then_some(index)
    }

    /// The `top_n` most purchased items in `month`, by count then item.
    pub fn popular_items(&self, month: u32, top_n: usize) -> Vec<(&Item, usize)> {
        let Some(counts) = self.monthly.get(&month) else {
            return Vec::new();
        };

        let mut ranked: Vec<(&Item, usize)> = counts.iter().map(|(item, &count)| (item, count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(top_n);
        ranked
    }

    pub fn months(&self) -> impl Iterator<Item = u32> + '_ {
        self.monthly.keys().copied()
    }
}
