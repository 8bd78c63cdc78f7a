//! Recommendation Engine implementation

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::tables::{CategoryLookup, RuleIndex, SeasonalIndex};
use super::types::*;
use crate::domain::{CategoryId, Item, Observation, UserId};
use crate::mining::{Rule, RuleSet, TransactionMatrix};

/// Queries over one immutable rule-set snapshot and its side tables.
///
/// Cloning is cheap and every query takes `&self`, so one engine can serve any
/// number of concurrent readers. A new snapshot means building a new engine.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    state: Arc<EngineState>,
}

#[derive(Debug)]
struct EngineState {
    rules: RuleSet,
    index: RuleIndex,
    categories: CategoryLookup,
    seasons: Option<SeasonalIndex>,
    history: TransactionMatrix,
}

impl RecommendationEngine {
    /// Build the engine and all side tables from the run's raw observations.
    pub fn new(rules: RuleSet, history: TransactionMatrix, observations: &[Observation]) -> Self {
        Self::from_parts(
            rules,
            history,
            CategoryLookup::from_observations(observations),
            SeasonalIndex::from_observations(observations),
        )
    }

    pub fn from_parts(
        rules: RuleSet,
        history: TransactionMatrix,
        categories: CategoryLookup,
        seasons: Option<SeasonalIndex>,
    ) -> Self {
        let index = RuleIndex::build(&rules);
        Self { state: Arc::new(EngineState { rules, index, categories, seasons, history }) }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.state.rules
    }

    pub fn categories(&self) -> &CategoryLookup {
        &self.state.categories
    }

    pub fn seasons(&self) -> Option<&SeasonalIndex> {
        self.state.seasons.as_ref()
    }

    /// Rules whose antecedent contains `item` and that pass both thresholds.
    pub fn by_service(&self, item: &Item, query: ServiceQuery) -> Vec<&Rule> {
        self.state
            .index
            .with_item(item)
            .iter()
            .map(|&position| &self.state.rules.as_slice()[position])
            .filter(|rule| rule.confidence >= query.min_confidence && rule.lift >= query.min_lift)
            .take(query.top_n)
            .collect()
    }

    /// Rules whose antecedent contains any service offered in `category`.
    pub fn by_category(&self, category: &CategoryId, top_n: usize) -> Vec<&Rule> {
        let positions: BTreeSet<usize> = self
            .state
            .categories
            .services_in(category)
            .flat_map(|service| self.state.index.with_service(service).iter().copied())
            .collect();

        self.ranked(positions).take(top_n).collect()
    }

    /// Rules triggered by the `top_n` most purchased items of `month`.
    ///
    /// `None` when the source data carried no dates.
    pub fn by_season(&self, month: u32, top_n: usize) -> Option<Vec<&Rule>> {
        let seasons = self.state.seasons.as_ref()?;

        let positions: BTreeSet<usize> = seasons
            .popular_items(month, top_n)
            .into_iter()
            .flat_map(|(item, _)| self.state.index.with_item(item).iter().copied())
            .collect();

        Some(self.ranked(positions).take(top_n).collect())
    }

    /// Rules triggered by anything the user has bought, keeping the strongest
    /// rule per distinct consequent.
    ///
    /// `None` when the user has no recorded purchases.
    pub fn by_user(&self, user: &UserId, top_n: usize) -> Option<Vec<&Rule>> {
        let purchases = self.state.history.get(user).filter(|transaction| !transaction.is_empty())?;

        let positions: BTreeSet<usize> = purchases
            .items()
            .flat_map(|item| self.state.index.with_item(item).iter().copied())
            .collect();

        let mut seen: HashSet<&[Item]> = HashSet::new();
        let rules = self
            .ranked(positions)
            .filter(|&rule| seen.insert(rule.consequent.as_slice()))
            .take(top_n)
            .collect();

        Some(rules)
    }

    /// Rules that pass both thresholds and fit in `max_bundle_size` items.
    pub fn bundles(&self, query: BundleQuery) -> Vec<Bundle> {
        self.state
            .rules
            .iter()
            .filter(|rule| rule.confidence >= query.min_confidence && rule.lift >= query.min_lift)
            .filter(|rule| rule.size() <= query.max_bundle_size)
            .map(Bundle::from)
            .collect()
    }

    fn ranked(&self, positions: BTreeSet<usize>) -> impl Iterator<Item = &Rule> + '_ {
        positions.into_iter().filter_map(|position| self.state.rules.get(position))
    }
}
