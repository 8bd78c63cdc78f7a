use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{CategoryId, Observation, ServiceId};

/// How often one (service, category) pair appears in the raw observations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceUsage {
    pub service_id: ServiceId,
    pub category_id: CategoryId,
    pub frequency: usize,
}

/// Observation counts per (service, category), most frequent first.
///
/// Counts raw observations, so a user buying the same service twice counts
/// twice. Ties are ordered by service then category.
pub fn service_frequency(observations: &[Observation]) -> Vec<ServiceUsage> {
    let mut counts: HashMap<(&ServiceId, &CategoryId), usize> = HashMap::new();
    for observation in observations {
        *counts.entry((&observation.service_id, &observation.category_id)).or_default() += 1;
    }

    let mut usage: Vec<ServiceUsage> = counts
        .into_iter()
        .map(|((service_id, category_id), frequency)| ServiceUsage {
            service_id: service_id.clone(),
            category_id: category_id.clone(),
            frequency,
        })
        .collect();
    usage.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.service_id.cmp(&b.service_id))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    usage
}

/// Month -> service -> observation count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MonthlyUsage(BTreeMap<u32, BTreeMap<ServiceId, usize>>);

impl MonthlyUsage {
    pub fn get(&self, month: u32, service: &ServiceId) -> usize {
        self.0.get(&month).and_then(|services| services.get(service)).copied().unwrap_or(0)
    }

    pub fn months(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    pub fn services_in(&self, month: u32) -> impl Iterator<Item = (&ServiceId, usize)> {
        self.0.get(&month).into_iter().flatten().map(|(service, &count)| (service, count))
    }
}

/// `None` when no observation carries a date. Undated observations in an
/// otherwise dated set are skipped.
pub fn monthly_usage(observations: &[Observation]) -> Option<MonthlyUsage> {
    let mut table: BTreeMap<u32, BTreeMap<ServiceId, usize>> = BTreeMap::new();
    for observation in observations {
        if let Some(month) = observation.month() {
            *table.entry(month).or_default().entry(observation.service_id.clone()).or_default() += 1;
        }
    }

    if table.is_empty() {
        None
    } else {
        Some(MonthlyUsage(table))
    }
}
