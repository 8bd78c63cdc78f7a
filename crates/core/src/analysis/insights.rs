use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Observation, ServiceId};
use crate::mining::{Rule, RuleSet};

/// Cut-offs used when summarising a rule set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsightThresholds {
    /// Strictly greater lift marks a strong relationship (default: 2.0)
    pub strong_lift: f64,
    /// Strictly lower support marks a niche opportunity (default: 0.05)
    pub opportunity_max_support: f64,
    /// Strictly greater confidence marks a niche opportunity (default: 0.5)
    pub opportunity_min_confidence: f64,
    /// Rules kept per list (default: 5)
    pub top_n: usize,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self { strong_lift: 2.0, opportunity_max_support: 0.05, opportunity_min_confidence: 0.5, top_n: 5 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub service_id: ServiceId,
    pub observations: usize,
}

/// Business-facing summary of a rule set and the usage behind it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insights {
    /// High-lift rules, most confident first
    pub strong_relationships: Vec<Rule>,
    /// Rare but reliable rules, in rule-set order
    pub opportunities: Vec<Rule>,
    pub most_used_service: Option<ServiceCount>,
    pub least_used_service: Option<ServiceCount>,
}

impl Insights {
    pub fn derive(observations: &[Observation], rules: &RuleSet) -> Self {
        Self::derive_with(observations, rules, &InsightThresholds::default())
    }

    pub fn derive_with(observations: &[Observation], rules: &RuleSet, thresholds: &InsightThresholds) -> Self {
        let mut strong_relationships: Vec<Rule> =
            rules.iter().filter(|rule| rule.lift > thresholds.strong_lift).cloned().collect();
        // Stable: equal confidence keeps lift order.
        strong_relationships.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        strong_relationships.truncate(thresholds.top_n);

        let opportunities = rules
            .iter()
            .filter(|rule| {
                rule.support < thresholds.opportunity_max_support
                    && rule.confidence > thresholds.opportunity_min_confidence
            })
            .take(thresholds.top_n)
            .cloned()
            .collect();

        let (most_used_service, least_used_service) = usage_extremes(observations);

        Self { strong_relationships, opportunities, most_used_service, least_used_service }
    }
}

/// Most and least observed services; ties go to the smaller service id.
fn usage_extremes(observations: &[Observation]) -> (Option<ServiceCount>, Option<ServiceCount>) {
    let mut counts: HashMap<&ServiceId, usize> = HashMap::new();
    for observation in observations {
        *counts.entry(&observation.service_id).or_default() += 1;
    }

    let most = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(service, &count)| ServiceCount { service_id: (*service).clone(), observations: count });
    let least = counts
        .iter()
        .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(service, &count)| ServiceCount { service_id: (*service).clone(), observations: count });

    (most, least)
}
