use cobasket_core::config::AppConfig;
use cobasket_core::mining::RuleSet;
use serde::Serialize;

use super::{mine, CommandResult, RunArgs};

#[derive(Debug, Serialize)]
struct RulesReport<'a> {
    users: usize,
    min_support: f64,
    min_confidence: f64,
    min_lift: f64,
    max_itemset_size: usize,
    rule_count: usize,
    rules: &'a RuleSet,
}

pub fn run(config: &AppConfig, args: &RunArgs) -> CommandResult {
    let session = match mine(config, args) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error("rules", &error),
    };

    CommandResult::data(
        "rules",
        &RulesReport {
            users: session.matrix.len(),
            min_support: config.mining.min_support,
            min_confidence: config.mining.min_confidence,
            min_lift: config.mining.min_lift,
            max_itemset_size: config.mining.max_itemset_size,
            rule_count: session.rules.len(),
            rules: &session.rules,
        },
    )
}
