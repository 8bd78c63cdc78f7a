use cobasket_core::analysis::{
    monthly_usage, service_frequency, Insights, MonthlyUsage, ServiceNetwork, ServiceUsage,
};
use cobasket_core::config::AppConfig;
use serde::Serialize;

use super::{mine, CommandResult, RunArgs};

#[derive(Debug, Serialize)]
struct InsightsReport {
    service_frequency: Vec<ServiceUsage>,
    monthly_usage: Option<MonthlyUsage>,
    insights: Insights,
    network: ServiceNetwork,
}

pub fn run(config: &AppConfig, args: &RunArgs) -> CommandResult {
    let session = match mine(config, args) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error("insights", &error),
    };

    let report = InsightsReport {
        service_frequency: service_frequency(&session.observations),
        monthly_usage: monthly_usage(&session.observations),
        insights: Insights::derive(&session.observations, &session.rules),
        network: ServiceNetwork::from_rules(
            &session.rules,
            config.recommendation.network_min_lift,
            config.recommendation.max_connections,
        ),
    };

    CommandResult::data("insights", &report)
}
