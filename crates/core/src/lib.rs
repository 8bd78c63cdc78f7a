pub mod analysis;
pub mod config;
pub mod domain;
pub mod errors;
pub mod mining;
pub mod recommendations;

pub use analysis::{
    monthly_usage, service_frequency, InsightThresholds, Insights, MonthlyUsage, NetworkEdge,
    ServiceCount, ServiceNetwork, ServiceUsage,
};
pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use domain::{CategoryId, Item, Observation, ServiceId, UserId};
pub use errors::{ApplicationError, DomainError, MiningError};
pub use mining::{
    mine_and_generate_rules, mine_rules, FrequentItemsetMiner, FrequentItemsets, Itemset,
    MiningOptions, Rule, RuleGenerator, RuleSet, Transaction, TransactionMatrix,
    TransactionMatrixBuilder,
};
pub use recommendations::{
    Bundle, BundleQuery, CategoryLookup, RecommendationEngine, RuleIndex, SeasonalIndex,
    ServiceQuery,
};
