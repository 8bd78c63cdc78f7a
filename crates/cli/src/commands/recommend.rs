use chrono::Month;
use clap::Subcommand;
use cobasket_core::config::AppConfig;
use cobasket_core::errors::ApplicationError;
use cobasket_core::mining::Rule;
use cobasket_core::recommendations::RecommendationEngine;
use cobasket_core::{CategoryId, Item, UserId};
use serde::Serialize;

use super::{mine, CommandResult, RunArgs};

#[derive(Debug, Clone, Subcommand)]
pub enum RecommendTarget {
    #[command(about = "Rules triggered by one item, given as `<service>_<category>`")]
    Service {
        #[arg(long)]
        item: String,
        #[arg(long)]
        top_n: Option<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
    #[command(about = "Rules triggered by any service offered in a category")]
    Category {
        #[arg(long)]
        category: String,
        #[arg(long)]
        top_n: Option<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
    #[command(about = "Rules triggered by the most purchased items of a month")]
    Season {
        #[arg(long, value_parser = parse_month, help = "Month number (1-12) or name")]
        month: u32,
        #[arg(long)]
        top_n: Option<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
    #[command(about = "Rules triggered by a user's purchase history")]
    User {
        #[arg(long)]
        user: String,
        #[arg(long)]
        top_n: Option<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
    #[command(about = "High-confidence, high-lift item packages")]
    Bundles {
        #[arg(long)]
        bundle_min_confidence: Option<f64>,
        #[arg(long)]
        bundle_min_lift: Option<f64>,
        #[arg(long)]
        max_bundle_size: Option<usize>,
        #[command(flatten)]
        run: RunArgs,
    },
}

impl RecommendTarget {
    pub fn run_args(&self) -> &RunArgs {
        match self {
            Self::Service { run, .. }
            | Self::Category { run, .. }
            | Self::Season { run, .. }
            | Self::User { run, .. }
            | Self::Bundles { run, .. } => run,
        }
    }

    fn command_name(&self) -> &'static str {
        match self {
            Self::Service { .. } => "recommend.service",
            Self::Category { .. } => "recommend.category",
            Self::Season { .. } => "recommend.season",
            Self::User { .. } => "recommend.user",
            Self::Bundles { .. } => "recommend.bundles",
        }
    }
}

#[derive(Debug, Serialize)]
struct Recommendations<'a> {
    query: String,
    rules: Vec<&'a Rule>,
}

pub fn run(config: &AppConfig, target: &RecommendTarget) -> CommandResult {
    let command = target.command_name();
    let session = match mine(config, target.run_args()) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error(command, &error),
    };
    let engine = RecommendationEngine::new(session.rules, session.matrix, &session.observations);
    let default_top_n = config.recommendation.top_n;

    match target {
        RecommendTarget::Service { item, top_n, .. } => {
            let item = match item.parse::<Item>() {
                Ok(item) => item,
                Err(error) => {
                    return CommandResult::from_error(command, &ApplicationError::from(error));
                }
            };
            let mut query = config.recommendation.service_query(&config.mining);
            query.top_n = top_n.unwrap_or(default_top_n);

            let rules = engine.by_service(&item, query);
            CommandResult::data(command, &Recommendations { query: item.to_string(), rules })
        }
        RecommendTarget::Category { category, top_n, .. } => {
            let rules = engine.by_category(&CategoryId::from(category.as_str()), top_n.unwrap_or(default_top_n));
            CommandResult::data(command, &Recommendations { query: category.clone(), rules })
        }
        RecommendTarget::Season { month, top_n, .. } => {
            match engine.by_season(*month, top_n.unwrap_or(default_top_n)) {
                Some(rules) => {
                    CommandResult::data(command, &Recommendations { query: month.to_string(), rules })
                }
                None => CommandResult::no_data(command, "input observations carry no dates"),
            }
        }
        RecommendTarget::User { user, top_n, .. } => {
            match engine.by_user(&UserId::from(user.as_str()), top_n.unwrap_or(default_top_n)) {
                Some(rules) => CommandResult::data(command, &Recommendations { query: user.clone(), rules }),
                None => CommandResult::no_data(command, format!("no purchase history for user `{user}`")),
            }
        }
        RecommendTarget::Bundles { bundle_min_confidence, bundle_min_lift, max_bundle_size, .. } => {
            let mut query = config.recommendation.bundle_query();
            if let Some(min_confidence) = bundle_min_confidence {
                query.min_confidence = *min_confidence;
            }
            if let Some(min_lift) = bundle_min_lift {
                query.min_lift = *min_lift;
            }
            if let Some(max_bundle_size) = max_bundle_size {
                query.max_bundle_size = *max_bundle_size;
            }

            CommandResult::data(command, &engine.bundles(query))
        }
    }
}

fn parse_month(raw: &str) -> Result<u32, String> {
    if let Ok(number) = raw.trim().parse::<u32>() {
        return if (1..=12).contains(&number) {
            Ok(number)
        } else {
            Err(format!("month must be in 1..=12, got {number}"))
        };
    }

    raw.trim()
        .parse::<Month>()
        .map(|month| month.number_from_month())
        .map_err(|_| format!("unrecognised month `{raw}`"))
}
