pub mod config;
pub mod insights;
pub mod recommend;
pub mod rules;

use std::path::PathBuf;

use clap::Args;
use cobasket_core::config::{AppConfig, ConfigOverrides};
use cobasket_core::errors::ApplicationError;
use cobasket_core::mining::{mine_rules, RuleSet, TransactionMatrix, TransactionMatrixBuilder};
use cobasket_core::Observation;
use serde::Serialize;
use serde_json::Value;

use crate::input::load_observations;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn data(command: &str, data: &impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => {
                let payload = CommandOutcome {
                    command: command.to_string(),
                    status: "ok".to_string(),
                    error_class: None,
                    message: None,
                    data: Some(data),
                };
                Self { exit_code: 0, output: serialize_payload(payload) }
            }
            Err(error) => Self::failure(command, "serialization", error.to_string(), 1),
        }
    }

    /// A successful query that had nothing to look at, e.g. undated input.
    pub fn no_data(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: Some(message.into()),
            data: Some(Value::Null),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: Some(message.into()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class = error.error_class(),
            error = %error,
            "command failed"
        );
        let message = format!("{} ({error})", error.user_message());
        Self::failure(command, error.error_class(), message, error.exit_code())
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Input and mining thresholds shared by every data command.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[arg(long, help = "Observations as a JSON array or JSON lines")]
    pub input: PathBuf,
    #[arg(long, help = "Minimum support ratio, in (0, 1]")]
    pub min_support: Option<f64>,
    #[arg(long, help = "Minimum rule confidence, in [0, 1]")]
    pub min_confidence: Option<f64>,
    #[arg(long, help = "Minimum rule lift")]
    pub min_lift: Option<f64>,
    #[arg(long, help = "Largest itemset searched")]
    pub max_itemset_size: Option<usize>,
    #[arg(long, help = "Fail when no itemset reaches the minimum support")]
    pub require_rules: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            min_lift: self.min_lift,
            max_itemset_size: self.max_itemset_size,
            ..ConfigOverrides::default()
        }
    }
}

/// Everything one mining run produced.
pub(crate) struct Session {
    pub observations: Vec<Observation>,
    pub matrix: TransactionMatrix,
    pub rules: RuleSet,
}

pub(crate) fn mine(config: &AppConfig, args: &RunArgs) -> Result<Session, ApplicationError> {
    let input = args.input.as_path();
    let observations = load_observations(input)?;
    let matrix = TransactionMatrixBuilder::new().build(&observations)?;

    let mut options = config.mining.options();
    options.require_rules = args.require_rules;
    let rules = mine_rules(&matrix, &options)?;

    tracing::info!(
        event_name = "cli.session.mined",
        input = %input.display(),
        observations = observations.len(),
        users = matrix.len(),
        rules = rules.len(),
        "input mined"
    );

    Ok(Session { observations, matrix, rules })
}
