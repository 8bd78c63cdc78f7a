pub mod commands;
pub mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cobasket_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use commands::recommend::RecommendTarget;
use commands::{CommandResult, RunArgs};

#[derive(Debug, Parser)]
#[command(
    name = "cobasket",
    about = "Cobasket cross-sell rule miner",
    long_about = "Mine association rules from purchase observations and query cross-sell recommendations.",
    after_help = "Examples:\n  cobasket rules --input orders.json --min-support 0.02\n  cobasket recommend service --input orders.json --item 2_0\n  cobasket config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Configuration file (defaults to cobasket.toml or config/cobasket.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Mine the input and print every rule, strongest first")]
    Rules(RunArgs),
    #[command(about = "Query cross-sell recommendations over the mined rules")]
    Recommend {
        #[command(subcommand)]
        target: RecommendTarget,
    },
    #[command(about = "Service usage, business insights and the relationship network")]
    Insights(RunArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Rules(_) => "rules",
            Self::Recommend { .. } => "recommend",
            Self::Insights(_) => "insights",
            Self::Config => "config",
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        match self {
            Self::Rules(args) | Self::Insights(args) => args.overrides(),
            Self::Recommend { target } => target.run_args().overrides(),
            Self::Config => ConfigOverrides::default(),
        }
    }
}

fn init_logging(config: &AppConfig) {
    use cobasket_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // stdout carries the JSON payload
    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .compact()
                .init();
        }
        Pretty => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .pretty()
                .init();
        }
        Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_max_level(log_level)
                .json()
                .init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let result = execute(cli, true);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn execute(cli: Cli, with_logging: bool) -> CommandResult {
    let options = LoadOptions {
        config_path: cli.config.clone(),
        overrides: cli.command.overrides(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                cli.command.name(),
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    if with_logging {
        init_logging(&config);
    }

    match &cli.command {
        Command::Rules(args) => commands::rules::run(&config, args),
        Command::Recommend { target } => commands::recommend::run(&config, target),
        Command::Insights(args) => commands::insights::run(&config, args),
        Command::Config => commands::config::run(&config, cli.config.as_deref()),
    }
}

/// Runs one invocation from an argument list without touching the global
/// subscriber or stdout.
pub fn run_with_args<I, T>(args: I) -> Result<CommandResult, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    Ok(execute(cli, false))
}
