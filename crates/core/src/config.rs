use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mining::MiningOptions;
use crate::recommendations::{BundleQuery, ServiceQuery};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppConfig {
    pub mining: MiningConfig,
    pub recommendation: RecommendationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MiningConfig {
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub max_itemset_size: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationConfig {
    pub top_n: usize,
    pub bundle_min_confidence: f64,
    pub bundle_min_lift: f64,
    pub max_bundle_size: usize,
    pub network_min_lift: f64,
    pub max_connections: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub min_lift: Option<f64>,
    pub max_itemset_size: Option<usize>,
    pub top_n: Option<usize>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mining: MiningConfig {
                min_support: crate::mining::DEFAULT_MIN_SUPPORT,
                min_confidence: crate::mining::DEFAULT_MIN_CONFIDENCE,
                min_lift: crate::mining::DEFAULT_MIN_LIFT,
                max_itemset_size: 4,
            },
            recommendation: RecommendationConfig {
                top_n: crate::recommendations::DEFAULT_TOP_N,
                bundle_min_confidence: crate::recommendations::DEFAULT_BUNDLE_MIN_CONFIDENCE,
                bundle_min_lift: crate::recommendations::DEFAULT_BUNDLE_MIN_LIFT,
                max_bundle_size: crate::recommendations::DEFAULT_MAX_BUNDLE_SIZE,
                network_min_lift: crate::analysis::DEFAULT_NETWORK_MIN_LIFT,
                max_connections: crate::analysis::DEFAULT_MAX_CONNECTIONS,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl MiningConfig {
    /// Pipeline thresholds; a configured run always caps itemset size.
    pub fn options(&self) -> MiningOptions {
        MiningOptions {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            min_lift: self.min_lift,
            max_itemset_size: Some(self.max_itemset_size),
            require_rules: false,
        }
    }
}

impl RecommendationConfig {
    pub fn service_query(&self, mining: &MiningConfig) -> ServiceQuery {
        ServiceQuery {
            top_n: self.top_n,
            min_confidence: mining.min_confidence,
            min_lift: mining.min_lift,
        }
    }

    pub fn bundle_query(&self) -> BundleQuery {
        BundleQuery {
            min_confidence: self.bundle_min_confidence,
            min_lift: self.bundle_min_lift,
            max_bundle_size: self.max_bundle_size,
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cobasket.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(mining) = patch.mining {
            if let Some(min_support) = mining.min_support {
                self.mining.min_support = min_support;
            }
            if let Some(min_confidence) = mining.min_confidence {
                self.mining.min_confidence = min_confidence;
            }
            if let Some(min_lift) = mining.min_lift {
                self.mining.min_lift = min_lift;
            }
            if let Some(max_itemset_size) = mining.max_itemset_size {
                self.mining.max_itemset_size = max_itemset_size;
            }
        }

        if let Some(recommendation) = patch.recommendation {
            if let Some(top_n) = recommendation.top_n {
                self.recommendation.top_n = top_n;
            }
            if let Some(bundle_min_confidence) = recommendation.bundle_min_confidence {
                self.recommendation.bundle_min_confidence = bundle_min_confidence;
            }
            if let Some(bundle_min_lift) = recommendation.bundle_min_lift {
                self.recommendation.bundle_min_lift = bundle_min_lift;
            }
            if let Some(max_bundle_size) = recommendation.max_bundle_size {
                self.recommendation.max_bundle_size = max_bundle_size;
            }
            if let Some(network_min_lift) = recommendation.network_min_lift {
                self.recommendation.network_min_lift = network_min_lift;
            }
            if let Some(max_connections) = recommendation.max_connections {
                self.recommendation.max_connections = max_connections;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COBASKET_MINING_MIN_SUPPORT") {
            self.mining.min_support = parse_f64("COBASKET_MINING_MIN_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("COBASKET_MINING_MIN_CONFIDENCE") {
            self.mining.min_confidence = parse_f64("COBASKET_MINING_MIN_CONFIDENCE", &value)?;
        }
        if let Some(value) = read_env("COBASKET_MINING_MIN_LIFT") {
            self.mining.min_lift = parse_f64("COBASKET_MINING_MIN_LIFT", &value)?;
        }
        if let Some(value) = read_env("COBASKET_MINING_MAX_ITEMSET_SIZE") {
            self.mining.max_itemset_size = parse_usize("COBASKET_MINING_MAX_ITEMSET_SIZE", &value)?;
        }

        if let Some(value) = read_env("COBASKET_RECOMMENDATION_TOP_N") {
            self.recommendation.top_n = parse_usize("COBASKET_RECOMMENDATION_TOP_N", &value)?;
        }
        if let Some(value) = read_env("COBASKET_RECOMMENDATION_BUNDLE_MIN_CONFIDENCE") {
            self.recommendation.bundle_min_confidence =
                parse_f64("COBASKET_RECOMMENDATION_BUNDLE_MIN_CONFIDENCE", &value)?;
        }
        if let Some(value) = read_env("COBASKET_RECOMMENDATION_BUNDLE_MIN_LIFT") {
            self.recommendation.bundle_min_lift =
                parse_f64("COBASKET_RECOMMENDATION_BUNDLE_MIN_LIFT", &value)?;
        }
        if let Some(value) = read_env("COBASKET_RECOMMENDATION_MAX_BUNDLE_SIZE") {
            self.recommendation.max_bundle_size =
                parse_usize("COBASKET_RECOMMENDATION_MAX_BUNDLE_SIZE", &value)?;
        }
        if let Some(value) = read_env("COBASKET_RECOMMENDATION_NETWORK_MIN_LIFT") {
            self.recommendation.network_min_lift =
                parse_f64("COBASKET_RECOMMENDATION_NETWORK_MIN_LIFT", &value)?;
        }
        if let Some(value) = read_env("COBASKET_RECOMMENDATION_MAX_CONNECTIONS") {
            self.recommendation.max_connections =
                parse_usize("COBASKET_RECOMMENDATION_MAX_CONNECTIONS", &value)?;
        }

        let log_level = read_env("COBASKET_LOGGING_LEVEL").or_else(|| read_env("COBASKET_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("COBASKET_LOGGING_FORMAT").or_else(|| read_env("COBASKET_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(min_support) = overrides.min_support {
            self.mining.min_support = min_support;
        }
        if let Some(min_confidence) = overrides.min_confidence {
            self.mining.min_confidence = min_confidence;
        }
        if let Some(min_lift) = overrides.min_lift {
            self.mining.min_lift = min_lift;
        }
        if let Some(max_itemset_size) = overrides.max_itemset_size {
            self.mining.max_itemset_size = max_itemset_size;
        }
        if let Some(top_n) = overrides.top_n {
            self.recommendation.top_n = top_n;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_mining(&self.mining)?;
        validate_recommendation(&self.recommendation)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("cobasket.toml"), PathBuf::from("config/cobasket.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_mining(mining: &MiningConfig) -> Result<(), ConfigError> {
    if !(mining.min_support > 0.0 && mining.min_support <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "mining.min_support must be in range (0, 1], got {}",
            mining.min_support
        )));
    }

    if !(0.0..=1.0).contains(&mining.min_confidence) {
        return Err(ConfigError::Validation(format!(
            "mining.min_confidence must be in range [0, 1], got {}",
            mining.min_confidence
        )));
    }

    if mining.min_lift.is_nan() || mining.min_lift < 0.0 {
        return Err(ConfigError::Validation(format!(
            "mining.min_lift must be zero or greater, got {}",
            mining.min_lift
        )));
    }

    if mining.max_itemset_size == 0 {
        return Err(ConfigError::Validation(
            "mining.max_itemset_size must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_recommendation(recommendation: &RecommendationConfig) -> Result<(), ConfigError> {
    if recommendation.top_n == 0 {
        return Err(ConfigError::Validation(
            "recommendation.top_n must be greater than zero".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&recommendation.bundle_min_confidence) {
        return Err(ConfigError::Validation(format!(
            "recommendation.bundle_min_confidence must be in range [0, 1], got {}",
            recommendation.bundle_min_confidence
        )));
    }

    let negative = |value: f64| value.is_nan() || value < 0.0;
    if negative(recommendation.bundle_min_lift) || negative(recommendation.network_min_lift) {
        return Err(ConfigError::Validation(
            "recommendation.bundle_min_lift and recommendation.network_min_lift must be zero or greater"
                .to_string(),
        ));
    }

    if recommendation.max_bundle_size < 2 {
        return Err(ConfigError::Validation(
            "recommendation.max_bundle_size must be at least 2 (a rule has two sides)".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    mining: Option<MiningPatch>,
    recommendation: Option<RecommendationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MiningPatch {
    min_support: Option<f64>,
    min_confidence: Option<f64>,
    min_lift: Option<f64>,
    max_itemset_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecommendationPatch {
    top_n: Option<usize>,
    bundle_min_confidence: Option<f64>,
    bundle_min_lift: Option<f64>,
    max_bundle_size: Option<usize>,
    network_min_lift: Option<f64>,
    max_connections: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(contents: &str) -> Result<(TempDir, std::path::PathBuf), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("cobasket.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok((dir, path))
    }

    #[test]
    fn defaults_match_documented_thresholds() -> Result<(), String> {
        let config = AppConfig::default();

        ensure(config.mining.min_support == 0.01, "default min_support should be 0.01")?;
        ensure(config.mining.min_confidence == 0.1, "default min_confidence should be 0.1")?;
        ensure(config.mining.min_lift == 1.0, "default min_lift should be 1.0")?;
        ensure(config.mining.max_itemset_size == 4, "default max_itemset_size should be 4")?;
        ensure(config.recommendation.top_n == 5, "default top_n should be 5")?;
        ensure(config.recommendation.bundle_min_confidence == 0.3, "bundle confidence should be 0.3")?;
        ensure(config.recommendation.bundle_min_lift == 2.0, "bundle lift should be 2.0")?;
        ensure(config.recommendation.max_bundle_size == 3, "bundle size should be 3")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )?;
        config.validate().map_err(|err| format!("defaults should validate: {err}"))
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        env::set_var("TEST_COBASKET_SUPPORT", "0.05");

        let result = (|| -> Result<(), String> {
            let (_dir, path) = write_config(
                r#"
[mining]
min_support = ${TEST_COBASKET_SUPPORT}
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.mining.min_support == 0.05, "min_support should be interpolated from env")
        })();

        clear_vars(&["TEST_COBASKET_SUPPORT"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_COBASKET_UNSET"]);

        let (_dir, path) = write_config("[logging]\nlevel = \"${TEST_COBASKET_UNSET}\"\n")?;
        let error =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });

        ensure(
            matches!(error, Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "TEST_COBASKET_UNSET"),
            "missing interpolation variable should be reported by name",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        env::set_var("COBASKET_LOG_LEVEL", "warn");
        env::set_var("COBASKET_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["COBASKET_LOG_LEVEL", "COBASKET_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        env::set_var("COBASKET_MINING_MIN_CONFIDENCE", "0.4");
        env::set_var("COBASKET_MINING_MIN_SUPPORT", "0.03");

        let result = (|| -> Result<(), String> {
            let (_dir, path) = write_config(
                r#"
[mining]
min_support = 0.02
min_confidence = 0.2
max_itemset_size = 3

[recommendation]
top_n = 8

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    min_support: Some(0.04),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.mining.min_support == 0.04, "override min_support should win")?;
            ensure(config.mining.min_confidence == 0.4, "env min_confidence should win over file")?;
            ensure(config.mining.max_itemset_size == 3, "file max_itemset_size should win over default")?;
            ensure(config.mining.min_lift == 1.0, "untouched min_lift should keep its default")?;
            ensure(config.recommendation.top_n == 8, "file top_n should win over default")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            Ok(())
        })();

        clear_vars(&["COBASKET_MINING_MIN_CONFIDENCE", "COBASKET_MINING_MIN_SUPPORT"]);
        result
    }

    #[test]
    fn invalid_env_number_names_the_variable() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        env::set_var("COBASKET_RECOMMENDATION_TOP_N", "many");

        let result = (|| -> Result<(), String> {
            let error = AppConfig::load(LoadOptions::default());
            ensure(
                matches!(
                    error,
                    Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "COBASKET_RECOMMENDATION_TOP_N"
                ),
                "invalid env override should name the variable",
            )
        })();

        clear_vars(&["COBASKET_RECOMMENDATION_TOP_N"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { min_support: Some(0.0), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };

        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("mining.min_support")
        );
        ensure(has_message, "validation failure should mention mining.min_support")
    }

    #[test]
    fn zero_max_itemset_size_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { max_itemset_size: Some(0), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("max_itemset_size")),
            "zero max_itemset_size should fail validation",
        )
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let (_dir, path) = write_config("[mining]\nmin_suport = 0.2\n")?;
        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });

        ensure(matches!(result, Err(ConfigError::ParseFile { .. })), "typo in key should fail parsing")
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(ref missing)) if missing == &path),
            "missing required file should be reported",
        )
    }

    #[test]
    fn mining_options_carry_the_configured_cap() -> Result<(), String> {
        let config = AppConfig::default();
        let options = config.mining.options();

        ensure(options.max_itemset_size == Some(4), "configured runs should cap itemset size")?;
        ensure(options.min_lift == 1.0, "min_lift should pass through")?;

        let query = config.recommendation.service_query(&config.mining);
        ensure(query.top_n == 5 && query.min_confidence == 0.1, "service query should use config")?;

        let bundles = config.recommendation.bundle_query();
        ensure(bundles.max_bundle_size == 3, "bundle query should use config")
    }
}
