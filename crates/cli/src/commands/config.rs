use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cobasket_core::config::AppConfig;
use serde::Serialize;
use serde_json::{json, Value};
use toml::Value as TomlValue;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: Value,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    precedence: &'static str,
    file: Option<String>,
    entries: Vec<ConfigEntry>,
}

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> CommandResult {
    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let file = config_file_doc.as_ref().zip(config_file_path.as_deref());

    let mining = &config.mining;
    let recommendation = &config.recommendation;
    let fields: [(&'static str, &'static str, Value); 12] = [
        ("mining.min_support", "COBASKET_MINING_MIN_SUPPORT", json!(mining.min_support)),
        ("mining.min_confidence", "COBASKET_MINING_MIN_CONFIDENCE", json!(mining.min_confidence)),
        ("mining.min_lift", "COBASKET_MINING_MIN_LIFT", json!(mining.min_lift)),
        ("mining.max_itemset_size", "COBASKET_MINING_MAX_ITEMSET_SIZE", json!(mining.max_itemset_size)),
        ("recommendation.top_n", "COBASKET_RECOMMENDATION_TOP_N", json!(recommendation.top_n)),
        (
            "recommendation.bundle_min_confidence",
            "COBASKET_RECOMMENDATION_BUNDLE_MIN_CONFIDENCE",
            json!(recommendation.bundle_min_confidence),
        ),
        (
            "recommendation.bundle_min_lift",
            "COBASKET_RECOMMENDATION_BUNDLE_MIN_LIFT",
            json!(recommendation.bundle_min_lift),
        ),
        (
            "recommendation.max_bundle_size",
            "COBASKET_RECOMMENDATION_MAX_BUNDLE_SIZE",
            json!(recommendation.max_bundle_size),
        ),
        (
            "recommendation.network_min_lift",
            "COBASKET_RECOMMENDATION_NETWORK_MIN_LIFT",
            json!(recommendation.network_min_lift),
        ),
        (
            "recommendation.max_connections",
            "COBASKET_RECOMMENDATION_MAX_CONNECTIONS",
            json!(recommendation.max_connections),
        ),
        ("logging.level", "COBASKET_LOGGING_LEVEL", json!(config.logging.level)),
        ("logging.format", "COBASKET_LOGGING_FORMAT", json!(config.logging.format)),
    ];

    let entries = fields
        .into_iter()
        .map(|(key, env_key, value)| ConfigEntry { key, value, source: field_source(key, env_key, file) })
        .collect();

    CommandResult::data(
        "config",
        &ConfigReport {
            precedence: "override > env > file > default",
            file: config_file_path.map(|path| path.display().to_string()),
            entries,
        },
    )
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("cobasket.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/cobasket.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<TomlValue> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<TomlValue>().ok()
}

fn field_source(key_path: &str, env_key: &str, file: Option<(&TomlValue, &Path)>) -> String {
    if env_is_set(env_key) {
        return format!("env ({env_key})");
    }
    if let Some(alias) = env_alias(env_key) {
        if env_is_set(alias) {
            return format!("env ({alias})");
        }
    }

    if let Some((doc, path)) = file {
        if contains_path(doc, key_path) {
            return format!("file ({})", path.display());
        }
    }

    "default".to_string()
}

// Blank values are ignored by the loader, so they do not count as a source.
fn env_is_set(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn env_alias(env_key: &str) -> Option<&'static str> {
    match env_key {
        "COBASKET_LOGGING_LEVEL" => Some("COBASKET_LOG_LEVEL"),
        "COBASKET_LOGGING_FORMAT" => Some("COBASKET_LOG_FORMAT"),
        _ => None,
    }
}

fn contains_path(root: &TomlValue, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
