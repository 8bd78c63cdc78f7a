use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use cobasket_cli::commands::CommandResult;
use cobasket_cli::run_with_args;
use serde_json::Value;
use tempfile::TempDir;

const BASKETS: [(&str, &[&str], u32); 8] = [
    ("u1", &["2_0", "4_5", "15_1"], 8),
    ("u2", &["2_0", "4_5"], 8),
    ("u3", &["2_0", "4_5", "38_4"], 8),
    ("u4", &["15_1", "38_4", "9_4"], 3),
    ("u5", &["15_1", "9_4"], 3),
    ("u6", &["38_4", "9_4"], 3),
    ("u7", &["2_0"], 3),
    ("u8", &["15_1"], 3),
];

fn observations_jsonl(with_dates: bool) -> String {
    let mut lines = Vec::new();
    for (user, items, month) in BASKETS {
        for item in items {
            let (service, category) = item.split_once('_').expect("fixture items are well formed");
            let mut row = serde_json::json!({
                "UserId": user,
                "ServiceId": service,
                "CategoryId": category,
            });
            if with_dates {
                row["CreateDate"] = Value::from(format!("2018-{month:02}-12 10:30:00"));
            }
            lines.push(row.to_string());
        }
    }
    lines.join("\n")
}

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

fn fixture(contents: &str) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("observations.jsonl");
    fs::write(&path, contents).expect("write fixture");
    Fixture { _dir: dir, path }
}

fn run(args: &[&str], input: &Path) -> CommandResult {
    let mut argv = vec!["cobasket"];
    argv.extend_from_slice(args);
    let input = input.to_string_lossy().into_owned();
    argv.extend(["--input", input.as_str()]);
    run_with_args(argv).expect("arguments should parse")
}

#[test]
fn rules_are_printed_strongest_first() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(true));
        let result = run(&["rules", "--min-support", "0.2"], &input.path);
        assert_eq!(result.exit_code, 0, "expected successful rules run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "rules");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["users"], 8);
        assert_eq!(payload["data"]["rule_count"], 6);

        let first = &payload["data"]["rules"][0];
        assert_eq!(first["antecedent"], serde_json::json!(["4_5"]));
        assert_eq!(first["consequent"], serde_json::json!(["2_0"]));
        assert_eq!(first["lift"], 2.0);
        assert_eq!(first["confidence"], 1.0);
        assert_eq!(first["conviction"], Value::Null);
    });
}

#[test]
fn required_rules_fail_with_mining_exit_code() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));

        let lenient = run(&["rules", "--min-support", "0.9"], &input.path);
        assert_eq!(lenient.exit_code, 0);
        assert_eq!(parse_payload(&lenient.output)["data"]["rule_count"], 0);

        let strict = run(&["rules", "--min-support", "0.9", "--require-rules"], &input.path);
        assert_eq!(strict.exit_code, 4);
        let payload = parse_payload(&strict.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "no_frequent_itemsets");
    });
}

#[test]
fn empty_input_is_a_mining_failure() {
    with_env(&[], || {
        let input = fixture("[]");
        let result = run(&["rules"], &input.path);

        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "empty_input");
    });
}

#[test]
fn malformed_input_is_an_input_failure() {
    with_env(&[], || {
        let input = fixture("{\"user_id\": \"u1\"}\n");
        let result = run(&["insights"], &input.path);

        assert_eq!(result.exit_code, 3);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "insights");
        assert_eq!(payload["error_class"], "input");
    });
}

#[test]
fn out_of_range_threshold_is_a_config_failure() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));
        let result = run(&["rules", "--min-support", "0"], &input.path);

        assert_eq!(result.exit_code, 2, "expected config validation failure code");
        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn recommend_service_returns_matching_rules() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));
        let result =
            run(&["recommend", "service", "--item", "2_0", "--min-support", "0.2"], &input.path);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend.service");
        let rules = payload["data"]["rules"].as_array().expect("rule list");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0]["consequent"], serde_json::json!(["4_5"]));
    });
}

#[test]
fn recommend_service_rejects_malformed_item() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));
        let result = run(&["recommend", "service", "--item", "plumbing"], &input.path);

        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_item");
    });
}

#[test]
fn recommend_category_spans_services() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));
        let result = run(
            &["recommend", "category", "--category", "4", "--top-n", "2", "--min-support", "0.2"],
            &input.path,
        );

        let payload = parse_payload(&result.output);
        let rules = payload["data"]["rules"].as_array().expect("rule list");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["antecedent"], serde_json::json!(["38_4"]));
        assert_eq!(rules[1]["antecedent"], serde_json::json!(["9_4"]));
    });
}

#[test]
fn recommend_season_uses_dates() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(true));
        let result =
            run(&["recommend", "season", "--month", "August", "--min-support", "0.2"], &input.path);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["query"], "8");
        assert_eq!(payload["data"]["rules"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn recommend_season_without_dates_is_no_data() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));
        let result = run(&["recommend", "season", "--month", "8"], &input.path);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"], Value::Null);
        assert!(payload.get("data").is_some(), "no-data payload keeps an explicit null");
    });
}

#[test]
fn recommend_user_dedups_consequents() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));
        let result = run(&["recommend", "user", "--user", "u4", "--min-support", "0.2"], &input.path);

        let payload = parse_payload(&result.output);
        let consequents: Vec<&Value> = payload["data"]["rules"]
            .as_array()
            .expect("rule list")
            .iter()
            .map(|rule| &rule["consequent"])
            .collect();
        assert_eq!(
            consequents,
            vec![&serde_json::json!(["9_4"]), &serde_json::json!(["38_4"]), &serde_json::json!(["15_1"])]
        );

        let unknown = run(&["recommend", "user", "--user", "nobody"], &input.path);
        assert_eq!(unknown.exit_code, 0);
        assert_eq!(parse_payload(&unknown.output)["data"], Value::Null);
    });
}

#[test]
fn recommend_bundles_apply_bundle_thresholds() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(false));

        let result = run(&["recommend", "bundles", "--min-support", "0.2"], &input.path);
        let payload = parse_payload(&result.output);
        let bundles = payload["data"].as_array().expect("bundle list");
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0]["items"], serde_json::json!(["4_5", "2_0"]));

        let relaxed = run(
            &[
                "recommend",
                "bundles",
                "--bundle-min-lift",
                "1.0",
                "--bundle-min-confidence",
                "0.6",
                "--min-support",
                "0.2",
            ],
            &input.path,
        );
        let payload = parse_payload(&relaxed.output);
        assert_eq!(payload["data"].as_array().map(Vec::len), Some(5));
    });
}

#[test]
fn insights_report_usage_and_network() {
    with_env(&[], || {
        let input = fixture(&observations_jsonl(true));
        let result = run(&["insights", "--min-support", "0.2"], &input.path);
        assert_eq!(result.exit_code, 0);

        let data = &parse_payload(&result.output)["data"];
        assert_eq!(data["service_frequency"][0]["service_id"], "15");
        assert_eq!(data["service_frequency"][0]["frequency"], 4);
        assert_eq!(data["monthly_usage"]["8"]["2"], 3);
        assert_eq!(data["insights"]["most_used_service"]["service_id"], "15");
        assert_eq!(data["network"]["edges"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn config_reports_sources() {
    with_env(&[("COBASKET_MINING_MIN_SUPPORT", "0.05"), ("COBASKET_LOG_LEVEL", "debug")], || {
        let result = run_with_args(["cobasket", "config"]).expect("arguments should parse");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        let entries = payload["data"]["entries"].as_array().expect("entries");

        let entry = |key: &str| {
            entries.iter().find(|entry| entry["key"] == key).cloned().expect("entry present")
        };
        assert_eq!(entry("mining.min_support")["value"], 0.05);
        assert_eq!(entry("mining.min_support")["source"], "env (COBASKET_MINING_MIN_SUPPORT)");
        assert_eq!(entry("logging.level")["source"], "env (COBASKET_LOG_LEVEL)");
        assert_eq!(entry("mining.min_lift")["source"], "default");
    });
}

#[test]
fn config_file_is_honoured() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cobasket.toml");
        fs::write(&path, "[recommendation]\ntop_n = 1\n").expect("write config");
        let input = fixture(&observations_jsonl(false));

        let config_path = path.to_string_lossy().into_owned();
        let input_path = input.path.to_string_lossy().into_owned();
        let result = run_with_args([
            "cobasket",
            "--config",
            config_path.as_str(),
            "recommend",
            "category",
            "--category",
            "4",
            "--min-support",
            "0.2",
            "--input",
            input_path.as_str(),
        ])
        .expect("arguments should parse");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["rules"].as_array().map(Vec::len), Some(1));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "COBASKET_MINING_MIN_SUPPORT",
        "COBASKET_MINING_MIN_CONFIDENCE",
        "COBASKET_MINING_MIN_LIFT",
        "COBASKET_MINING_MAX_ITEMSET_SIZE",
        "COBASKET_RECOMMENDATION_TOP_N",
        "COBASKET_RECOMMENDATION_BUNDLE_MIN_CONFIDENCE",
        "COBASKET_RECOMMENDATION_BUNDLE_MIN_LIFT",
        "COBASKET_RECOMMENDATION_MAX_BUNDLE_SIZE",
        "COBASKET_RECOMMENDATION_NETWORK_MIN_LIFT",
        "COBASKET_RECOMMENDATION_MAX_CONNECTIONS",
        "COBASKET_LOGGING_LEVEL",
        "COBASKET_LOGGING_FORMAT",
        "COBASKET_LOG_LEVEL",
        "COBASKET_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
