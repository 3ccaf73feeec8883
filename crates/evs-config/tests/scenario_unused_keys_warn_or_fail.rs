//! Scenario: unused-key guard per stage
//!
//! GREEN when:
//! - A misspelled key is reported in WARN mode without failing.
//! - The same config fails in FAIL mode with CONFIG_UNUSED_KEYS.
//! - Keys read by a different stage are unused for this stage but clean for RUN.
//! - Unused pointers are reported sorted.

use evs_config::{load_layered_yaml_from_strings, report_unused_keys, ConfigMode, UnusedKeyPolicy};

const TYPO_YAML: &str = r#"
windows:
  pre_days: 5
  post_dayz: 5
testing:
  min_n: 5
"#;

#[test]
fn warn_reports_typo() {
    let loaded = load_layered_yaml_from_strings(&[TYPO_YAML]).unwrap();
    let report =
        report_unused_keys(ConfigMode::WindowStats, &loaded.config_json, UnusedKeyPolicy::Warn)
            .unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.mode, "WINDOW_STATS");
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/testing/min_n".to_string(), "/windows/post_dayz".to_string()]
    );
}

#[test]
fn fail_policy_errors() {
    let loaded = load_layered_yaml_from_strings(&[TYPO_YAML]).unwrap();
    let err = report_unused_keys(ConfigMode::Run, &loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
    assert!(msg.contains("/windows/post_dayz"));
}

#[test]
fn full_config_is_clean_for_run() {
    let yaml = r#"
windows: { pre_days: 5, post_days: 5 }
impact: { baseline_window: 20 }
testing: { min_n: 5, alpha: 0.05 }
events: { tail: 20 }
corr: { window: 20 }
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let run = report_unused_keys(ConfigMode::Run, &loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap();
    assert!(run.is_clean());

    let corr =
        report_unused_keys(ConfigMode::CorrDelta, &loaded.config_json, UnusedKeyPolicy::Warn)
            .unwrap();
    assert!(corr.unused_leaf_pointers.contains(&"/testing/alpha".to_string()));
    assert!(!corr.unused_leaf_pointers.contains(&"/corr/window".to_string()));
}

#[test]
fn empty_config_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Tests, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}
