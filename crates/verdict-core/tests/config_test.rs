use std::path::PathBuf;
use verdict_core::{RuleError, RulesEngineParameters};

fn scratch_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("verdict-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_yaml_file() {
    let path = scratch_file(
        "engine.yaml",
        "skip_on_first_failed_rule: true\npriority_threshold: 100\nmax_inference_cycles: 3\n",
    );
    let params = RulesEngineParameters::from_file(&path).unwrap();
    assert!(params.skip_on_first_failed_rule);
    assert_eq!(params.priority_threshold, 100);
    assert_eq!(params.max_inference_cycles, Some(3));
}

#[test]
fn loads_json_file() {
    let path = scratch_file("engine.json", r#"{"skip_on_first_applied_rule": true}"#);
    let params = RulesEngineParameters::from_file(&path).unwrap();
    assert_eq!(params, RulesEngineParameters::default().with_skip_on_first_applied_rule(true));
}

#[test]
fn rejects_unknown_extension_and_missing_file() {
    let path = scratch_file("engine.toml", "priority_threshold = 1");
    let err = RulesEngineParameters::from_file(&path).unwrap_err();
    assert!(matches!(err, RuleError::Configuration { .. }));

    let missing = std::env::temp_dir().join("verdict-config-does-not-exist.yaml");
    assert!(RulesEngineParameters::from_file(missing).is_err());
}

#[test]
fn rejects_malformed_document() {
    let path = scratch_file("broken.yaml", "priority_threshold: [1, 2\n");
    let err = RulesEngineParameters::from_file(&path).unwrap_err();
    assert_eq!(err.category(), "configuration");
}
