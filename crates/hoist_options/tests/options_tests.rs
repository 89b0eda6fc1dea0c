//! Configuration parsing tests.
//!
//! Covers `hoist.json` documents: full and partial option sets, unknown
//! keys, malformed input and loading from disk.

use hoist_options::{
    parse_options, parse_options_file, EvalOptions, HoistConfig, OptionsError, MAX_CALL_DEPTH_CEILING,
};

/// Helper: parse a document that must be valid.
fn parse(content: &str) -> HoistConfig {
    parse_options(content).unwrap_or_else(|e| panic!("failed to parse {content}: {e}"))
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_empty_document_uses_defaults() {
    let config = parse("{}");
    assert_eq!(config, HoistConfig::default());
    assert!(!config.eval_options.strict());
    assert_eq!(config.eval_options.max_call_depth(), 512);
    assert_eq!(config.entry, None);
}

#[test]
fn test_full_document() {
    let config = parse(
        r#"{
            "evalOptions": {
                "strict": true,
                "maxCallDepth": 64,
                "consoleColors": false
            },
            "entry": "main"
        }"#,
    );
    assert_eq!(
        config.eval_options,
        EvalOptions {
            strict: Some(true),
            max_call_depth: Some(64),
            console_colors: Some(false),
        }
    );
    assert!(config.eval_options.strict());
    assert_eq!(config.eval_options.max_call_depth(), 64);
    assert_eq!(config.entry.as_deref(), Some("main"));
}

#[test]
fn test_partial_eval_options() {
    let config = parse(r#"{ "evalOptions": { "maxCallDepth": 10 } }"#);
    assert!(!config.eval_options.strict());
    assert_eq!(config.eval_options.max_call_depth(), 10);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = parse(r#"{ "entry": "run", "watch": true }"#);
    assert_eq!(config.entry.as_deref(), Some("run"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_malformed_json() {
    let err = parse_options("{ \"entry\": ").unwrap_err();
    assert!(matches!(err, OptionsError::Json(_)));
    assert!(err.to_string().starts_with("invalid configuration"));
}

#[test]
fn test_wrong_field_type() {
    let err = parse_options(r#"{ "evalOptions": { "strict": "yes" } }"#).unwrap_err();
    assert!(matches!(err, OptionsError::Json(_)));
}

#[test]
fn test_call_depth_above_ceiling_rejected() {
    let err = parse_options(r#"{ "evalOptions": { "maxCallDepth": 200000 } }"#).unwrap_err();
    assert!(matches!(err, OptionsError::CallDepthOutOfRange(200_000)));
    assert_eq!(
        err.to_string(),
        format!("invalid configuration: maxCallDepth 200000 must be between 1 and {MAX_CALL_DEPTH_CEILING}")
    );
}

#[test]
fn test_call_depth_zero_rejected() {
    let err = parse_options(r#"{ "evalOptions": { "maxCallDepth": 0 } }"#).unwrap_err();
    assert!(matches!(err, OptionsError::CallDepthOutOfRange(0)));
}

#[test]
fn test_call_depth_at_ceiling_accepted() {
    let config = parse(&format!(r#"{{ "evalOptions": {{ "maxCallDepth": {MAX_CALL_DEPTH_CEILING} }} }}"#));
    assert_eq!(config.eval_options.max_call_depth(), MAX_CALL_DEPTH_CEILING);
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("hoist-options-tests-missing").join("hoist.json");
    let err = parse_options_file(&path).unwrap_err();
    assert!(matches!(err, OptionsError::Io { .. }));
}

#[test]
fn test_load_from_disk() {
    let dir = std::env::temp_dir().join(format!("hoist-options-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("hoist.json");
    std::fs::write(&path, r#"{ "evalOptions": { "strict": true } }"#).unwrap();

    let config = parse_options_file(&path).unwrap();
    assert!(config.eval_options.strict());

    std::fs::remove_dir_all(&dir).unwrap();
}
