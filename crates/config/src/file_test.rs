//! Configuration file tests

use scribe_levels::{LevelRegistry, LevelMask};

use crate::error::ConfigError;
use crate::file::Config;

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_empty_document() {
    let config = Config::from_toml("").unwrap();
    assert!(config.application.is_none());
    assert!(config.writers.is_empty());
    assert!(config.stages.is_empty());
}

#[test]
fn test_full_document() {
    let config = Config::from_toml(
        r#"
        application = "frontend"
        pool_size = 2000

        [[writers]]
        name = "Storage*"
        tags = ["io"]
        level = "Notice"
        include = ["SqlQueries"]
        exclude = ["Warning"]

        [[writers]]
        level = "Error"
        default = true

        [stages.file]
        queue_size = 1000
        discard_if_full = true
        path = "/var/log/frontend.log"
        "#,
    )
    .unwrap();

    assert_eq!(config.application.as_deref(), Some("frontend"));
    assert_eq!(config.pool_size, Some(2000));
    assert_eq!(config.writers.len(), 2);

    let first = &config.writers[0];
    assert_eq!(first.name.as_deref(), Some("Storage*"));
    assert_eq!(first.tags, vec!["io"]);
    assert_eq!(first.level, "Notice");
    assert_eq!(first.include, vec!["SqlQueries"]);
    assert_eq!(first.exclude, vec!["Warning"]);
    assert!(!first.default);
    assert!(config.writers[1].default);
}

#[test]
fn test_invalid_toml_rejected() {
    let err = Config::from_toml("application = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_missing_file_rejected() {
    let err = Config::from_file("/nonexistent/scribe.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_level_field_defaults_to_info() {
    let config = Config::from_toml("[[writers]]\ndefault = true\n").unwrap();
    assert_eq!(config.writers[0].level, "Info");
}

// =============================================================================
// Entry set compilation
// =============================================================================

#[test]
fn test_rule_order_and_selection() {
    let registry = LevelRegistry::new();
    let config = Config::from_toml(
        r#"
        [[writers]]
        name = "Foo*"
        level = "All"

        [[writers]]
        level = "None"
        default = true
        "#,
    )
    .unwrap();

    let set = config.build_entry_set().unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.mask_for("FooBar", &[], &registry), LevelMask::ALL);
    assert_eq!(set.mask_for("Baz", &[], &registry), LevelMask::NONE);
}

#[test]
fn test_duplicate_default_rule_rejected() {
    let config = Config::from_toml(
        r#"
        [[writers]]
        level = "All"
        default = true

        [[writers]]
        level = "None"
        default = true
        "#,
    )
    .unwrap();

    let err = config.build_entry_set().unwrap_err();
    assert!(matches!(err, ConfigError::Level(_)));
}

#[test]
fn test_bad_pattern_rejected() {
    let config = Config::from_toml(
        r#"
        [[writers]]
        name = "regex:["
        level = "All"
        "#,
    )
    .unwrap();

    let err = config.build_entry_set().unwrap_err();
    assert!(matches!(err, ConfigError::Level(_)));
}

// =============================================================================
// Settings flattening
// =============================================================================

#[test]
fn test_stage_tables_flatten_into_store() {
    let config = Config::from_toml(
        r#"
        [stages.file]
        queue_size = 1000
        discard_if_full = true
        path = "/var/log/app.log"

        [stages.console]
        colors = false
        "#,
    )
    .unwrap();

    let store = config.setting_store();
    assert_eq!(store.get_parsed::<usize>("file", "queue_size"), Some(1000));
    assert_eq!(store.get_parsed::<bool>("file", "discard_if_full"), Some(true));
    // Strings come through unquoted
    assert_eq!(store.get("file", "path"), Some("/var/log/app.log"));
    assert_eq!(store.get_parsed::<bool>("console", "colors"), Some(false));
    assert!(!store.has_section("missing"));
}
