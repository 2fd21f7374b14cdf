//! Tests for layered settings loading

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use config::Environment;
use tempfile::TempDir;

use preprocess_graph::application::ApplicationError;
use preprocess_graph::config::{local_config_path, Settings};
use preprocess_graph::domain::RootFallback;

fn env(vars: &[(&str, &str)]) -> Environment {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::env_source().source(Some(map))
}

/// Global config path inside `temp` that does not exist yet.
fn global_path(temp: &TempDir) -> PathBuf {
    temp.path().join("global").join("preprocess-graph.toml")
}

fn write_global(temp: &TempDir, content: &str) -> PathBuf {
    let path = global_path(temp);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_no_config_files_when_loading_then_uses_defaults() {
    let temp = TempDir::new().unwrap();

    let settings =
        Settings::load_layers(Some(&global_path(&temp)), Some(temp.path()), env(&[])).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_loading_then_applies_values() {
    // Arrange
    let temp = TempDir::new().unwrap();
    fs::write(
        local_config_path(temp.path()),
        r#"
root_fallback = "reject"
strict_extra_mappings = true
main_project = "1.12.2"
"#,
    )
    .unwrap();

    // Act
    let settings =
        Settings::load_layers(Some(&global_path(&temp)), Some(temp.path()), env(&[])).unwrap();

    // Assert
    assert_eq!(settings.root_fallback, RootFallback::Reject);
    assert!(settings.strict_extra_mappings);
    assert_eq!(settings.main_project.as_deref(), Some("1.12.2"));
}

#[test]
fn given_global_and_local_config_when_loading_then_local_wins_per_field() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let global = write_global(
        &temp,
        "root_fallback = \"reject\"\nmain_project = \"1.8.9\"\n",
    );
    fs::write(local_config_path(temp.path()), "main_project = \"1.12.2\"\n").unwrap();

    // Act
    let settings = Settings::load_layers(Some(&global), Some(temp.path()), env(&[])).unwrap();

    // Assert
    assert_eq!(settings.root_fallback, RootFallback::Reject);
    assert_eq!(settings.main_project.as_deref(), Some("1.12.2"));
    assert!(!settings.strict_extra_mappings);
}

#[test]
fn given_env_vars_when_loading_then_override_files() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let global = write_global(&temp, "strict_extra_mappings = true\n");
    fs::write(local_config_path(temp.path()), "main_project = \"1.12.2\"\n").unwrap();

    // Act
    let settings = Settings::load_layers(
        Some(&global),
        Some(temp.path()),
        env(&[
            ("PPGRAPH_STRICT_EXTRA_MAPPINGS", "false"),
            ("PPGRAPH_MAIN_PROJECT", "1.16.4"),
        ]),
    )
    .unwrap();

    // Assert
    assert!(!settings.strict_extra_mappings);
    assert_eq!(settings.main_project.as_deref(), Some("1.16.4"));
}

#[test]
fn given_malformed_env_bool_when_loading_then_reports_config_error() {
    let temp = TempDir::new().unwrap();

    let result = Settings::load_layers(
        None,
        Some(temp.path()),
        env(&[("PPGRAPH_STRICT_EXTRA_MAPPINGS", "maybe")]),
    );

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_local_config_when_loading_then_reports_config_error() {
    let temp = TempDir::new().unwrap();
    fs::write(local_config_path(temp.path()), "root_fallback = \"newest\"\n").unwrap();

    let result = Settings::load_layers(None, Some(temp.path()), env(&[]));

    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("parse")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn given_settings_when_rendering_then_round_trips_through_toml() {
    let settings = Settings {
        root_fallback: RootFallback::Reject,
        strict_extra_mappings: true,
        main_project: Some("1.8.9".to_string()),
    };

    let rendered = settings.to_toml().unwrap();

    assert!(rendered.contains("root_fallback = \"reject\""));
    let parsed: Settings = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, settings);
}
