//! Configuration tests
//!
//! Tests that touch `LEARNING_ROOT_FOLDER` or API key variables are marked
//! `#[serial]` so they do not race each other.

use learning_common::config::{
    load_toml_config, locate_config, resolve_api_key, CompiledDefaults,
    RootFolderInitializer, RootFolderResolver, TomlConfig, DEFAULT_MODEL, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/learning-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/learning-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_arg_beats_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/learning-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/learning-test-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/learning-test-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/learning-test-toml")),
        ..Default::default()
    };

    env::remove_var(ROOT_FOLDER_ENV);
    let from_toml = RootFolderResolver::new("test-module").with_toml(&toml).resolve();
    assert_eq!(from_toml, PathBuf::from("/tmp/learning-test-toml"));

    env::set_var(ROOT_FOLDER_ENV, "/tmp/learning-test-env-folder");
    let from_env = RootFolderResolver::new("test-module").with_toml(&toml).resolve();
    assert_eq!(from_env, PathBuf::from("/tmp/learning-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_initializer_creates_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("learning.db"));
}

#[test]
fn test_partial_toml_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = \"/srv/learning\"\n").unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/learning")));
    assert_eq!(config.logging.level, "info");
    assert!(config.anthropic_api_key.is_none());
    assert_eq!(config.models.challenge.model, DEFAULT_MODEL);
    assert_eq!(config.models.challenge.max_tokens, 2048);
}

#[test]
fn test_models_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
anthropic_api_key = "sk-ant-toml"
transcript_base_url = "http://localhost:9000"

[logging]
level = "debug"

[models.evaluation]
model = "claude-sonnet-4-5"
max_tokens = 512
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant-toml"));
    assert_eq!(config.transcript_base_url.as_deref(), Some("http://localhost:9000"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.models.evaluation.model, "claude-sonnet-4-5");
    assert_eq!(config.models.evaluation.max_tokens, 512);
    // Untouched tasks keep their defaults
    assert_eq!(config.models.breakpoints.max_tokens, 2000);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, learning_common::Error::Config(_)));
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let path = PathBuf::from("/nonexistent/learning-app/config.toml");

    assert_eq!(locate_config(Some(&path)), Some(path.clone()));
    assert!(matches!(load_toml_config(&path), Err(learning_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_api_key_env_beats_toml() {
    let var = "LEARNING_TEST_API_KEY";

    env::set_var(var, "  from-env  ");
    assert_eq!(resolve_api_key(var, Some("from-toml")).as_deref(), Some("from-env"));

    env::set_var(var, "   ");
    assert_eq!(resolve_api_key(var, Some("from-toml")).as_deref(), Some("from-toml"));

    env::remove_var(var);
    assert_eq!(resolve_api_key(var, Some("")), None);
    assert_eq!(resolve_api_key(var, None), None);
}
