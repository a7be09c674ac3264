use super::{load_settings_from, prepare_session_path, Settings};

use std::{collections::HashMap, fs, path::PathBuf};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn missing_file_and_empty_env_give_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&dir.path().join("billed.toml"), env_of(&[])).expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.api_url, "http://localhost:5678");
    assert!(settings.exclude_test_accounts);
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("billed.toml");
    fs::write(
        &path,
        r#"
api_url = "https://api.billed.tld"
session_path = "/tmp/billed/session.json"
exclude_test_accounts = false
request_timeout_secs = 3
"#,
    )
    .expect("write config");

    let settings = load_settings_from(&path, env_of(&[])).expect("settings");
    assert_eq!(settings.api_url, "https://api.billed.tld");
    assert_eq!(settings.session_path, PathBuf::from("/tmp/billed/session.json"));
    assert!(!settings.exclude_test_accounts);
    assert_eq!(settings.request_timeout_secs, 3);
    assert_eq!(settings.log_level, "info");
}

#[test]
fn app_prefixed_env_wins_over_legacy_names_and_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("billed.toml");
    fs::write(&path, "api_url = \"https://file.tld\"\n").expect("write config");

    let settings = load_settings_from(
        &path,
        env_of(&[
            ("BILLED_API_URL", "https://legacy.tld"),
            ("APP__API_URL", "https://app.tld"),
            ("APP__LOG_LEVEL", "debug"),
            ("APP__EXCLUDE_TEST_ACCOUNTS", "0"),
            ("APP__REQUEST_TIMEOUT_SECS", "30"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.api_url, "https://app.tld");
    assert_eq!(settings.log_level, "debug");
    assert!(!settings.exclude_test_accounts);
    assert_eq!(settings.request_timeout().as_secs(), 30);
}

#[test]
fn invalid_values_are_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("billed.toml");
    assert!(load_settings_from(&path, env_of(&[("APP__REQUEST_TIMEOUT_SECS", "soon")])).is_err());
    assert!(load_settings_from(&path, env_of(&[("APP__EXCLUDE_TEST_ACCOUNTS", "maybe")])).is_err());

    fs::write(&path, "api_url = ").expect("write config");
    let err = load_settings_from(&path, env_of(&[])).expect_err("broken toml");
    assert!(err.to_string().contains("invalid config file"));
}

#[test]
fn creates_parent_dir_for_session_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session_path = dir.path().join("data").join("session.json");

    prepare_session_path(&session_path).expect("prepare session path");
    assert!(dir.path().join("data").is_dir());
    assert!(!session_path.exists());
}

#[test]
fn bare_file_name_needs_no_directory() {
    prepare_session_path(&PathBuf::from("session.json")).expect("prepare session path");
}
