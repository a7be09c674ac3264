use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};

pub const CONFIG_FILE: &str = "billed.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub session_path: PathBuf,
    pub log_level: String,
    pub exclude_test_accounts: bool,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5678".into(),
            session_path: PathBuf::from("./data/session.json"),
            log_level: "info".into(),
            exclude_test_accounts: true,
            request_timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional file at `path`, then environment variables.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    if let Some(v) = env("BILLED_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("BILLED_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    if let Some(v) = env("APP__EXCLUDE_TEST_ACCOUNTS") {
        settings.exclude_test_accounts =
            parse_flag(&v).context("APP__EXCLUDE_TEST_ACCOUNTS")?;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
    }

    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;

    if let Some(v) = table.get("api_url") {
        settings.api_url = as_text(v);
    }
    if let Some(v) = table.get("session_path") {
        settings.session_path = PathBuf::from(as_text(v));
    }
    if let Some(v) = table.get("log_level") {
        settings.log_level = as_text(v);
    }
    if let Some(v) = table.get("exclude_test_accounts") {
        settings.exclude_test_accounts = match v {
            toml::Value::Boolean(flag) => *flag,
            other => parse_flag(&as_text(other)).context("exclude_test_accounts")?,
        };
    }
    if let Some(v) = table.get("request_timeout_secs") {
        settings.request_timeout_secs = match v {
            toml::Value::Integer(secs) => u64::try_from(*secs)
                .context("request_timeout_secs must not be negative")?,
            other => as_text(other)
                .parse()
                .context("request_timeout_secs is not a number")?,
        };
    }

    Ok(())
}

fn as_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

/// Creates the directory the session file lives in.
pub fn prepare_session_path(path: &Path) -> anyhow::Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for session file '{}'",
            parent.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
