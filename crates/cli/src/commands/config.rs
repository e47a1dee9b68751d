use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use deadline_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use toml::Value;

use super::{escape_json, CommandResult, EXIT_CONFIG_FAILURE};

#[derive(Debug, Serialize)]
struct ConfigField {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    precedence: &'static str,
    fields: Vec<ConfigField>,
}

struct FieldSources {
    doc: Option<Value>,
    path: Option<PathBuf>,
}

impl FieldSources {
    fn detect() -> Self {
        let path = detect_config_path();
        let doc = load_config_file_doc(path.as_deref());
        Self { doc, path }
    }

    fn field(&self, key: &'static str, value: String, env_keys: &[&str]) -> ConfigField {
        ConfigField { key, value, source: self.source_of(key, env_keys) }
    }

    /// `env_keys` are listed from highest to lowest precedence.
    fn source_of(&self, key_path: &str, env_keys: &[&str]) -> String {
        let env_key = env_keys
            .iter()
            .copied()
            .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
        if let Some(env_key) = env_key {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    let sources = FieldSources::detect();
    let signing_secret =
        if config.slack.signing_secret.is_some() { "<redacted>" } else { "<unset>" };

    let report = ConfigReport {
        precedence: "overrides > env > file > default",
        fields: vec![
            sources.field(
                "source.base_url",
                config.source.base_url.clone(),
                &["DEADLINE_SOURCE_BASE_URL"],
            ),
            sources.field(
                "source.timeout_secs",
                config.source.timeout_secs.to_string(),
                &["DEADLINE_SOURCE_TIMEOUT_SECS"],
            ),
            sources.field(
                "slack.signing_secret",
                signing_secret.to_string(),
                &["DEADLINE_SLACK_SIGNING_SECRET"],
            ),
            sources.field(
                "server.bind_address",
                config.server.bind_address.clone(),
                &["DEADLINE_SERVER_BIND_ADDRESS"],
            ),
            sources.field(
                "server.port",
                config.server.port.to_string(),
                &["DEADLINE_SERVER_PORT", "PORT"],
            ),
            sources.field(
                "server.graceful_shutdown_secs",
                config.server.graceful_shutdown_secs.to_string(),
                &["DEADLINE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            ),
            sources.field(
                "logging.level",
                config.logging.level.clone(),
                &["DEADLINE_LOGGING_LEVEL", "DEADLINE_LOG_LEVEL"],
            ),
            sources.field(
                "logging.format",
                format!("{:?}", config.logging.format).to_lowercase(),
                &["DEADLINE_LOGGING_FORMAT", "DEADLINE_LOG_FORMAT"],
            ),
        ],
    };

    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!("{{\"error\":\"config serialization failed: {}\"}}", escape_json(&error.to_string()))
    });
    CommandResult::raw(0, output)
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("deadline.toml"), PathBuf::from("config/deadline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
