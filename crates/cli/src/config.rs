//! Configuration loading and management

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for resolving a publishing target
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find identifier '{0}'")]
    UnknownTarget(String),
    #[error("target '{0}' has no password (set `pass` or `pass_env`)")]
    MissingPassword(String),
    #[error("environment variable {var} for target '{target}' is not set")]
    MissingPasswordEnv { target: String, var: String },
}

/// Top-level configuration: one section per publishing target
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct AppConfig {
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Credentials and image limits for one blog
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    pub user: String,

    #[serde(default, deserialize_with = "deserialize_secret")]
    pub pass: Option<SecretString>,

    /// Environment variable holding the password, used when `pass` is absent
    #[serde(default)]
    pub pass_env: Option<String>,

    /// Blog root URL
    pub url: String,

    pub max_width: u32,

    pub max_height: u32,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|s| SecretString::new(s.into())))
}

impl TargetConfig {
    /// Resolve the password from `pass` or the `pass_env` variable
    pub fn password(&self, name: &str) -> Result<SecretString, ConfigError> {
        if let Some(ref pass) = self.pass {
            return Ok(SecretString::new(pass.expose_secret().into()));
        }

        let var = self
            .pass_env
            .as_ref()
            .ok_or_else(|| ConfigError::MissingPassword(name.to_string()))?;

        std::env::var(var)
            .map(|value| SecretString::new(value.into()))
            .map_err(|_| ConfigError::MissingPasswordEnv {
                target: name.to_string(),
                var: var.clone(),
            })
    }
}

/// Target as printed by `config show` and on lookup failures
#[derive(Serialize)]
struct RedactedTarget<'a> {
    user: &'a str,
    pass: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pass_env: Option<&'a str>,
    url: &'a str,
    max_width: u32,
    max_height: u32,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// Without an explicit path, `./config.toml` and then `./config.ini` are
    /// tried. Environment variables `AUTOPOST__<TARGET>__<KEY>` override file
    /// values.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match config_path {
            Some(path) if !path.exists() => {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path) => {
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                let default_path = ["./config.toml", "./config.ini"]
                    .into_iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists());
                if let Some(path) = default_path {
                    builder = builder.add_source(config::File::from(path));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AUTOPOST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Look up a target by identifier
    pub fn target(&self, identifier: &str) -> Result<&TargetConfig, ConfigError> {
        self.targets
            .get(identifier)
            .ok_or_else(|| ConfigError::UnknownTarget(identifier.to_string()))
    }

    /// Render the parsed targets as TOML with passwords masked
    pub fn redacted_toml(&self) -> Result<String> {
        let targets: BTreeMap<&str, RedactedTarget<'_>> = self
            .targets
            .iter()
            .map(|(name, t)| {
                let redacted = RedactedTarget {
                    user: &t.user,
                    pass: if t.pass.is_some() { "********" } else { "" },
                    pass_env: t.pass_env.as_deref(),
                    url: &t.url,
                    max_width: t.max_width,
                    max_height: t.max_height,
                };
                (name.as_str(), redacted)
            })
            .collect();

        toml::to_string_pretty(&targets).context("Failed to render configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# autopost configuration
#
# One section per blog. Select it with `autopost publish --target <name>`.
# INI files with the same sections and keys are accepted as well.

[blog]
user = "editor"
# Either the password itself or the name of a variable holding it
# pass = "change-me"
pass_env = "AUTOPOST_BLOG_PASSWORD"
url = "https://blog.example.com"
# Images larger than this are embedded at a reduced size
max_width = 640
max_height = 480
"#
        .to_string()
    }
}
