//! Configuration loader and validator for the candidature sync engine.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub backend: Backend,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    /// Seconds before a notification auto-dismisses.
    pub toast_ttl_seconds: u64,
}

/// Remote backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backend {
    pub base_url: String,
    /// Optional bearer token; omitted for anonymous local backends.
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    pub fn base_url(&self) -> Result<reqwest::Url, ConfigError> {
        reqwest::Url::parse(&self.backend.base_url)
            .map_err(|_| ConfigError::Invalid("backend.base_url must be a valid URL"))
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.toast_ttl_seconds == 0 {
        return Err(ConfigError::Invalid("app.toast_ttl_seconds must be > 0"));
    }

    if cfg.backend.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.base_url must be non-empty"));
    }
    cfg.base_url()?;

    if let Some(token) = &cfg.backend.token {
        if token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backend.token must be non-empty when set",
            ));
        }
    }

    Ok(())
}

/// Example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  toast_ttl_seconds: 4

backend:
  base_url: "http://localhost:8080"
  token: "YOUR_API_TOKEN"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.toast_ttl_seconds, 4);
    }

    #[test]
    fn invalid_toast_ttl() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.toast_ttl_seconds = 0;
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("toast_ttl_seconds")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_base_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.base_url = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("base_url")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.base_url = "not a url".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn empty_token_rejected_but_absent_token_allowed() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.token = Some("".into());
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.backend.token = None;
        validate(&cfg).unwrap();
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(example().as_bytes()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.backend.base_url, "http://localhost:8080");
    }
}
