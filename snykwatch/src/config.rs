use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::client::AuthScheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// YAML for `.yaml`/`.yml`, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub org_id: String,
    #[serde(default)]
    pub api_token: Option<String>,
    pub targets_list: Vec<String>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_max_concurrency() -> usize {
    10
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("org_id", &self.org_id)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("targets_list", &self.targets_list)
            .field("max_concurrency", &self.max_concurrency)
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents, ConfigFormat::from_path(path))
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(contents)?,
            ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        };
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.org_id.trim().is_empty() {
            bail!("org_id must not be empty");
        }
        self.token()?;
        if self.max_concurrency == 0 {
            bail!("max_concurrency must be at least 1");
        }
        if self.max_concurrency > Semaphore::MAX_PERMITS {
            bail!(
                "max_concurrency must be at most {}, got {}",
                Semaphore::MAX_PERMITS,
                self.max_concurrency
            );
        }
        Ok(())
    }

    pub fn token(&self) -> Result<&str> {
        match self.api_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => bail!("api_token is missing; set it in the config file, --token, or SNYK_TOKEN"),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JSON: &str = r#"{
        "org_id": "org-1",
        "api_token": "secret",
        "targets_list": ["svc-a", "svc-b"]
    }"#;

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("c.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("c.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("c.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }

    #[test]
    fn parse_json_with_defaults() {
        let config = Config::parse(JSON, ConfigFormat::Json).unwrap();
        assert_eq!(config.org_id, "org-1");
        assert_eq!(config.token().unwrap(), "secret");
        assert_eq!(config.targets_list, vec!["svc-a", "svc-b"]);
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.auth_scheme, AuthScheme::Token);
        assert!(config.timeout().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn parse_yaml_with_options() {
        let yaml = "org_id: org-2\n\
                    api_token: tok\n\
                    targets_list:\n  - svc-a\n\
                    max_concurrency: 4\n\
                    auth_scheme: bearer\n\
                    timeout_secs: 30\n";
        let config = Config::parse(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.org_id, "org-2");
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_required_key_is_error() {
        let err = Config::parse(r#"{"org_id": "o"}"#, ConfigFormat::Json).unwrap_err();
        assert!(err.to_string().contains("targets_list"), "got: {err}");
    }

    #[test]
    fn missing_token_fails_validation() {
        let config =
            Config::parse(r#"{"org_id": "o", "targets_list": []}"#, ConfigFormat::Json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let mut config = Config::parse(JSON, ConfigFormat::Json).unwrap();
        config.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_concurrency_fails_validation() {
        let json = r#"{
            "org_id": "org-1",
            "api_token": "secret",
            "targets_list": ["svc-a"],
            "max_concurrency": 18446744073709551615
        }"#;
        let config = Config::parse(json, ConfigFormat::Json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"), "got: {err}");

        let mut config = Config::parse(JSON, ConfigFormat::Json).unwrap();
        config.max_concurrency = Semaphore::MAX_PERMITS;
        config.validate().unwrap();
    }

    #[test]
    fn empty_org_fails_validation() {
        let mut config = Config::parse(JSON, ConfigFormat::Json).unwrap();
        config.org_id = " ".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("org_id"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = Config::parse(JSON, ConfigFormat::Json).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn load_reads_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.org_id, "org-1");
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = Config::load(Path::new("/nonexistent/snykwatch.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snykwatch.json"));
    }
}
