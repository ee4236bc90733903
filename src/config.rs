use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "BACONLINK_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,
    /// File the configuration was read from; `None` when defaults were used
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Oracle endpoint and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            log_level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    format!("http://{}{}", crate::oracle::ORACLE_HOST, crate::oracle::ORACLE_PATH)
}

fn default_api_key_env() -> String {
    "ORACLE_OF_BACON_API_KEY".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in BACONLINK_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (defaults are used if absent)
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let (config_path, required) = match std::env::var(CONFIG_ENV) {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from("config.toml"), false),
        };

        if !required && !config_path.exists() {
            return Ok(Config::default());
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;
        config.source = Some(config_path);

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = self.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "oracle.base_url must be an http or https URL, got scheme '{}'",
                url.scheme()
            );
        }

        if self.oracle.api_key_env.trim().is_empty() {
            anyhow::bail!("oracle.api_key_env must name an environment variable");
        }

        Ok(())
    }

    /// Parsed query endpoint
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.oracle.base_url)
            .with_context(|| format!("oracle.base_url is not a valid URL: {}", self.oracle.base_url))
    }

    /// API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.oracle.api_key_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or pass --api-key.",
                self.oracle.api_key_env
            )
        })
    }

    /// API key to query with: the explicit one if given, else the configured
    /// environment variable.
    ///
    /// A missing key comes back empty so that query validation reports it
    /// alongside any other input problems.
    pub fn resolve_api_key(&self, explicit: Option<String>) -> String {
        if let Some(key) = explicit {
            return key;
        }
        match self.api_key() {
            Ok(key) => key,
            Err(e) => {
                log::warn!("{}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_env(key: &str, value: Option<&str>, f: impl FnOnce()) {
        let original = std::env::var(key).ok();
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
        f();
        std::env::remove_var(key);
        if let Some(v) = original {
            std::env::set_var(key, v);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.source.is_none());
        assert_eq!(config.oracle.base_url, "http://oracleofbacon.org/cgi-bin/xml");
        assert_eq!(config.oracle.api_key_env, "ORACLE_OF_BACON_API_KEY");
        assert_eq!(config.oracle.log_level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
[oracle]
base_url = "http://127.0.0.1:8080/cgi-bin/xml"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url().unwrap().port(), Some(8080));
        assert_eq!(config.oracle.api_key_env, "ORACLE_OF_BACON_API_KEY");
    }

    #[test]
    fn test_from_toml_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.oracle.log_level, "warn");
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let err = Config::from_toml("[oracle]\nbase_url = \"ftp://oracleofbacon.org/xml\"\n").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_unparsable_url() {
        assert!(Config::from_toml("[oracle]\nbase_url = \"not a url\"\n").is_err());
    }

    #[test]
    fn test_rejects_empty_api_key_env() {
        assert!(Config::from_toml("[oracle]\napi_key_env = \"\"\n").is_err());
    }

    #[test]
    fn test_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("baconlink.toml");
        fs::write(
            &config_path,
            "[oracle]\napi_key_env = \"BACONLINK_TEST_KEY\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        with_env(CONFIG_ENV, config_path.to_str(), || {
            let config = Config::load().unwrap();
            assert_eq!(config.oracle.api_key_env, "BACONLINK_TEST_KEY");
            assert_eq!(config.oracle.log_level, "debug");
            assert_eq!(config.source.as_deref(), Some(config_path.as_path()));
        });
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        with_env(CONFIG_ENV, Some("nonexistent-baconlink.toml"), || {
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("nonexistent-baconlink.toml"));
        });
    }

    #[test]
    fn test_api_key_from_env() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let config = Config::from_toml("[oracle]\napi_key_env = \"BACONLINK_TEST_API_KEY\"\n").unwrap();

        with_env("BACONLINK_TEST_API_KEY", Some("38b99ce9ec87"), || {
            assert_eq!(config.api_key().unwrap(), "38b99ce9ec87");
        });
        with_env("BACONLINK_TEST_API_KEY", None, || {
            let err = config.api_key().unwrap_err();
            assert!(err.to_string().contains("BACONLINK_TEST_API_KEY"));
        });
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let config = Config::from_toml("[oracle]\napi_key_env = \"BACONLINK_TEST_RESOLVE_KEY\"\n").unwrap();

        with_env("BACONLINK_TEST_RESOLVE_KEY", Some("from-env"), || {
            assert_eq!(config.resolve_api_key(Some("from-cli".to_string())), "from-cli");
            assert_eq!(config.resolve_api_key(None), "from-env");
        });
    }

    #[test]
    fn test_missing_api_key_reaches_validation() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let config = Config::from_toml("[oracle]\napi_key_env = \"BACONLINK_TEST_RESOLVE_KEY\"\n").unwrap();

        with_env("BACONLINK_TEST_RESOLVE_KEY", None, || {
            let api_key = config.resolve_api_key(None);
            assert_eq!(api_key, "");

            let errors = crate::QueryParameters::configure("Kevin Bacon", "Kevin Bacon", api_key)
                .unwrap_err();
            assert_eq!(errors.on("api_key"), vec!["api_key must be present"]);
            assert_eq!(errors.on("from"), vec!["From cannot be the same as To"]);
        });
    }
}
