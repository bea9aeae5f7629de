use crate::core::dashboard::{DEFAULT_POLL_INTERVAL, DEFAULT_PULSE_DURATION};
use crate::core::search::{DEFAULT_DEBOUNCE_WINDOW, DEFAULT_MIN_CHARS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "./exports";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub dashboard: Option<DashboardConfig>,
    pub search: Option<SearchConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub poll_interval_seconds: Option<u64>,
    pub pulse_millis: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub debounce_millis: Option<u64>,
    pub min_chars: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl ClientConfig {
    /// Defaults for everything but the server address.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                base_url: base_url.into(),
                timeout_seconds: None,
            },
            dashboard: None,
            search: None,
            export: None,
        }
    }

    /// Loads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ClientError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ClientError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClientError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(ClientError::MissingConfigError {
                field: "server.base_url".to_string(),
            });
        }
        validation::validate_url("server.base_url", &self.server.base_url)?;

        if let Some(timeout) = self.server.timeout_seconds {
            validation::validate_range("server.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(dashboard) = &self.dashboard {
            if let Some(secs) = dashboard.poll_interval_seconds {
                validation::validate_range("dashboard.poll_interval_seconds", secs, 1, 86_400)?;
            }
            if let Some(millis) = dashboard.pulse_millis {
                validation::validate_range("dashboard.pulse_millis", millis, 1, 60_000)?;
            }
        }

        if let Some(search) = &self.search {
            if let Some(millis) = search.debounce_millis {
                validation::validate_range("search.debounce_millis", millis, 1, 60_000)?;
            }
            if let Some(min_chars) = search.min_chars {
                validation::validate_range("search.min_chars", min_chars, 1, 64)?;
            }
        }

        if let Some(export) = &self.export {
            validation::validate_path("export.output_dir", &export.output_dir)?;
        }

        Ok(())
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.server.base_url
    }

    fn poll_interval(&self) -> Duration {
        self.dashboard
            .as_ref()
            .and_then(|d| d.poll_interval_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    fn pulse_duration(&self) -> Duration {
        self.dashboard
            .as_ref()
            .and_then(|d| d.pulse_millis)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PULSE_DURATION)
    }

    fn debounce_window(&self) -> Duration {
        self.search
            .as_ref()
            .and_then(|s| s.debounce_millis)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE_WINDOW)
    }

    fn min_search_chars(&self) -> usize {
        self.search
            .as_ref()
            .and_then(|s| s.min_chars)
            .unwrap_or(DEFAULT_MIN_CHARS)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn output_dir(&self) -> &str {
        self.export
            .as_ref()
            .map(|e| e.output_dir.as_str())
            .unwrap_or(DEFAULT_OUTPUT_DIR)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
base_url = "https://kayit.example.com/panel/"
timeout_seconds = 10

[dashboard]
poll_interval_seconds = 15
pulse_millis = 250

[search]
debounce_millis = 300
min_chars = 3

[export]
output_dir = "./out"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_url(), "https://kayit.example.com/panel/");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.pulse_duration(), Duration::from_millis(250));
        assert_eq!(config.debounce_window(), Duration::from_millis(300));
        assert_eq!(config.min_search_chars(), 3);
        assert_eq!(config.output_dir(), "./out");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
[server]
base_url = "http://localhost:8000/"
"#,
        )
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.pulse_duration(), Duration::from_millis(500));
        assert_eq!(config.debounce_window(), Duration::from_millis(500));
        assert_eq!(config.min_search_chars(), 2);
        assert_eq!(config.output_dir(), "./exports");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("KAYIT_TEST_BASE_URL", "https://test.kayit.local/");

        let config = ClientConfig::from_toml_str(
            r#"
[server]
base_url = "${KAYIT_TEST_BASE_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://test.kayit.local/");

        std::env::remove_var("KAYIT_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::with_base_url("invalid-url");
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_base_url(DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());

        config.search = Some(SearchConfig {
            debounce_millis: None,
            min_chars: Some(0),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_base_url_is_missing() {
        let config = ClientConfig::with_base_url("  ");
        assert!(matches!(
            config.validate(),
            Err(ClientError::MissingConfigError { field }) if field == "server.base_url"
        ));
    }

    #[test]
    fn test_missing_server_section_fails() {
        assert!(ClientConfig::from_toml_str("[dashboard]\npoll_interval_seconds = 5\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nbase_url = \"http://127.0.0.1:9000/\"\n")
            .unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:9000/");
    }
}
