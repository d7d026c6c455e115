use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::providers::util::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "http://fund.eastmoney.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EastmoneyProviderConfig {
    pub base_url: String,
}

impl Default for EastmoneyProviderConfig {
    fn default() -> Self {
        EastmoneyProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub eastmoney: EastmoneyProviderConfig,
}

/// Settings for a collector that fetches one page per fund code.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PageCollectorConfig {
    /// Total attempts per page, including the first one.
    pub max_attempts: usize,
    #[serde(default)]
    pub retry_delay_ms: u64,
    /// Pause between two fund codes.
    #[serde(default)]
    pub delay_ms: u64,
}

impl PageCollectorConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_detail_config() -> PageCollectorConfig {
    PageCollectorConfig {
        max_attempts: 3,
        retry_delay_ms: 0,
        delay_ms: 100,
    }
}

fn default_risk_config() -> PageCollectorConfig {
    PageCollectorConfig {
        max_attempts: 1,
        retry_delay_ms: 0,
        delay_ms: 0,
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollectConfig {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_detail_config")]
    pub detail: PageCollectorConfig,
    #[serde(default = "default_risk_config")]
    pub risk: PageCollectorConfig,
}

fn default_category() -> String {
    "all".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_period() -> String {
    "1y".to_string()
}

impl Default for CollectConfig {
    fn default() -> Self {
        CollectConfig {
            category: default_category(),
            page_size: default_page_size(),
            period: default_period(),
            detail: default_detail_config(),
            risk: default_risk_config(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReportConfig {
    /// Row count of the truncated report; unset keeps every row.
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub report: ReportConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("org", "fundrank", "fundrank")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_log_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("log"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");

        assert_eq!(config.providers.eastmoney.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.collect.category, "all");
        assert_eq!(config.collect.page_size, 1000);
        assert_eq!(config.collect.period, "1y");
        assert_eq!(config.collect.detail.max_attempts, 3);
        assert_eq!(config.collect.detail.delay_ms, 100);
        assert_eq!(config.collect.risk.max_attempts, 1);
        assert!(config.report.top_n.is_none());
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  eastmoney:
    base_url: "http://localhost:8080"
collect:
  category: gp
  page_size: 500
  period: 6m
  detail:
    max_attempts: 5
    retry_delay_ms: 250
  risk:
    max_attempts: 3
    delay_ms: 50
report:
  top_n: 50
data_path: /tmp/fundrank
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.eastmoney.base_url, "http://localhost:8080");
        assert_eq!(config.collect.category, "gp");
        assert_eq!(config.collect.page_size, 500);
        assert_eq!(config.collect.period, "6m");
        assert_eq!(
            config.collect.detail,
            PageCollectorConfig {
                max_attempts: 5,
                retry_delay_ms: 250,
                delay_ms: 0,
            }
        );
        assert_eq!(config.collect.risk.max_attempts, 3);
        assert_eq!(config.collect.risk.delay(), Duration::from_millis(50));
        assert_eq!(config.report.top_n, Some(50));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fundrank")
        );
    }

    #[test]
    fn test_retry_policy_never_drops_below_one_attempt() {
        let config = PageCollectorConfig {
            max_attempts: 0,
            retry_delay_ms: 10,
            delay_ms: 0,
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(10));
    }

    #[test]
    fn test_load_from_path_reports_missing_file() {
        let result = AppConfig::load_from_path("/nonexistent/fundrank/config.yaml");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
