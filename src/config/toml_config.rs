use crate::config::{DEFAULT_ALLOWED_EMAIL_DOMAIN, DEFAULT_DATASET_PATH};
use crate::core::dataset::DEFAULT_KEY_COLUMN;
use crate::core::provisioner::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MIN_DATASET_BYTES};
use crate::core::reporter::DEFAULT_PREVIEW_ROWS;
use crate::core::ConfigProvider;
use crate::utils::error::{MatcherError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    pub allowed_email_domain: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub id: Option<String>,
    pub url_template: Option<String>,
    pub local_path: Option<String>,
    pub key_column: Option<String>,
    pub min_bytes: Option<u64>,
    pub fetch_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub preview_rows: Option<usize>,
    pub zip: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MatcherError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATASET_ID})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MatcherError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn allowed_email_domain(&self) -> &str {
        self.access
            .allowed_email_domain
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_EMAIL_DOMAIN)
    }

    fn dataset_id(&self) -> &str {
        self.dataset.id.as_deref().unwrap_or_default()
    }

    fn dataset_url_template(&self) -> &str {
        self.dataset.url_template.as_deref().unwrap_or_default()
    }

    fn dataset_path(&self) -> &str {
        self.dataset
            .local_path
            .as_deref()
            .unwrap_or(DEFAULT_DATASET_PATH)
    }

    fn min_dataset_bytes(&self) -> u64 {
        self.dataset.min_bytes.unwrap_or(DEFAULT_MIN_DATASET_BYTES)
    }

    fn fetch_timeout(&self) -> Duration {
        self.dataset
            .fetch_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn preview_rows(&self) -> usize {
        self.output.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS)
    }

    fn zip_output(&self) -> bool {
        self.output.zip.unwrap_or(false)
    }

    fn key_column(&self) -> &str {
        self.dataset
            .key_column
            .as_deref()
            .unwrap_or(DEFAULT_KEY_COLUMN)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url_template("dataset.url_template", self.dataset_url_template())?;
        validation::validate_non_empty_string("dataset.id", self.dataset_id())?;
        validation::validate_path("dataset.local_path", self.dataset_path())?;
        validation::validate_non_empty_string("dataset.key_column", self.key_column())?;
        validation::validate_path("output.path", self.output_path())?;
        validation::validate_non_empty_string(
            "access.allowed_email_domain",
            self.allowed_email_domain(),
        )?;
        if let Some(timeout) = self.dataset.fetch_timeout_seconds {
            validation::validate_positive_number("dataset.fetch_timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
