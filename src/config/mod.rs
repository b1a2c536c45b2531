pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{MatcherError, Result};
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DATASET_PATH: &str = "/tmp/bd_companies.csv";
pub const DEFAULT_ALLOWED_EMAIL_DOMAIN: &str = "@12252025trypecter.com";

/// 使用者提交的網域來源：上傳的 CSV 或單一網域
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    CsvFile(String),
    Single(String),
}

impl InputSource {
    pub fn from_options(input: Option<&str>, domain: Option<&str>) -> Result<Self> {
        match (input, domain) {
            (Some(path), None) => {
                validation::validate_path("input", path)?;
                Ok(Self::CsvFile(path.to_string()))
            }
            (None, Some(domain)) => Ok(Self::Single(domain.to_string())),
            (Some(_), Some(_)) => Err(MatcherError::ConfigValidationError {
                field: "input".to_string(),
                message: "use either --input or --domain, not both".to_string(),
            }),
            (None, None) => Err(MatcherError::MissingConfigError {
                field: "input or domain".to_string(),
            }),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "bd-domain-matcher")]
#[command(about = "Match uploaded domains against the BD company dataset")]
pub struct CliConfig {
    #[arg(long, help = "Work email used for the access check")]
    pub email: Option<String>,

    #[arg(long, help = "CSV file with one domain per row, no header")]
    pub input: Option<String>,

    #[arg(long, conflicts_with = "input", help = "Match a single domain")]
    pub domain: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_DATASET_PATH)]
    pub dataset_path: String,

    #[arg(long, help = "Id of the reference CSV dataset to download")]
    pub dataset_id: String,

    #[arg(long, help = "Download URL with an {id} placeholder")]
    pub dataset_url_template: String,

    #[arg(long, default_value = DEFAULT_ALLOWED_EMAIL_DOMAIN)]
    pub allowed_domain: String,

    #[arg(long, default_value = "1048576")]
    pub min_dataset_bytes: u64,

    #[arg(long, default_value = "1800")]
    pub fetch_timeout_secs: u64,

    #[arg(long, default_value = "100")]
    pub preview_rows: usize,

    #[arg(long, help = "Also write a ZIP bundle with the CSV and a summary")]
    pub zip: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn input_source(&self) -> Result<InputSource> {
        InputSource::from_options(self.input.as_deref(), self.domain.as_deref())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn allowed_email_domain(&self) -> &str {
        &self.allowed_domain
    }

    fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    fn dataset_url_template(&self) -> &str {
        &self.dataset_url_template
    }

    fn dataset_path(&self) -> &str {
        &self.dataset_path
    }

    fn min_dataset_bytes(&self) -> u64 {
        self.min_dataset_bytes
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn preview_rows(&self) -> usize {
        self.preview_rows
    }

    fn zip_output(&self) -> bool {
        self.zip
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.input_source()?;
        validation::validate_url_template("dataset_url_template", &self.dataset_url_template)?;
        validation::validate_non_empty_string("dataset_id", &self.dataset_id)?;
        validation::validate_path("dataset_path", &self.dataset_path)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("allowed_domain", &self.allowed_domain)?;
        validation::validate_positive_number("fetch_timeout_secs", self.fetch_timeout_secs, 1)?;
        Ok(())
    }
}
