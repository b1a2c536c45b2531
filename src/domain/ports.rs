use crate::domain::model::{InputDomainSet, MatchResult, Summary};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn allowed_email_domain(&self) -> &str;
    fn dataset_id(&self) -> &str;
    fn dataset_url_template(&self) -> &str;
    fn dataset_path(&self) -> &str;
    fn min_dataset_bytes(&self) -> u64;
    fn fetch_timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn preview_rows(&self) -> usize;
    fn zip_output(&self) -> bool;

    fn key_column(&self) -> &str {
        "derived_domain"
    }

    /// 把資料集 id 代入 URL 模板
    fn dataset_url(&self) -> String {
        self.dataset_url_template().replace("{id}", self.dataset_id())
    }
}

/// Remote location the reference dataset is fetched from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Streams the full remote body into `dest`, returning bytes written.
    async fn fetch_to(&self, dest: &Path) -> Result<u64>;

    fn describe(&self) -> String;
}

/// Output of the transform phase: the join result plus its summary.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub summary: Summary,
}

/// What a finished run hands back to the front end.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub csv_path: String,
    pub zip_path: Option<String>,
    pub summary: Summary,
    pub preview: String,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn authorize(&self) -> Result<()>;
    async fn extract(&self) -> Result<InputDomainSet>;
    async fn transform(&self, inputs: InputDomainSet) -> Result<MatchOutcome>;
    async fn load(&self, outcome: MatchOutcome) -> Result<RunReport>;
}
