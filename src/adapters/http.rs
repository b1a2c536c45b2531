use crate::domain::ports::DatasetSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const PROGRESS_EVERY_BYTES: u64 = 256 * 1024 * 1024;

/// Streams the reference dataset over HTTP(S) straight to disk.
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    client: Client,
    url: String,
}

impl HttpDatasetSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// 由 URL 模板與資料集 id 組出下載位址
    pub fn from_template(template: &str, dataset_id: &str) -> Self {
        Self::new(template.replace("{id}", dataset_id))
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch_to(&self, dest: &Path) -> Result<u64> {
        tracing::debug!("GET {}", self.url);
        let mut response = self.client.get(&self.url).send().await?.error_for_status()?;

        if let Some(total) = response.content_length() {
            tracing::info!("Dataset size reported by server: {} bytes", total);
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut next_report = PROGRESS_EVERY_BYTES;

        // 逐塊寫入，記憶體用量與檔案大小無關
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if written >= next_report {
                tracing::info!("⬇️ {} MB downloaded", written / 1024 / 1024);
                next_report += PROGRESS_EVERY_BYTES;
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        tracing::debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MatcherError;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_streams_body_to_file() {
        let server = MockServer::start_async().await;
        let body = "derived_domain,name\n".repeat(1000);

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/uc").query_param("id", "abc123");
                then.status(200).body(body.clone());
            })
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dataset.csv");
        let source = HttpDatasetSource::from_template(&server.url("/uc?id={id}"), "abc123");

        let written = source.fetch_to(&dest).await.unwrap();

        mock.assert_async().await;
        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let dir = TempDir::new().unwrap();
        let source = HttpDatasetSource::new(server.url("/missing"));
        let err = source.fetch_to(&dir.path().join("x.csv")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, MatcherError::ApiError(_)));
    }
}
