use crate::config::InputSource;
use crate::core::access::AccessGate;
use crate::core::match_engine::match_domains;
use crate::core::provisioner::DatasetProvisioner;
use crate::core::reporter::{self, RESULT_CSV_NAME, RESULT_ZIP_NAME};
use crate::core::{
    ConfigProvider, DatasetSource, InputDomainSet, MatchOutcome, Pipeline, RunReport, Storage,
};
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// One user submission: gate → read domains → join → write artifact.
///
/// The provisioner is shared behind an `Arc` so several submissions in one
/// process reuse a single dataset download.
pub struct DomainMatchPipeline<S: Storage, C: ConfigProvider, D: DatasetSource> {
    storage: S,
    config: C,
    gate: AccessGate,
    provisioner: Arc<DatasetProvisioner<D>>,
    email: Option<String>,
    input: InputSource,
}

impl<S: Storage, C: ConfigProvider, D: DatasetSource> DomainMatchPipeline<S, C, D> {
    pub fn new(
        storage: S,
        config: C,
        provisioner: Arc<DatasetProvisioner<D>>,
        email: Option<String>,
        input: InputSource,
    ) -> Self {
        let gate = AccessGate::new(config.allowed_email_domain());
        Self {
            storage,
            config,
            gate,
            provisioner,
            email,
            input,
        }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, D: DatasetSource> Pipeline for DomainMatchPipeline<S, C, D> {
    async fn authorize(&self) -> Result<()> {
        self.gate.check(self.email.as_deref())
    }

    async fn extract(&self) -> Result<InputDomainSet> {
        let inputs = match &self.input {
            InputSource::CsvFile(path) => {
                tracing::debug!("Reading uploaded domains from {}", path);
                let bytes = self.storage.read_file(path).await?;
                InputDomainSet::from_csv_bytes(&bytes)
            }
            InputSource::Single(domain) => InputDomainSet::single(domain.clone()),
        };

        tracing::debug!("Submitted {} domain rows", inputs.len());
        Ok(inputs)
    }

    async fn transform(&self, inputs: InputDomainSet) -> Result<MatchOutcome> {
        let dataset = self.provisioner.ensure().await?;

        tracing::info!("🔎 Running domain match…");
        let result = match_domains(dataset, &inputs).await?;
        let summary = reporter::summarize(&inputs, &result);

        tracing::info!(
            "Matched rows: {} ({} of {} submitted domains matched)",
            summary.row_count,
            summary.matched_count,
            summary.input_count
        );

        Ok(MatchOutcome { result, summary })
    }

    async fn load(&self, outcome: MatchOutcome) -> Result<RunReport> {
        let MatchOutcome { result, summary } = outcome;

        let csv_bytes = reporter::serialize(&result)?;
        let csv_path = self.output_file(RESULT_CSV_NAME);
        tracing::debug!("Writing {} bytes to {}", csv_bytes.len(), csv_path);
        self.storage.write_file(&csv_path, &csv_bytes).await?;

        let zip_path = if self.config.zip_output() {
            let zip_data = reporter::bundle_zip(&result, &summary)?;
            let zip_path = self.output_file(RESULT_ZIP_NAME);
            tracing::debug!("Writing ZIP bundle ({} bytes) to {}", zip_data.len(), zip_path);
            self.storage.write_file(&zip_path, &zip_data).await?;
            Some(zip_path)
        } else {
            None
        };

        Ok(RunReport {
            csv_path,
            zip_path,
            preview: reporter::render_preview(&result, self.config.preview_rows()),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provisioner::ProvisionSettings;
    use crate::utils::error::MatcherError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    const DATASET: &str =
        "derived_domain,name\nacme.com,Acme\nacme.com,Acme Labs\nfoo.com,Foo\n";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                MatcherError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    struct MockConfig {
        dataset_path: String,
        zip: bool,
    }

    impl ConfigProvider for MockConfig {
        fn allowed_email_domain(&self) -> &str {
            "@corp.example"
        }

        fn dataset_id(&self) -> &str {
            "test"
        }

        fn dataset_url_template(&self) -> &str {
            "http://unused.test/{id}"
        }

        fn dataset_path(&self) -> &str {
            &self.dataset_path
        }

        fn min_dataset_bytes(&self) -> u64 {
            16
        }

        fn fetch_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn preview_rows(&self) -> usize {
            100
        }

        fn zip_output(&self) -> bool {
            self.zip
        }
    }

    #[derive(Clone, Default)]
    struct StaticSource {
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DatasetSource for StaticSource {
        async fn fetch_to(&self, dest: &Path) -> Result<u64> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::fs::write(dest, DATASET).await?;
            Ok(DATASET.len() as u64)
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    fn pipeline(
        dir: &TempDir,
        storage: MockStorage,
        email: Option<&str>,
        input: InputSource,
        zip: bool,
    ) -> DomainMatchPipeline<MockStorage, MockConfig, StaticSource> {
        let config = MockConfig {
            dataset_path: dir.path().join("companies.csv").to_string_lossy().into_owned(),
            zip,
        };
        let provisioner = Arc::new(DatasetProvisioner::new(
            StaticSource::default(),
            ProvisionSettings::from_config(&config),
        ));
        DomainMatchPipeline::new(storage, config, provisioner, email.map(String::from), input)
    }

    #[tokio::test]
    async fn test_authorize() {
        let dir = TempDir::new().unwrap();
        let single = InputSource::Single("acme.com".to_string());

        let ok = pipeline(&dir, MockStorage::new(), Some("a@corp.example"), single.clone(), false);
        assert!(ok.authorize().await.is_ok());

        let denied = pipeline(&dir, MockStorage::new(), Some("a@gmail.com"), single.clone(), false);
        assert!(matches!(
            denied.authorize().await,
            Err(MatcherError::AccessDenied { .. })
        ));

        let anonymous = pipeline(&dir, MockStorage::new(), None, single, false);
        assert!(anonymous.authorize().await.is_err());
    }

    #[tokio::test]
    async fn test_extract_from_uploaded_csv() {
        let dir = TempDir::new().unwrap();
        let storage = MockStorage::new();
        storage.put("upload.csv", b"www.ACME.com\nbar.com\n").await;

        let p = pipeline(
            &dir,
            storage,
            Some("a@corp.example"),
            InputSource::CsvFile("upload.csv".to_string()),
            false,
        );
        let inputs = p.extract().await.unwrap();
        assert_eq!(inputs.raw(), &["www.ACME.com", "bar.com"]);
    }

    #[tokio::test]
    async fn test_extract_missing_upload_is_io_error() {
        let dir = TempDir::new().unwrap();
        let p = pipeline(
            &dir,
            MockStorage::new(),
            Some("a@corp.example"),
            InputSource::CsvFile("nope.csv".to_string()),
            false,
        );
        assert!(matches!(p.extract().await, Err(MatcherError::IoError(_))));
    }

    #[tokio::test]
    async fn test_transform_and_load_scenario() {
        let dir = TempDir::new().unwrap();
        let storage = MockStorage::new();
        let p = pipeline(
            &dir,
            storage.clone(),
            Some("a@corp.example"),
            InputSource::Single("acme.com".to_string()),
            true,
        );

        let inputs = InputDomainSet::new(vec!["www.ACME.com".into(), "bar.com".into()]);
        let outcome = p.transform(inputs).await.unwrap();
        assert_eq!(outcome.summary.input_count, 2);
        assert_eq!(outcome.summary.matched_count, 1);
        assert_eq!(outcome.result.len(), 2);

        let report = p.load(outcome).await.unwrap();
        assert_eq!(report.csv_path, "out/matched_domains.csv");
        assert_eq!(report.zip_path.as_deref(), Some("out/matched_domains.zip"));
        assert_eq!(report.preview.lines().count(), 3);

        let csv = storage.get_file("out/matched_domains.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "derived_domain,name\nacme.com,Acme\nacme.com,Acme Labs\n"
        );
        assert!(storage.get_file("out/matched_domains.zip").await.is_some());
    }
}
