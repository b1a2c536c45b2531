use crate::core::dataset::{ReferenceDataset, DEFAULT_KEY_COLUMN};
use crate::domain::ports::{ConfigProvider, DatasetSource};
use crate::utils::error::{MatcherError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;

/// 參考資料集為數 GB 等級，小於 1 MiB 的檔案一定是下載失敗或不完整
pub const DEFAULT_MIN_DATASET_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub path: PathBuf,
    pub min_valid_bytes: u64,
    pub fetch_timeout: Duration,
    pub key_column: String,
}

impl ProvisionSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_valid_bytes: DEFAULT_MIN_DATASET_BYTES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            key_column: DEFAULT_KEY_COLUMN.to_string(),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            path: PathBuf::from(config.dataset_path()),
            min_valid_bytes: config.min_dataset_bytes(),
            fetch_timeout: config.fetch_timeout(),
            key_column: config.key_column().to_string(),
        }
    }

    pub fn with_min_valid_bytes(mut self, bytes: u64) -> Self {
        self.min_valid_bytes = bytes;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionStatus {
    NotStarted,
    InProgress,
    Ready,
    Failed(String),
}

enum ProvisionState {
    NotStarted,
    Ready(Arc<ReferenceDataset>),
    Failed(String),
}

/// Ensures the reference dataset is on local disk and hands out one shared
/// read-only handle.
///
/// "check → fetch → validate → open" runs under a single async mutex, so
/// concurrent first callers trigger at most one download and every caller
/// sees the same handle, or the same failure reason. A failure stays
/// cached until [`DatasetProvisioner::reset`].
///
/// `status` is tracked separately and only changes on real transitions,
/// so holding the state lock for a cache hit never reads as `InProgress`.
pub struct DatasetProvisioner<S: DatasetSource> {
    source: S,
    settings: ProvisionSettings,
    state: Mutex<ProvisionState>,
    status: std::sync::Mutex<ProvisionStatus>,
}

impl<S: DatasetSource> DatasetProvisioner<S> {
    pub fn new(source: S, settings: ProvisionSettings) -> Self {
        Self {
            source,
            settings,
            state: Mutex::new(ProvisionState::NotStarted),
            status: std::sync::Mutex::new(ProvisionStatus::NotStarted),
        }
    }

    pub fn status(&self) -> ProvisionStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_status(&self, status: ProvisionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Clears a cached failure so the next `ensure` tries again.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        if matches!(&*state, ProvisionState::Failed(_)) {
            *state = ProvisionState::NotStarted;
            self.set_status(ProvisionStatus::NotStarted);
        }
    }

    pub async fn ensure(&self) -> Result<Arc<ReferenceDataset>> {
        let mut state = self.state.lock().await;

        match &*state {
            ProvisionState::Ready(handle) => return Ok(Arc::clone(handle)),
            ProvisionState::Failed(reason) => return Err(MatcherError::provision(reason.clone())),
            ProvisionState::NotStarted => {}
        }

        self.set_status(ProvisionStatus::InProgress);
        match self.provision().await {
            Ok(dataset) => {
                let handle = Arc::new(dataset);
                *state = ProvisionState::Ready(Arc::clone(&handle));
                self.set_status(ProvisionStatus::Ready);
                Ok(handle)
            }
            Err(e) => {
                let reason = match e {
                    MatcherError::ProvisionError { reason } => reason,
                    other => other.to_string(),
                };
                tracing::error!("❌ Dataset provisioning failed: {}", reason);
                *state = ProvisionState::Failed(reason.clone());
                self.set_status(ProvisionStatus::Failed(reason.clone()));
                Err(MatcherError::provision(reason))
            }
        }
    }

    async fn provision(&self) -> Result<ReferenceDataset> {
        let path = &self.settings.path;

        if self.has_valid_file(path).await {
            tracing::info!("📦 Using cached dataset at {}", path.display());
        } else {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                tracing::warn!(
                    "⚠️ Dataset at {} is below {} bytes, discarding it",
                    path.display(),
                    self.settings.min_valid_bytes
                );
                tokio::fs::remove_file(path).await?;
            }
            self.download(path).await?;
        }

        let open_path = path.clone();
        let key_column = self.settings.key_column.clone();
        tokio::task::spawn_blocking(move || ReferenceDataset::open(open_path, &key_column))
            .await
            .map_err(|e| MatcherError::provision(format!("dataset open task failed: {}", e)))?
    }

    async fn has_valid_file(&self, path: &Path) -> bool {
        match tokio::fs::metadata(path).await {
            Ok(meta) => meta.is_file() && meta.len() >= self.settings.min_valid_bytes,
            Err(_) => false,
        }
    }

    async fn download(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // 先寫到 .part，驗證通過後才搬到正式路徑
        let part_path = part_path_for(path);
        let _ = tokio::fs::remove_file(&part_path).await;

        tracing::info!(
            "⬇️ Downloading dataset from {} (first run only)",
            self.source.describe()
        );

        let fetched =
            tokio::time::timeout(self.settings.fetch_timeout, self.source.fetch_to(&part_path))
                .await;

        let written = match fetched {
            Err(_) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(MatcherError::provision("timeout"));
            }
            Ok(Err(e)) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(MatcherError::provision(format!("download failed: {}", e)));
            }
            Ok(Ok(written)) => written,
        };

        let size = tokio::fs::metadata(&part_path).await.map(|m| m.len()).unwrap_or(0);
        if size < self.settings.min_valid_bytes {
            tracing::error!(
                "Downloaded dataset is {} bytes, expected at least {}",
                size,
                self.settings.min_valid_bytes
            );
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(MatcherError::provision("invalid dataset file"));
        }

        tokio::fs::rename(&part_path, path).await?;
        tracing::info!("✅ Dataset downloaded ({} bytes) to {}", written, path.display());
        Ok(())
    }
}

fn part_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
