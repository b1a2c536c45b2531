use crate::utils::error::{MatcherError, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_KEY_COLUMN: &str = "derived_domain";

/// Read-only handle to the on-disk reference company table.
///
/// The file is a UTF-8 CSV with a header row. Only the key column is
/// interpreted; every other column is carried through untouched. Each
/// scan opens its own reader, so one handle can serve many concurrent
/// queries.
#[derive(Debug)]
pub struct ReferenceDataset {
    path: PathBuf,
    headers: StringRecord,
    key_index: usize,
    size_bytes: u64,
}

impl ReferenceDataset {
    pub fn open(path: impl AsRef<Path>, key_column: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let size_bytes = std::fs::metadata(&path)
            .map_err(|e| MatcherError::provision(format!("cannot stat {}: {}", path.display(), e)))?
            .len();

        let mut reader = Self::reader_for(&path)
            .map_err(|e| MatcherError::provision(format!("cannot open {}: {}", path.display(), e)))?;
        let headers = reader
            .headers()
            .map_err(|e| MatcherError::provision(format!("unreadable dataset header: {}", e)))?
            .clone();

        let key_index = headers
            .iter()
            .position(|h| h == key_column)
            .ok_or_else(|| {
                MatcherError::provision(format!("dataset has no '{}' column", key_column))
            })?;

        tracing::debug!(
            "Opened dataset {} ({} bytes, {} columns, key '{}')",
            path.display(),
            size_bytes,
            headers.len(),
            key_column
        );

        Ok(Self {
            path,
            headers,
            key_index,
            size_bytes,
        })
    }

    fn reader_for(path: &Path) -> std::io::Result<csv::Reader<BufReader<File>>> {
        let file = File::open(path)?;
        Ok(csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::with_capacity(1 << 20, file)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn key_index(&self) -> usize {
        self.key_index
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Visits every row in storage order. Blocking; callers in async
    /// context should run it on a blocking thread. Returns rows scanned.
    pub fn scan(&self, mut visit: impl FnMut(&StringRecord)) -> Result<u64> {
        let mut reader = Self::reader_for(&self.path)
            .map_err(|e| MatcherError::query(format!("cannot reopen dataset: {}", e)))?;

        let headers = reader
            .headers()
            .map_err(|e| MatcherError::query(format!("unreadable dataset header: {}", e)))?;
        if headers != &self.headers {
            return Err(MatcherError::query("dataset header changed since it was opened"));
        }

        let mut record = StringRecord::new();
        let mut scanned = 0u64;
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {
                    scanned += 1;
                    visit(&record);
                }
                Ok(false) => break,
                Err(e) => {
                    return Err(MatcherError::query(format!(
                        "scan failed after {} rows: {}",
                        scanned, e
                    )))
                }
            }
        }

        Ok(scanned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_finds_key_column() {
        let file = dataset_file("name,derived_domain,employees\nAcme,acme.com,10\n");
        let dataset = ReferenceDataset::open(file.path(), DEFAULT_KEY_COLUMN).unwrap();
        assert_eq!(dataset.key_index(), 1);
        assert_eq!(dataset.headers().len(), 3);
        assert!(dataset.size_bytes() > 0);
    }

    #[test]
    fn test_open_without_key_column_fails() {
        let file = dataset_file("name,domain\nAcme,acme.com\n");
        let err = ReferenceDataset::open(file.path(), DEFAULT_KEY_COLUMN).unwrap_err();
        assert!(matches!(err, MatcherError::ProvisionError { .. }));
    }

    #[test]
    fn test_open_rejects_non_csv_database_file() {
        let mut file = NamedTempFile::new().unwrap();
        let mut blob = vec![0u8; 8];
        blob.extend_from_slice(b"DUCK");
        blob.extend_from_slice(&[0xff, 0xfe, 0x00, 0x80, b',', 0xc3, b'\n']);
        file.write_all(&blob).unwrap();
        file.flush().unwrap();

        let err = ReferenceDataset::open(file.path(), DEFAULT_KEY_COLUMN).unwrap_err();
        assert!(matches!(err, MatcherError::ProvisionError { .. }));
    }

    #[test]
    fn test_scan_visits_rows_in_order() {
        let file = dataset_file("derived_domain,name\nb.com,B\na.com,A\n");
        let dataset = ReferenceDataset::open(file.path(), DEFAULT_KEY_COLUMN).unwrap();

        let mut seen = Vec::new();
        let scanned = dataset
            .scan(|row| seen.push(row.get(0).unwrap().to_string()))
            .unwrap();

        assert_eq!(scanned, 2);
        assert_eq!(seen, vec!["b.com", "a.com"]);
    }

    #[test]
    fn test_scan_of_removed_file_is_query_error() {
        let file = dataset_file("derived_domain,name\na.com,A\n");
        let dataset = ReferenceDataset::open(file.path(), DEFAULT_KEY_COLUMN).unwrap();
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let err = dataset.scan(|_| {}).unwrap_err();
        assert!(matches!(err, MatcherError::QueryError { .. }));
    }

    #[test]
    fn test_scan_of_ragged_row_is_query_error() {
        let file = dataset_file("derived_domain,name\na.com,A\nb.com\n");
        let dataset = ReferenceDataset::open(file.path(), DEFAULT_KEY_COLUMN).unwrap();
        let err = dataset.scan(|_| {}).unwrap_err();
        assert!(matches!(err, MatcherError::QueryError { .. }));
    }
}
