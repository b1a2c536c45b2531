use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 正規化後的網域，作為 join key 使用
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedDomain(String);

impl NormalizedDomain {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 使用者一次提交的原始網域列表（未正規化，保留重複與空白列）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDomainSet {
    raw: Vec<String>,
}

impl InputDomainSet {
    pub fn new(raw: Vec<String>) -> Self {
        Self { raw }
    }

    /// Single-domain mode: a one-row input set.
    pub fn single(raw: impl Into<String>) -> Self {
        Self {
            raw: vec![raw.into()],
        }
    }

    /// Parses an uploaded, header-less CSV where the first field of each
    /// record is a raw domain. Never fails: undecodable bytes are replaced
    /// and unparsable records become empty rows that match nothing.
    pub fn from_csv_bytes(bytes: &[u8]) -> Self {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut raw = Vec::new();
        for (line, record) in reader.byte_records().enumerate() {
            match record {
                Ok(record) => {
                    let value = record
                        .get(0)
                        .map(|field| String::from_utf8_lossy(field).into_owned())
                        .unwrap_or_default();
                    raw.push(value);
                }
                Err(e) => {
                    tracing::warn!("Unparsable input row {}: {}", line + 1, e);
                    raw.push(String::new());
                }
            }
        }

        if raw.is_empty() {
            tracing::warn!("⚠️ Uploaded domain list is empty");
        }

        Self { raw }
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// 參考資料集中符合輸入網域的列，欄位與順序與資料集完全一致
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    headers: StringRecord,
    key_index: usize,
    rows: Vec<StringRecord>,
}

impl MatchResult {
    pub fn new(headers: StringRecord, key_index: usize, rows: Vec<StringRecord>) -> Self {
        Self {
            headers,
            key_index,
            rows,
        }
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn key_column(&self) -> &str {
        self.headers.get(self.key_index).unwrap_or_default()
    }

    /// Distinct canonical domains present in the result.
    pub fn distinct_domains(&self) -> HashSet<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(self.key_index))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// 使用者提交的列數（含重複與空白）
    pub input_count: usize,
    /// 有配對到的不重複 canonical domain 數
    pub matched_count: usize,
    pub row_count: usize,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_set_from_csv_keeps_duplicates_and_first_column() {
        let input = InputDomainSet::from_csv_bytes(b"a.com\na.com,extra\n\"  b.com \"\n");
        assert_eq!(input.len(), 3);
        assert_eq!(input.raw(), &["a.com", "a.com", "  b.com "]);
    }

    #[test]
    fn test_input_set_from_empty_upload() {
        let input = InputDomainSet::from_csv_bytes(b"");
        assert!(input.is_empty());
    }

    #[test]
    fn test_input_set_lossy_decoding() {
        let input = InputDomainSet::from_csv_bytes(b"ex\xffample.com\n");
        assert_eq!(input.len(), 1);
        assert!(input.raw()[0].starts_with("ex"));
    }

    #[test]
    fn test_single_mode() {
        let input = InputDomainSet::single("www.acme.com");
        assert_eq!(input.len(), 1);
    }

    #[test]
    fn test_distinct_domains() {
        let headers = StringRecord::from(vec!["derived_domain", "name"]);
        let rows = vec![
            StringRecord::from(vec!["acme.com", "Acme"]),
            StringRecord::from(vec!["acme.com", "Acme Labs"]),
            StringRecord::from(vec!["foo.com", "Foo"]),
        ];
        let result = MatchResult::new(headers, 0, rows);
        assert_eq!(result.len(), 3);
        assert_eq!(result.distinct_domains().len(), 2);
        assert_eq!(result.key_column(), "derived_domain");
    }
}
