use crate::domain::model::{InputDomainSet, MatchResult, Summary};
use crate::utils::error::{MatcherError, Result};
use chrono::Utc;
use csv::StringRecord;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const RESULT_CSV_NAME: &str = "matched_domains.csv";
pub const RESULT_ZIP_NAME: &str = "matched_domains.zip";
pub const SUMMARY_JSON_NAME: &str = "summary.json";
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

pub fn summarize(inputs: &InputDomainSet, result: &MatchResult) -> Summary {
    Summary {
        input_count: inputs.len(),
        matched_count: result.distinct_domains().len(),
        row_count: result.len(),
        generated_at: Utc::now(),
    }
}

/// Serializes the result as UTF-8 CSV: reference headers verbatim, then
/// one line per row, quoting fields as needed.
pub fn serialize(result: &MatchResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(result.headers())?;
    for row in result.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|e| MatcherError::IoError(e.into_error()))
}

pub fn preview(result: &MatchResult, limit: usize) -> &[StringRecord] {
    let rows = result.rows();
    &rows[..rows.len().min(limit)]
}

/// 把比對結果 CSV 與摘要 JSON 打包成單一 ZIP
pub fn bundle_zip(result: &MatchResult, summary: &Summary) -> Result<Vec<u8>> {
    let csv_bytes = serialize(result)?;
    let summary_json = serde_json::to_string_pretty(summary)?;

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(RESULT_CSV_NAME, FileOptions::default())?;
    zip.write_all(&csv_bytes)?;

    zip.start_file::<_, ()>(SUMMARY_JSON_NAME, FileOptions::default())?;
    zip.write_all(summary_json.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Renders preview rows as tab-separated lines for the terminal.
pub fn render_preview(result: &MatchResult, limit: usize) -> String {
    let mut lines = Vec::with_capacity(limit.min(result.len()) + 1);
    lines.push(result.headers().iter().collect::<Vec<_>>().join("\t"));
    for row in preview(result, limit) {
        lines.push(row.iter().collect::<Vec<_>>().join("\t"));
    }
    lines.join("\n")
}
