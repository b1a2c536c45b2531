use crate::core::dataset::ReferenceDataset;
use crate::core::normalizer::normalize;
use crate::domain::model::{InputDomainSet, MatchResult};
use crate::utils::error::{MatcherError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Counts how many input rows normalize to each key. Empty keys are
/// dropped so blank or garbage rows never match anything.
fn input_multiplicity(inputs: &InputDomainSet) -> HashMap<String, usize> {
    let mut keys: HashMap<String, usize> = HashMap::new();
    for raw in inputs.raw() {
        let key = normalize(raw);
        if key.is_empty() {
            continue;
        }
        *keys.entry(key.into_inner()).or_insert(0) += 1;
    }
    keys
}

/// Equi-join of the normalized inputs against the dataset key column.
///
/// Relational semantics with no implicit dedup: every (input row,
/// reference row) pair with equal keys yields one output row, so an input
/// submitted twice doubles its matches. Output rows are the reference rows
/// only, in storage scan order.
pub fn match_blocking(dataset: &ReferenceDataset, inputs: &InputDomainSet) -> Result<MatchResult> {
    let keys = input_multiplicity(inputs);
    let key_index = dataset.key_index();
    let mut rows = Vec::new();

    if keys.is_empty() {
        tracing::debug!("No usable input keys, skipping dataset scan");
        return Ok(MatchResult::new(dataset.headers().clone(), key_index, rows));
    }

    let scanned = dataset.scan(|record| {
        if let Some(times) = record.get(key_index).and_then(|domain| keys.get(domain)) {
            for _ in 0..*times {
                rows.push(record.clone());
            }
        }
    })?;

    tracing::debug!(
        "Scanned {} reference rows for {} distinct keys, {} matched rows",
        scanned,
        keys.len(),
        rows.len()
    );

    Ok(MatchResult::new(dataset.headers().clone(), key_index, rows))
}

/// Runs the join on a blocking thread; the handle stays shared and
/// read-only so many requests can query it at once.
pub async fn match_domains(
    dataset: Arc<ReferenceDataset>,
    inputs: &InputDomainSet,
) -> Result<MatchResult> {
    let inputs = inputs.clone();
    tokio::task::spawn_blocking(move || match_blocking(&dataset, &inputs))
        .await
        .map_err(|e| MatcherError::query(format!("match task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENARIO: &str =
        "derived_domain,name\nacme.com,Acme\nacme.com,Acme Labs\nfoo.com,Foo\n";

    fn open_dataset(content: &str) -> (NamedTempFile, ReferenceDataset) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        let dataset = ReferenceDataset::open(file.path(), "derived_domain").unwrap();
        (file, dataset)
    }

    fn names(result: &MatchResult) -> Vec<String> {
        result
            .rows()
            .iter()
            .map(|r| r.get(1).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_scenario_acme() {
        let (_file, dataset) = open_dataset(SCENARIO);
        let inputs = InputDomainSet::new(vec!["www.ACME.com".into(), "bar.com".into()]);

        let result = match_blocking(&dataset, &inputs).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(names(&result), vec!["Acme", "Acme Labs"]);
        assert_eq!(result.distinct_domains().len(), 1);
    }

    #[test]
    fn test_empty_match_is_success() {
        let (_file, dataset) = open_dataset(SCENARIO);
        let inputs = InputDomainSet::single("nothing.example");

        let result = match_blocking(&dataset, &inputs).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.headers(), dataset.headers());
    }

    #[test]
    fn test_duplicate_inputs_follow_join_multiplicity() {
        let (_file, dataset) = open_dataset(SCENARIO);
        let inputs = InputDomainSet::new(vec!["foo.com".into(), "FOO.com".into()]);

        let result = match_blocking(&dataset, &inputs).unwrap();
        assert_eq!(names(&result), vec!["Foo", "Foo"]);
        assert_eq!(result.distinct_domains().len(), 1);
    }

    #[test]
    fn test_blank_inputs_do_not_match_blank_keys() {
        let (_file, dataset) = open_dataset("derived_domain,name\n,Nameless\nfoo.com,Foo\n");
        let inputs = InputDomainSet::new(vec!["".into(), "   ".into(), "www.".into()]);

        let result = match_blocking(&dataset, &inputs).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_reference_column_is_not_renormalized() {
        let (_file, dataset) = open_dataset("derived_domain,name\nwww.acme.com,Acme\n");
        let inputs = InputDomainSet::single("www.acme.com");

        let result = match_blocking(&dataset, &inputs).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_all_reference_columns_are_kept() {
        let (_file, dataset) =
            open_dataset("id,derived_domain,name,hq\n7,acme.com,Acme,\"Austin, TX\"\n");
        let inputs = InputDomainSet::single("acme.com");

        let result = match_blocking(&dataset, &inputs).unwrap();
        assert_eq!(result.len(), 1);
        let row: Vec<&str> = result.rows()[0].iter().collect();
        assert_eq!(row, vec!["7", "acme.com", "Acme", "Austin, TX"]);
    }

    #[tokio::test]
    async fn test_match_domains_async() {
        let (_file, dataset) = open_dataset(SCENARIO);
        let inputs = InputDomainSet::single("acme.com");

        let result = match_domains(Arc::new(dataset), &inputs).await.unwrap();
        assert_eq!(result.len(), 2);
    }
}
