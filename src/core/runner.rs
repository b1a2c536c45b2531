use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct MatchRunner<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> MatchRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 任何階段失敗即中止，不會產生部分結果
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting domain match...");

        self.pipeline.authorize().await?;
        tracing::debug!("Access check passed");

        let inputs = self.pipeline.extract().await?;
        tracing::info!("Received {} domain rows", inputs.len());
        self.monitor.log_stats("Extract");

        let outcome = self.pipeline.transform(inputs).await?;
        self.monitor.log_stats("Match");

        let report = self.pipeline.load(outcome).await?;
        tracing::info!("Output saved to: {}", report.csv_path);
        self.monitor.log_final_stats();

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputDomainSet, MatchOutcome, MatchResult};
    use crate::utils::error::MatcherError;
    use async_trait::async_trait;
    use csv::StringRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RecordingPipeline {
        allow: bool,
        phases: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn authorize(&self) -> Result<()> {
            if self.allow {
                Ok(())
            } else {
                Err(MatcherError::AccessDenied {
                    reason: "nope".to_string(),
                })
            }
        }

        async fn extract(&self) -> Result<InputDomainSet> {
            self.phases.fetch_add(1, Ordering::SeqCst);
            Ok(InputDomainSet::single("acme.com"))
        }

        async fn transform(&self, inputs: InputDomainSet) -> Result<MatchOutcome> {
            self.phases.fetch_add(1, Ordering::SeqCst);
            let result = MatchResult::new(StringRecord::from(vec!["derived_domain"]), 0, vec![]);
            let summary = crate::core::reporter::summarize(&inputs, &result);
            Ok(MatchOutcome { result, summary })
        }

        async fn load(&self, outcome: MatchOutcome) -> Result<RunReport> {
            self.phases.fetch_add(1, Ordering::SeqCst);
            Ok(RunReport {
                csv_path: "out/matched_domains.csv".to_string(),
                zip_path: None,
                summary: outcome.summary,
                preview: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_executes_all_phases() {
        let phases = Arc::new(AtomicUsize::new(0));
        let runner = MatchRunner::new(RecordingPipeline {
            allow: true,
            phases: Arc::clone(&phases),
        });

        let report = runner.run().await.unwrap();
        assert_eq!(phases.load(Ordering::SeqCst), 3);
        assert_eq!(report.summary.input_count, 1);
        assert_eq!(report.summary.matched_count, 0);
    }

    #[tokio::test]
    async fn test_denied_access_halts_before_extract() {
        let phases = Arc::new(AtomicUsize::new(0));
        let runner = MatchRunner::new(RecordingPipeline {
            allow: false,
            phases: Arc::clone(&phases),
        });

        assert!(matches!(
            runner.run().await,
            Err(MatcherError::AccessDenied { .. })
        ));
        assert_eq!(phases.load(Ordering::SeqCst), 0);
    }
}
