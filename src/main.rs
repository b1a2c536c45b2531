use bd_domain_matcher::core::ConfigProvider;
use bd_domain_matcher::utils::{logger, validation::Validate};
use bd_domain_matcher::{
    CliConfig, DatasetProvisioner, DomainMatchPipeline, HttpDatasetSource, LocalStorage,
    MatchRunner, MatcherError, ProvisionSettings,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting bd-domain-matcher");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    let input = match config.validate().and_then(|_| config.input_source()) {
        Ok(input) => input,
        Err(e) => fail(&e),
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = HttpDatasetSource::new(config.dataset_url());
    let provisioner = Arc::new(DatasetProvisioner::new(
        source,
        ProvisionSettings::from_config(&config),
    ));

    // 上傳檔與輸出路徑都以目前工作目錄為基準
    let storage = LocalStorage::new(".");
    let email = config.email.clone();
    let monitor_enabled = config.monitor;
    let pipeline = DomainMatchPipeline::new(storage, config, provisioner, email, input);
    let runner = MatchRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(report) => {
            println!("{}", report.preview);
            println!();
            println!("✅ Submitted domains: {}", report.summary.input_count);
            println!("✅ Matched domains: {}", report.summary.matched_count);
            println!("✅ Matched rows: {}", report.summary.row_count);
            println!("📁 Full matched CSV: {}", report.csv_path);
            if let Some(zip_path) = report.zip_path {
                println!("📦 ZIP bundle: {}", zip_path);
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn fail(e: &MatcherError) -> ! {
    tracing::error!(
        "❌ Domain match failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code().max(1));
}
