use anyhow::Context;
use bd_domain_matcher::config::toml_config::TomlConfig;
use bd_domain_matcher::core::ConfigProvider;
use bd_domain_matcher::utils::{logger, validation::Validate};
use bd_domain_matcher::{
    DatasetProvisioner, DomainMatchPipeline, HttpDatasetSource, InputSource, LocalStorage,
    MatchRunner, ProvisionSettings,
};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "toml-matcher")]
#[command(about = "Domain matcher driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "matcher-config.toml")]
    config: String,

    /// Work email used for the access check
    #[arg(long)]
    email: Option<String>,

    /// CSV file with one domain per row, no header
    #[arg(long)]
    input: Option<String>,

    /// Match a single domain
    #[arg(long, conflicts_with = "input")]
    domain: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show the resolved configuration without downloading or matching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置（日誌格式由配置決定，所以先載入）
    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based domain matcher");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No download or matching will occur");
        return Ok(());
    }

    let input = InputSource::from_options(args.input.as_deref(), args.domain.as_deref())
        .context("an --input CSV or a --domain is required")?;

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let provisioner = Arc::new(DatasetProvisioner::new(
        HttpDatasetSource::new(config.dataset_url()),
        ProvisionSettings::from_config(&config),
    ));
    let storage = LocalStorage::new(".");
    let pipeline = DomainMatchPipeline::new(storage, config, provisioner, args.email, input);
    let runner = MatchRunner::new_with_monitoring(pipeline, monitor_enabled);

    match runner.run().await {
        Ok(report) => {
            println!("{}", report.preview);
            println!();
            println!(
                "✅ Matched {} of {} submitted domains ({} rows)",
                report.summary.matched_count, report.summary.input_count, report.summary.row_count
            );
            println!("📁 Output saved to: {}", report.csv_path);
            if let Some(zip_path) = report.zip_path {
                println!("📦 ZIP bundle: {}", zip_path);
            }
        }
        Err(e) => {
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
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Allowed email domain: {}", config.allowed_email_domain());
    println!("  Dataset source: {}", config.dataset_url());
    println!("  Dataset path: {}", config.dataset_path());
    println!("  Key column: {}", config.key_column());
    println!("  Minimum dataset size: {} bytes", config.min_dataset_bytes());
    println!("  Fetch timeout: {:?}", config.fetch_timeout());
    println!("  Output: {}", config.output_path());
    println!("  ZIP bundle: {}", config.zip_output());
    println!();
}
