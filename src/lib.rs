pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, InputSource};

pub use adapters::http::HttpDatasetSource;
pub use crate::core::{
    access::AccessGate,
    dataset::ReferenceDataset,
    match_engine::match_domains,
    normalizer::normalize,
    pipeline::DomainMatchPipeline,
    provisioner::{DatasetProvisioner, ProvisionSettings, ProvisionStatus},
    reporter::{serialize, summarize},
    runner::MatchRunner,
};
pub use utils::error::{MatcherError, Result};
