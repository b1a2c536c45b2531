pub mod access;
pub mod dataset;
pub mod match_engine;
pub mod normalizer;
pub mod pipeline;
pub mod provisioner;
pub mod reporter;
pub mod runner;

pub use crate::domain::model::{InputDomainSet, MatchResult, NormalizedDomain, Summary};
pub use crate::domain::ports::{
    ConfigProvider, DatasetSource, MatchOutcome, Pipeline, RunReport, Storage,
};
pub use crate::utils::error::Result;
