pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::settings::Settings;
pub use core::{etl::ReconcileEngine, pipeline::DeductiblePipeline};
pub use domain::model::{GtinFlagMap, PatchReport, RunSummary};
pub use utils::error::{ReconcileError, Result};
