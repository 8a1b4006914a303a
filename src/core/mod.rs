pub mod archive;
pub mod catalog;
pub mod etl;
pub mod pipeline;
pub mod scanner;

pub use crate::domain::model::{ArchiveEntry, GtinFlagMap, PatchReport, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
