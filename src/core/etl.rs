use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;

pub struct ReconcileEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReconcileEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting deductible reconciliation");

        // Extract
        tracing::info!("📦 Extracting workbook from archive...");
        let entry = self.pipeline.extract()?;
        let entry_found = entry.is_some();

        // Transform
        tracing::info!("📊 Scanning worksheet...");
        let mapping = self.pipeline.transform(entry)?;
        let qualifying_gtins = mapping.len();
        tracing::info!("Found {} qualifying GTINs", qualifying_gtins);

        // Load
        tracing::info!("📝 Patching catalog...");
        let report = self.pipeline.load(mapping)?;

        Ok(RunSummary {
            entry_found,
            qualifying_gtins,
            report,
        })
    }
}
