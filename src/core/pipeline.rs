use crate::core::archive::{extract_entry, persist_entry};
use crate::core::catalog::patch_catalog;
use crate::core::scanner::{scan_workbook, SheetLayout};
use crate::core::{ArchiveEntry, ConfigProvider, GtinFlagMap, PatchReport, Pipeline, Storage};
use crate::utils::error::{ReconcileError, Result};

/// Archive -> workbook -> catalog, reading and writing through `Storage`.
pub struct DeductiblePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DeductiblePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn layout(&self) -> SheetLayout {
        SheetLayout {
            worksheet: self.config.worksheet(),
            gtin_column: self.config.gtin_column(),
            flag_column: self.config.flag_column(),
        }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for DeductiblePipeline<S, C> {
    fn extract(&self) -> Result<Option<ArchiveEntry>> {
        let settings = &self.config.settings().archive;

        tracing::debug!("Reading archive {}", self.config.archive_path());
        let archive = self.storage.read_file(self.config.archive_path())?;
        let entry = extract_entry(&archive, self.config.entry_name())?;

        match &entry {
            Some(entry) => {
                tracing::debug!("Using {} ({} bytes)", entry.name, entry.data.len());
                if let Some(dir) = &settings.keep_extracted_dir {
                    persist_entry(&self.storage, dir, entry)?;
                }
            }
            None if settings.require_entry => {
                return Err(ReconcileError::EntryNotFound {
                    name: self.config.entry_name().to_string(),
                });
            }
            None => {
                tracing::warn!(
                    "No entry named '{}' in {}; continuing without GTINs",
                    self.config.entry_name(),
                    self.config.archive_path()
                );
            }
        }

        Ok(entry)
    }

    fn transform(&self, entry: Option<ArchiveEntry>) -> Result<GtinFlagMap> {
        let mapping = match entry {
            Some(entry) => {
                scan_workbook(&entry.data, self.layout(), &self.config.settings().scanner)?
            }
            None => GtinFlagMap::new(),
        };

        tracing::debug!(
            "Identified substances with a deductible of {}%",
            self.config.percentage()
        );
        for (i, gtin) in mapping.sorted_gtins().iter().enumerate() {
            tracing::debug!("{}. {}", i + 1, gtin);
        }

        Ok(mapping)
    }

    fn load(&self, mapping: GtinFlagMap) -> Result<PatchReport> {
        let settings = &self.config.settings().catalog;
        let catalog_path = self.config.catalog_path();

        let source = self.storage.read_file(catalog_path)?;
        let patched = patch_catalog(&source, &mapping, self.config.percentage(), settings)?;
        let mut report = patched.report;

        if report.has_changes() || settings.rewrite_unchanged {
            self.storage.write_file(catalog_path, &patched.data)?;
            report.written = true;
        } else {
            tracing::info!("{} already up to date, not rewritten", catalog_path);
        }

        tracing::trace!("{}", String::from_utf8_lossy(&patched.data));
        Ok(report)
    }
}
