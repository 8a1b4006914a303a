use crate::config::settings::Settings;
use crate::domain::model::{ArchiveEntry, GtinFlagMap, PatchReport};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    /// Replaces the file at `path` with `data`; readers never observe a partial file.
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn catalog_path(&self) -> &str;
    fn archive_path(&self) -> &str;
    fn entry_name(&self) -> &str;
    fn worksheet(&self) -> usize;
    fn gtin_column(&self) -> usize;
    fn flag_column(&self) -> usize;
    fn percentage(&self) -> u32;
    fn settings(&self) -> &Settings;
}

/// The three stages run strictly one after the other; each hands its
/// result to the next by value.
pub trait Pipeline {
    fn extract(&self) -> Result<Option<ArchiveEntry>>;
    fn transform(&self, entry: Option<ArchiveEntry>) -> Result<GtinFlagMap>;
    fn load(&self, mapping: GtinFlagMap) -> Result<PatchReport>;
}
