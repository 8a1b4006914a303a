use crate::domain::model::ArchiveEntry;
use crate::domain::ports::Storage;
use crate::utils::error::{ReconcileError, Result};
use std::io::{self, Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

fn names_match(entry_name: &str, target: &str) -> bool {
    entry_name == target || entry_name.to_lowercase() == target.to_lowercase()
}

fn file_name_of(entry_name: &str) -> &str {
    entry_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(entry_name)
}

/// Walks every entry of the archive and keeps the one named `target`
/// (case-insensitive) in memory. Other entries are read to the end, which
/// also verifies their checksums, and dropped.
///
/// A full-name match wins over a match on the final path component, and a
/// later match wins over an earlier one of the same kind.
pub fn extract_entry(archive: &[u8], target: &str) -> Result<Option<ArchiveEntry>> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let target_is_bare = !target.contains(['/', '\\']);

    let mut full_match: Option<ArchiveEntry> = None;
    let mut bare_match: Option<ArchiveEntry> = None;

    for index in 0..zip.len() {
        let mut file = zip.by_index(index)?;
        let name = file.name().to_string();
        tracing::debug!("{} ({} bytes) detected.", name, file.size());

        if file.is_dir() {
            continue;
        }

        let is_full = names_match(&name, target);
        let is_bare = !is_full && target_is_bare && names_match(file_name_of(&name), target);

        if is_full || is_bare {
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
            file.read_to_end(&mut data)?;
            let entry = ArchiveEntry { name, data };
            if is_full {
                full_match = Some(entry);
            } else {
                bare_match = Some(entry);
            }
        } else {
            io::copy(&mut file, &mut io::sink())?;
        }
    }

    Ok(full_match.or(bare_match))
}

/// Writes the entry into `dir` under its own file name. Directory parts of
/// the entry name are dropped so the file can never land outside `dir`.
pub fn persist_entry<S: Storage>(storage: &S, dir: &str, entry: &ArchiveEntry) -> Result<String> {
    let file_name = Path::new(file_name_of(&entry.name))
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ReconcileError::InvalidConfigValueError {
            field: "archive entry".to_string(),
            value: entry.name.clone(),
            reason: "Entry name has no usable file name".to_string(),
        })?;

    let target = Path::new(dir).join(file_name);
    let target = target.to_string_lossy().into_owned();
    storage.write_file(&target, &entry.data)?;
    tracing::info!("Stored {} ({} bytes) as {}", entry.name, entry.data.len(), target);
    Ok(target)
}
