use std::collections::HashMap;

/// One file pulled out of the input archive, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// GTIN -> flag cell, as read from the workbook. Only key membership decides
/// whether a catalog item is patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GtinFlagMap {
    entries: HashMap<String, String>,
}

impl GtinFlagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later rows overwrite earlier ones.
    pub fn insert(&mut self, gtin: impl Into<String>, flag: impl Into<String>) -> Option<String> {
        self.entries.insert(gtin.into(), flag.into())
    }

    pub fn contains(&self, gtin: &str) -> bool {
        self.entries.contains_key(gtin)
    }

    pub fn flag(&self, gtin: &str) -> Option<&str> {
        self.entries.get(gtin).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// GTINs in ascending order, for stable log output.
    pub fn sorted_gtins(&self) -> Vec<&str> {
        let mut gtins: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        gtins.sort_unstable();
        gtins
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GtinFlagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = GtinFlagMap::new();
        for (gtin, flag) in iter {
            map.insert(gtin, flag);
        }
        map
    }
}

/// A catalog item whose DEDUCTIBLE was set to the target percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    pub gtin: String,
    pub description: String,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub items_seen: usize,
    pub modified: Vec<ItemChange>,
    pub without_deductible: usize,
    pub not_listed: usize,
    /// Listed items whose DEDUCTIBLE already held the target value.
    pub already_set: usize,
    /// Patched items that had no DSCR element.
    pub without_description: usize,
    pub malformed_skipped: usize,
    pub written: bool,
}

impl PatchReport {
    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub entry_found: bool,
    pub qualifying_gtins: usize,
    pub report: PatchReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut map = GtinFlagMap::new();
        assert_eq!(map.insert("7680612345678", "yes"), None);
        assert_eq!(map.insert("7680612345678", "no"), Some("yes".to_string()));

        assert_eq!(map.len(), 1);
        assert_eq!(map.flag("7680612345678"), Some("no"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let map: GtinFlagMap = [("7680612345678", "yes")].into_iter().collect();

        assert!(map.contains("7680612345678"));
        assert!(!map.contains(" 7680612345678"));
        assert!(!map.contains("07680612345678"));
    }

    #[test]
    fn test_has_changes_follows_modified_items() {
        let mut report = PatchReport {
            already_set: 3,
            ..Default::default()
        };
        assert!(!report.has_changes());

        report.modified.push(ItemChange {
            gtin: "2".to_string(),
            description: String::new(),
            old_value: "10".to_string(),
            new_value: "100".to_string(),
        });
        assert!(report.has_changes());
    }
}
