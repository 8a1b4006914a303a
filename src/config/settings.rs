use crate::utils::error::{ReconcileError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional TOML settings file.
pub const SETTINGS_ENV_VAR: &str = "ARTIKELSTAMM_DEDUCTIBLE_CONFIG";

pub const ARTIKELSTAMM_V5_NAMESPACE: &str = "http://elexis.ch/Elexis_Artikelstamm_v5";

/// What to do with a workbook row or catalog item that lacks a required value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub archive: ArchiveSettings,
    pub scanner: ScannerSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    /// Fail instead of continuing with an empty GTIN list when the entry is missing.
    pub require_entry: bool,
    /// Also store the matched entry in this directory, under its own file name.
    pub keep_extracted_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub header_rows: usize,
    pub on_malformed_row: MalformedPolicy,
    /// Empty means every flag value qualifies.
    pub qualifying_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub namespace: String,
    pub on_malformed_item: MalformedPolicy,
    pub rewrite_unchanged: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            namespace: ARTIKELSTAMM_V5_NAMESPACE.to_string(),
            on_malformed_item: MalformedPolicy::Abort,
            rewrite_unchanged: false,
        }
    }
}

impl ScannerSettings {
    pub fn flag_qualifies(&self, flag: &str) -> bool {
        self.qualifying_flags.is_empty()
            || self
                .qualifying_flags
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(flag))
    }
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let settings: Settings = toml::from_str(&processed_content)?;
        Ok(settings)
    }

    /// 依環境變數載入設定檔；未設定時使用預設值
    pub fn load() -> Result<Self> {
        match std::env::var(SETTINGS_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::debug!("Loading settings from {}", path);
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${EXTRACT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReconcileError::InvalidConfigValueError {
            field: "settings".to_string(),
            value: content.to_string(),
            reason: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.archive.keep_extracted_dir {
            validate_path("archive.keep_extracted_dir", dir)?;
        }
        validate_non_empty_string("catalog.namespace", &self.catalog.namespace)?;
        for flag in &self.scanner.qualifying_flags {
            validate_non_empty_string("scanner.qualifying_flags", flag)?;
        }
        Ok(())
    }
}
