use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::XlsxError),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Atomic write failed: {0}")]
    PersistError(#[from] tempfile::PersistError),

    #[error("Settings error: {0}")]
    SettingsError(#[from] toml::de::Error),

    #[error("Usage error: {message}")]
    UsageError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed catalog: {message}")]
    MalformedCatalog { message: String },

    #[error("Catalog has no ITEMS element in namespace {namespace}")]
    MissingItems { namespace: String },

    #[error("Archive has no entry named '{name}'")]
    EntryNotFound { name: String },

    #[error("Worksheet {index} does not exist (workbook has {available} sheets)")]
    WorksheetNotFound { index: usize, available: usize },

    #[error("Row {row} has no value in column {column}")]
    MissingCell { row: usize, column: usize },

    #[error("ITEM #{item} has no {field} element")]
    MissingField { item: usize, field: &'static str },
}

/// Failure classes reported to the operator, one exit code each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Io,
    Parse,
    Data,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Usage => 2,
            ErrorCategory::Io => 3,
            ErrorCategory::Parse => 4,
            ErrorCategory::Data => 5,
        }
    }
}

impl ReconcileError {
    pub fn usage(message: impl Into<String>) -> Self {
        ReconcileError::UsageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconcileError::UsageError { .. }
            | ReconcileError::InvalidConfigValueError { .. }
            | ReconcileError::SettingsError(_) => ErrorCategory::Usage,
            ReconcileError::IoError(_) | ReconcileError::PersistError(_) => ErrorCategory::Io,
            ReconcileError::ZipError(zip::result::ZipError::Io(_)) => ErrorCategory::Io,
            ReconcileError::ZipError(_)
            | ReconcileError::WorkbookError(_)
            | ReconcileError::XmlError(_)
            | ReconcileError::MalformedCatalog { .. }
            | ReconcileError::MissingItems { .. } => ErrorCategory::Parse,
            ReconcileError::EntryNotFound { .. }
            | ReconcileError::WorksheetNotFound { .. }
            | ReconcileError::MissingCell { .. }
            | ReconcileError::MissingField { .. } => ErrorCategory::Data,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Usage => format!("Invalid invocation: {}", self),
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Parse => format!("Input could not be parsed: {}", self),
            ErrorCategory::Data => format!("Input data is incomplete: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReconcileError::UsageError { .. } => {
                "Usage: -as <catalog.xml> -zip <archive.zip> -pl <entry> -w <sheet> -gcn <gtin column> -pcn <flag column> -p <percentage> [-v]"
            }
            ReconcileError::SettingsError(_) => {
                "Check the TOML file named by ARTIKELSTAMM_DEDUCTIBLE_CONFIG"
            }
            ReconcileError::InvalidConfigValueError { .. } => {
                "Correct the flagged parameter and run again"
            }
            ReconcileError::IoError(_)
            | ReconcileError::PersistError(_)
            | ReconcileError::ZipError(zip::result::ZipError::Io(_)) => {
                "Make sure the archive is readable and the catalog's directory is writable"
            }
            ReconcileError::ZipError(_) => "Verify that the archive is a complete ZIP file",
            ReconcileError::WorkbookError(_) => "Verify that the archive entry is an .xlsx workbook",
            ReconcileError::XmlError(_)
            | ReconcileError::MalformedCatalog { .. }
            | ReconcileError::MissingItems { .. } => {
                "Verify that the catalog is a well-formed Artikelstamm v5 document"
            }
            ReconcileError::EntryNotFound { .. } => {
                "List the archive contents and pass the exact entry name with -pl"
            }
            ReconcileError::WorksheetNotFound { .. } => {
                "Worksheet indices start at 0; check the -w parameter"
            }
            ReconcileError::MissingCell { .. } => {
                "Check the -gcn/-pcn columns, or set scanner.on_malformed_row = \"skip\""
            }
            ReconcileError::MissingField { .. } => {
                "Repair the catalog item, or set catalog.on_malformed_item = \"skip\""
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
