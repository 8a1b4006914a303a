use crate::config::settings::Settings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReconcileError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use clap::error::ErrorKind;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "artikelstamm-deductible")]
#[command(about = "Sets the deductible percentage of every catalog item listed in a zipped workbook")]
pub struct CliConfig {
    /// Artikelstamm XML catalog, rewritten in place (legacy: -as)
    #[arg(long = "catalog", value_name = "XML")]
    pub catalog_path: String,

    /// ZIP archive holding the workbook (legacy: -zip)
    #[arg(long = "archive", value_name = "ZIP")]
    pub archive_path: String,

    /// Name of the workbook entry inside the archive, case-insensitive (legacy: -pl)
    #[arg(long = "entry", value_name = "NAME")]
    pub entry_name: String,

    /// Zero-based worksheet index (legacy: -w)
    #[arg(long)]
    pub worksheet: usize,

    /// Zero-based column holding the GTIN (legacy: -gcn)
    #[arg(long)]
    pub gtin_column: usize,

    /// Zero-based column holding the deductible flag (legacy: -pcn)
    #[arg(long)]
    pub flag_column: usize,

    /// Deductible percentage written to matching items (legacy: -p)
    #[arg(long)]
    pub percentage: u32,

    #[arg(long, help = "Enable verbose output (legacy: -v)")]
    pub verbose: bool,

    #[arg(skip)]
    pub settings: Settings,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("catalog", &self.catalog_path)?;
        validate_path("archive", &self.archive_path)?;
        validate_non_empty_string("entry", &self.entry_name)?;
        validate_range("percentage", self.percentage, 0, 100)?;
        self.settings.validate()
    }
}

impl ConfigProvider for CliConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog_path
    }

    fn archive_path(&self) -> &str {
        &self.archive_path
    }

    fn entry_name(&self) -> &str {
        &self.entry_name
    }

    fn worksheet(&self) -> usize {
        self.worksheet
    }

    fn gtin_column(&self) -> usize {
        self.gtin_column
    }

    fn flag_column(&self) -> usize {
        self.flag_column
    }

    fn percentage(&self) -> u32 {
        self.percentage
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Single-dash flags of the legacy command line and the long options they stand for.
const LEGACY_FLAGS: [(&str, &str, bool); 8] = [
    ("-as", "--catalog", true),
    ("-zip", "--archive", true),
    ("-pl", "--entry", true),
    ("-w", "--worksheet", true),
    ("-gcn", "--gtin-column", true),
    ("-pcn", "--flag-column", true),
    ("-p", "--percentage", true),
    ("-v", "--verbose", false),
];

/// Seven flag/value pairs, plus the optional `-v`.
pub const LEGACY_ARG_RANGE: std::ops::RangeInclusive<usize> = 14..=15;

fn legacy_flag(token: &str) -> Option<(&'static str, bool)> {
    LEGACY_FLAGS
        .iter()
        .find(|(flag, _, _)| flag.eq_ignore_ascii_case(token))
        .map(|&(_, long, takes_value)| (long, takes_value))
}

pub fn is_legacy_invocation(args: &[String]) -> bool {
    args.iter().any(|arg| legacy_flag(arg).is_some())
}

pub fn check_argument_count(args: &[String]) -> Result<()> {
    if LEGACY_ARG_RANGE.contains(&args.len()) {
        Ok(())
    } else {
        Err(ReconcileError::usage(format!(
            "expected {} to {} arguments, got {}",
            LEGACY_ARG_RANGE.start(),
            LEGACY_ARG_RANGE.end(),
            args.len()
        )))
    }
}

/// Rewrites legacy flags to long options. Values are attached with `=` so
/// that a value starting with '-' is never mistaken for a flag.
pub fn normalize_legacy_args(args: &[String]) -> Vec<String> {
    let mut normalized = Vec::with_capacity(args.len());
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        match legacy_flag(token) {
            Some((long, true)) => match tokens.next() {
                Some(value) => normalized.push(format!("{}={}", long, value)),
                None => normalized.push(long.to_string()),
            },
            Some((long, false)) => normalized.push(long.to_string()),
            None => normalized.push(token.clone()),
        }
    }

    normalized
}

/// Parses the process arguments (program name first) in either the legacy
/// or the long-option form.
pub fn parse_args<I, T>(argv: I) -> Result<CliConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut argv = argv.into_iter().map(Into::into);
    let program = argv
        .next()
        .unwrap_or_else(|| "artikelstamm-deductible".to_string());
    let args: Vec<String> = argv.collect();

    let args = if is_legacy_invocation(&args) {
        check_argument_count(&args)?;
        normalize_legacy_args(&args)
    } else {
        args
    };

    match CliConfig::try_parse_from(std::iter::once(program).chain(args)) {
        Ok(config) => Ok(config),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Err(ReconcileError::usage(e.to_string())),
    }
}
