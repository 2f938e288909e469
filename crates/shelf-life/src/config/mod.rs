use crate::loaders::{LoaderAlias, SourceSpec};
use chrono::NaiveDate;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_START_DATE: &str = "2024-12-01";
pub const DEFAULT_END_DATE: &str = "2025-02-15";
pub const DEFAULT_CATEGORY_SOURCE: &str = "CSVFile:./productTypes.csv";
pub const DEFAULT_ITEM_SOURCE: &str = "CSVFile:./products.csv";

/// How the binary renders a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "console" | "text" => Ok(Self::Console),
            "json" | "jsonl" => Ok(Self::Json),
            other => Err(ConfigError::InvalidOutput {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Console => f.write_str("console"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Top-level configuration for a run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub sources: SourceConfig,
    pub output: OutputFormat,
    pub telemetry: TelemetryConfig,
    pub loader_aliases: Vec<LoaderAlias>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let start = date_var("SHELF_START_DATE", DEFAULT_START_DATE)?;
        let end = date_var("SHELF_END_DATE", DEFAULT_END_DATE)?;
        let categories = source_var("SHELF_CATEGORY_SOURCE", DEFAULT_CATEGORY_SOURCE)?;
        let items = source_var("SHELF_ITEM_SOURCE", DEFAULT_ITEM_SOURCE)?;

        let output = match env::var("SHELF_OUTPUT") {
            Ok(value) => value.parse()?,
            Err(_) => OutputFormat::default(),
        };

        let log_level = env::var("SHELF_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
        let loader_aliases = parse_aliases(&env::var("SHELF_LOADER_ALIASES").unwrap_or_default())?;

        Ok(Self {
            simulation: SimulationConfig { start, end },
            sources: SourceConfig { categories, items },
            output,
            telemetry: TelemetryConfig { log_level },
            loader_aliases,
        })
    }
}

/// First and last simulated day, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Where categories and items are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub categories: SourceSpec,
    pub items: SourceSpec,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Accepts `YYYY-MM-DD` and `YYYYMMDD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

/// Comma separated `alias=key` pairs; blank entries are ignored.
pub fn parse_aliases(raw: &str) -> Result<Vec<LoaderAlias>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            LoaderAlias::parse(pair).ok_or_else(|| ConfigError::InvalidAlias {
                value: pair.to_string(),
            })
        })
        .collect()
}

fn date_var(variable: &'static str, default: &str) -> Result<NaiveDate, ConfigError> {
    let value = env::var(variable).unwrap_or_else(|_| default.to_string());
    parse_date(&value).ok_or(ConfigError::InvalidDate { variable, value })
}

fn source_var(variable: &'static str, default: &str) -> Result<SourceSpec, ConfigError> {
    let value = env::var(variable).unwrap_or_else(|_| default.to_string());
    SourceSpec::parse(&value).ok_or(ConfigError::InvalidSource { variable, value })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDate {
        variable: &'static str,
        value: String,
    },
    InvalidSource {
        variable: &'static str,
        value: String,
    },
    InvalidOutput {
        value: String,
    },
    InvalidAlias {
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDate { variable, value } => write!(
                f,
                "{variable} must be a date as YYYY-MM-DD or YYYYMMDD, got '{value}'"
            ),
            ConfigError::InvalidSource { variable, value } => {
                write!(f, "{variable} must look like 'key:payload', got '{value}'")
            }
            ConfigError::InvalidOutput { value } => {
                write!(f, "output must be 'console' or 'json', got '{value}'")
            }
            ConfigError::InvalidAlias { value } => {
                write!(f, "SHELF_LOADER_ALIASES entries must look like 'alias=key', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
