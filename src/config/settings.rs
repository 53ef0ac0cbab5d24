//! User settings for the expense tracker
//!
//! Display preferences, validation limits and the default log filter. Every
//! field has a serde default so older or hand-edited config files still load.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::TrackerPaths;
use crate::error::{TrackerError, TrackerResult};
use crate::models::Money;

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when displaying amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format for tables and exports (strftime)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Long display format, e.g. "Friday, January 05, 2024"
    #[serde(default = "default_long_date_format")]
    pub long_date_format: String,

    /// Short display format, e.g. "01/05/24"
    #[serde(default = "default_short_date_format")]
    pub short_date_format: String,

    /// Largest amount a single transaction may carry
    #[serde(default = "default_max_amount")]
    pub max_amount: Money,

    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,

    #[serde(default = "default_max_category_name_length")]
    pub max_category_name_length: usize,

    /// Rows shown by `transaction list` when no limit is given
    #[serde(default = "default_list_limit")]
    pub default_list_limit: usize,

    /// `tracing` filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_long_date_format() -> String {
    "%A, %B %d, %Y".to_string()
}

fn default_short_date_format() -> String {
    "%m/%d/%y".to_string()
}

fn default_max_amount() -> Money {
    Money::from_cents(100_000_000)
}

fn default_max_description_length() -> usize {
    255
}

fn default_max_category_name_length() -> usize {
    50
}

fn default_list_limit() -> usize {
    20
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            long_date_format: default_long_date_format(),
            short_date_format: default_short_date_format(),
            max_amount: default_max_amount(),
            max_description_length: default_max_description_length(),
            max_category_name_length: default_max_category_name_length(),
            default_list_limit: default_list_limit(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Names accepted by [`Settings::set`]
    pub const KEYS: &'static [&'static str] = &[
        "currency_symbol",
        "date_format",
        "long_date_format",
        "short_date_format",
        "max_amount",
        "max_description_length",
        "max_category_name_length",
        "default_list_limit",
        "log_filter",
    ];

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &TrackerPaths) -> TrackerResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| TrackerError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| TrackerError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackerPaths) -> TrackerResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrackerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TrackerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Change one setting by name
    pub fn set(&mut self, key: &str, value: &str) -> TrackerResult<()> {
        let value = value.trim();
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "date_format" => self.date_format = parse_date_format(key, value)?,
            "long_date_format" => self.long_date_format = parse_date_format(key, value)?,
            "short_date_format" => self.short_date_format = parse_date_format(key, value)?,
            "max_amount" => {
                let amount = Money::parse(value).map_err(|e| {
                    TrackerError::Config(format!("Invalid max_amount '{}': {}", value, e))
                })?;
                if !amount.is_positive() {
                    return Err(TrackerError::Config(
                        "max_amount must be greater than zero".into(),
                    ));
                }
                self.max_amount = amount;
            }
            "max_description_length" => self.max_description_length = parse_limit(key, value)?,
            "max_category_name_length" => {
                self.max_category_name_length = parse_limit(key, value)?
            }
            "default_list_limit" => self.default_list_limit = parse_limit(key, value)?,
            "log_filter" => self.log_filter = value.to_string(),
            other => {
                return Err(TrackerError::Config(format!(
                    "Unknown setting '{}'. Known settings: {}",
                    other,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn parse_limit(key: &str, value: &str) -> TrackerResult<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(TrackerError::Config(format!(
            "{} must be a positive whole number, got '{}'",
            key, value
        ))),
    }
}

fn parse_date_format(key: &str, value: &str) -> TrackerResult<String> {
    if value.is_empty() || StrftimeItems::new(value).any(|item| matches!(item, Item::Error)) {
        return Err(TrackerError::Config(format!(
            "{} is not a valid date pattern: '{}'",
            key, value
        )));
    }
    Ok(value.to_string())
}
