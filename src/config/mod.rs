use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    errors::{BudgetError, Result},
    ledger::{parse_amount, BandThresholds},
    receipt::{ExportFormat, ReceiptStyle},
    utils::{ensure_dir, write_atomic, PathResolver},
};

/// Keys accepted by [`Config::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "currency",
    "store_name",
    "receipt_title",
    "warning_threshold",
    "critical_threshold",
    "advisory_seconds",
    "default_export_format",
    "export_dir",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub store_name: String,
    pub receipt_title: String,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub advisory_seconds: u64,
    pub default_export_format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let thresholds = BandThresholds::default();
        let style = ReceiptStyle::default();
        Self {
            currency: style.currency,
            store_name: style.store_name,
            receipt_title: style.title,
            warning_threshold: thresholds.warning,
            critical_threshold: thresholds.critical,
            advisory_seconds: 3,
            default_export_format: ExportFormat::Text,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn thresholds(&self) -> BandThresholds {
        BandThresholds {
            warning: self.warning_threshold,
            critical: self.critical_threshold,
        }
    }

    pub fn receipt_style(&self) -> ReceiptStyle {
        ReceiptStyle {
            store_name: self.store_name.clone(),
            title: self.receipt_title.clone(),
            currency: self.currency.clone(),
        }
    }

    pub fn advisory_ttl(&self) -> Duration {
        Duration::from_secs(self.advisory_seconds)
    }

    /// Receipt directory: the configured one, else `receipts/` under `base`.
    pub fn export_dir_in(&self, base: &Path) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathResolver::receipts_dir_in(base))
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(BudgetError::ConfigError("currency must not be empty".into()));
        }
        let in_range = |value: f64| (0.0..=100.0).contains(&value);
        if !in_range(self.warning_threshold) || !in_range(self.critical_threshold) {
            return Err(BudgetError::ConfigError(
                "thresholds must lie between 0 and 100".into(),
            ));
        }
        if self.warning_threshold > self.critical_threshold {
            return Err(BudgetError::ConfigError(
                "warning_threshold must not exceed critical_threshold".into(),
            ));
        }
        Ok(())
    }

    /// Applies a textual `key value` pair; the config is unchanged on error.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        let value = value.trim();
        match key {
            "currency" => next.currency = value.to_string(),
            "store_name" => next.store_name = value.to_string(),
            "receipt_title" => next.receipt_title = value.to_string(),
            "warning_threshold" => next.warning_threshold = parse_amount(value)?,
            "critical_threshold" => next.critical_threshold = parse_amount(value)?,
            "advisory_seconds" => {
                next.advisory_seconds = value.parse().map_err(|_| {
                    BudgetError::invalid(format!("`{value}` is not a whole number of seconds"))
                })?
            }
            "default_export_format" => next.default_export_format = value.parse()?,
            "export_dir" => {
                next.export_dir = if value.is_empty() || value == "default" {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            other => {
                return Err(BudgetError::invalid(format!(
                    "unknown config key `{other}` (expected one of: {})",
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// `key = value` lines in [`CONFIG_KEYS`] order.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currency", self.currency.clone()),
            ("store_name", self.store_name.clone()),
            ("receipt_title", self.receipt_title.clone()),
            ("warning_threshold", self.warning_threshold.to_string()),
            ("critical_threshold", self.critical_threshold.to_string()),
            ("advisory_seconds", self.advisory_seconds.to_string()),
            (
                "default_export_format",
                self.default_export_format.to_string(),
            ),
            (
                "export_dir",
                self.export_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|| "default".into()),
            ),
        ]
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data).map_err(|err| {
            BudgetError::ConfigError(format!("`{}`: {err}", self.path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
