use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{
    errors::{BookkeepingError, Result},
    utils::{app_data_dir, config_dir_in, config_file_in, ensure_dir},
};
use crate::domain::bookkeeping::{
    Bookkeeping, DEFAULT_INVOICE_ID_FORMAT, DEFAULT_JOURNAL_ENTRY_ID_FORMAT,
};

const TMP_SUFFIX: &str = "tmp";

/// User preferences shared by all bookkeepings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_decimal_separator")]
    pub decimal_separator: char,
    #[serde(default = "Config::default_invoice_id_format")]
    pub invoice_id_format: String,
    #[serde(default = "Config::default_journal_entry_id_format")]
    pub journal_entry_id_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_bookkeeping: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "nl-NL".into(),
            currency: "EUR".into(),
            decimal_separator: Self::default_decimal_separator(),
            invoice_id_format: Self::default_invoice_id_format(),
            journal_entry_id_format: Self::default_journal_entry_id_format(),
            last_opened_bookkeeping: None,
        }
    }
}

impl Config {
    fn default_decimal_separator() -> char {
        ','
    }

    fn default_invoice_id_format() -> String {
        DEFAULT_INVOICE_ID_FORMAT.into()
    }

    fn default_journal_entry_id_format() -> String {
        DEFAULT_JOURNAL_ENTRY_ID_FORMAT.into()
    }

    /// Settings for a new bookkeeping, taking currency and id formats from here.
    pub fn new_bookkeeping(
        &self,
        organization_name: impl Into<String>,
        start_of_period: NaiveDate,
    ) -> Bookkeeping {
        Bookkeeping {
            currency: self.currency.clone(),
            invoice_id_format: self.invoice_id_format.clone(),
            journal_entry_id_format: self.journal_entry_id_format.clone(),
            ..Bookkeeping::new(organization_name, start_of_period)
        }
    }

    /// Checks values that would otherwise fail later while parsing amounts.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.decimal_separator, '.' | ',') {
            return Err(BookkeepingError::Config(format!(
                "decimal separator `{}` must be `.` or `,`",
                self.decimal_separator
            )));
        }
        for format in [&self.invoice_id_format, &self.journal_entry_id_format] {
            if !format.contains('n') {
                return Err(BookkeepingError::Config(format!(
                    "id format `{format}` has no sequence placeholder"
                )));
            }
        }
        Ok(())
    }
}

/// Loads and stores [`Config`] as JSON below the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&config_dir_in(&base))?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    /// Reads the configuration, falling back to defaults when none was saved yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)
            .map_err(|err| BookkeepingError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            decimal_separator: '.',
            invoice_id_format: "F-yyyy-nnn".into(),
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn new_bookkeepings_take_their_defaults_from_config() {
        let config = Config {
            currency: "CHF".into(),
            invoice_id_format: "F-yyyy-nnn".into(),
            journal_entry_id_format: "yymmnnn".into(),
            ..Config::default()
        };
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let bookkeeping = config.new_bookkeeping("Schaakclub De Pion", start);
        assert_eq!(bookkeeping.organization_name, "Schaakclub De Pion");
        assert_eq!(bookkeeping.start_of_period, start);
        assert_eq!(bookkeeping.currency, "CHF");
        assert_eq!(bookkeeping.invoice_id_format, "F-yyyy-nnn");
        assert_eq!(bookkeeping.journal_entry_id_format, "yymmnnn");
    }

    #[test]
    fn rejects_unknown_decimal_separator() {
        let config = Config {
            decimal_separator: ';',
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(BookkeepingError::Config(_))));
    }
}
