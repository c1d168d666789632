use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    document::Tables,
    errors::{BookkeepingError, Result},
    utils::ensure_dir,
};

use super::StorageBackend;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;
const TMP_SUFFIX: &str = "tmp";

/// Stores a bookkeeping as one pretty-printed JSON file.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStorage;

#[derive(Serialize)]
struct FileRef<'a> {
    schema_version: u8,
    #[serde(flatten)]
    tables: &'a Tables,
}

#[derive(Deserialize)]
struct FileOwned {
    #[serde(default = "default_schema_version")]
    schema_version: u8,
    #[serde(flatten)]
    tables: Tables,
}

fn default_schema_version() -> u8 {
    CURRENT_SCHEMA_VERSION
}

impl StorageBackend for JsonStorage {
    fn load(&self, path: &Path) -> Result<Tables> {
        load_tables_from_path(path)
    }

    fn save(&self, tables: &Tables, path: &Path) -> Result<()> {
        save_tables_to_path(tables, path)
    }
}

/// Reads a bookkeeping file, rejecting files written by a newer schema.
pub fn load_tables_from_path(path: &Path) -> Result<Tables> {
    if !path.exists() {
        return Err(BookkeepingError::Storage(format!(
            "bookkeeping file `{}` not found",
            path.display()
        )));
    }
    let data = fs::read_to_string(path)?;
    let file: FileOwned = serde_json::from_str(&data)?;
    if file.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(BookkeepingError::Storage(format!(
            "bookkeeping file `{}` is from a newer schema version",
            path.display()
        )));
    }
    debug!(path = %path.display(), "loaded bookkeeping file");
    Ok(file.tables)
}

/// Writes a bookkeeping file atomically by staging to a temporary file.
pub fn save_tables_to_path(tables: &Tables, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&FileRef {
        schema_version: CURRENT_SCHEMA_VERSION,
        tables,
    })?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
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
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, AccountType, Bookkeeping};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample() -> Tables {
        let mut tables = Tables::new(Bookkeeping::new(
            "Tennisclub",
            NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
        ));
        tables
            .accounts
            .create(Account::new("100", "Kas", AccountType::ASSET))
            .unwrap();
        tables
    }

    #[test]
    fn save_then_load_restores_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("club.json");
        save_tables_to_path(&sample(), &path).unwrap();
        let loaded = load_tables_from_path(&path).unwrap();
        assert_eq!(loaded.bookkeeping.organization_name, "Tennisclub");
        assert!(loaded.accounts.exists(&"100".to_string()));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn newer_schema_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.json");
        fs::write(&path, r#"{"schema_version": 99}"#).unwrap();
        let err = load_tables_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("newer schema"), "{err}");
    }

    #[test]
    fn missing_file_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let err = load_tables_from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BookkeepingError::Storage(_)));
    }
}
