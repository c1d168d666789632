use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::Result;

const DEFAULT_DIR_NAME: &str = ".club_books";
const HOME_ENV: &str = "CLUB_BOOKS_HOME";
const BOOKKEEPING_DIR: &str = "bookkeepings";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.club_books`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding bookkeeping files below `base`.
pub fn bookkeepings_dir_in(base: &Path) -> PathBuf {
    base.join(BOOKKEEPING_DIR)
}

/// Resolves the file path for a bookkeeping name below `base`.
pub fn bookkeeping_file_in(base: &Path, name: &str) -> PathBuf {
    bookkeepings_dir_in(base).join(format!("{}.json", canonical_name(name)))
}

pub fn config_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    config_dir_in(base).join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Lowercase slug safe for file names.
pub fn canonical_name(name: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !slug.is_empty() && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "bookkeeping".into()
    } else {
        trimmed.to_string()
    }
}
