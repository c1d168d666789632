pub mod json_backend;

use std::path::Path;

use crate::core::{document::Tables, errors::Result};

/// Abstraction over persistence backends able to store a whole bookkeeping.
pub trait StorageBackend {
    fn load(&self, path: &Path) -> Result<Tables>;
    fn save(&self, tables: &Tables, path: &Path) -> Result<()>;
}

pub use json_backend::{JsonStorage, CURRENT_SCHEMA_VERSION};
