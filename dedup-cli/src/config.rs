//! CLI Configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use dedup_core::{Dedup, DedupConfig};

/// Database file name inside the data directory.
const DATABASE_FILE: &str = "contacts.db";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for storage.
    pub data_dir: PathBuf,
    /// Print machine-readable JSON instead of tables.
    pub json: bool,
}

impl CliConfig {
    /// Resolves the data directory: the explicit one if given, else `~/.dedup`.
    pub fn resolve(data_dir: Option<PathBuf>, json: bool) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".dedup")
        });
        CliConfig { data_dir, json }
    }

    /// Returns the SQLite database path.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Opens the store, creating the data directory on first use.
    pub fn open(&self) -> Result<Dedup> {
        tracing::debug!(path = %self.storage_path().display(), "opening contact database");
        Dedup::new(DedupConfig::with_storage_path(self.storage_path())).with_context(|| {
            format!(
                "failed to open contact database at {}",
                self.storage_path().display()
            )
        })
    }
}

// INLINE_TEST_REQUIRED: Binary crate without lib.rs - tests cannot be external
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_path_inside_data_dir() {
        let config = CliConfig::resolve(Some(PathBuf::from("/tmp/dedup-test")), false);
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/dedup-test/contacts.db")
        );
    }

    #[test]
    fn test_default_data_dir_is_hidden_home_dir() {
        let config = CliConfig::resolve(None, false);
        assert!(config.data_dir.ends_with(".dedup"));
    }

    #[test]
    fn test_open_creates_data_dir() {
        let temp_dir = tempdir().unwrap();
        let data_dir = temp_dir.path().join("nested");
        let config = CliConfig::resolve(Some(data_dir.clone()), false);

        let dedup = config.open().expect("should open database");

        assert!(data_dir.join("contacts.db").exists());
        assert!(dedup.list_contacts().unwrap().is_empty());
    }

    #[test]
    fn test_open_twice_sees_same_data() {
        let temp_dir = tempdir().unwrap();
        let config = CliConfig::resolve(Some(temp_dir.path().to_path_buf()), false);

        config
            .open()
            .unwrap()
            .add_contact(dedup_core::Contact::draft().with_first_name("Ann"))
            .unwrap();

        assert_eq!(config.open().unwrap().list_contacts().unwrap().len(), 1);
    }
}
