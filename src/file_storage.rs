use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use social_forum_frontend::{KeyValueStorage, StorageError};

/// Local storage for the command line: a JSON object on disk, one entry
/// per key. Every call reads or rewrites the whole file.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    /// `<config dir>/social-forum/local_storage.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("social-forum").join("local_storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self, key: &str) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(StorageError::Read {
                    key: key.to_owned(),
                    reason: err.to_string(),
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|err| StorageError::Read {
            key: key.to_owned(),
            reason: format!("{} is not a storage file: {}", self.path.display(), err),
        })
    }

    fn save(&self, key: &str, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_error = |reason: String| StorageError::Write {
            key: key.to_owned(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| write_error(err.to_string()))?;
        }

        let encoded = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, encoded).map_err(|err| write_error(err.to_string()))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load(key)?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load(key)?;
        items.insert(key.to_owned(), value.to_owned());
        self.save(key, &items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let (mut items, unreadable) = match self.load(key) {
            Ok(items) => (items, false),
            // an unreadable file holds nothing worth keeping
            Err(StorageError::Read { .. }) => (BTreeMap::new(), true),
            Err(err) => return Err(err),
        };

        if items.remove(key).is_none() && !unreadable {
            return Ok(());
        }

        self.save(key, &items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("storage.json"));

        assert_eq!(storage.get_item("user").unwrap(), None);
        storage.remove_item("user").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn entries_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileStorage::new(&path)
            .set_item("user", r#"{"username":"alice"}"#)
            .unwrap();
        FileStorage::new(&path).set_item("theme", "dark").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(
            storage.get_item("user").unwrap().as_deref(),
            Some(r#"{"username":"alice"}"#)
        );

        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn garbage_file_is_a_read_error_that_remove_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json at all").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get_item("user"),
            Err(StorageError::Read { .. })
        ));

        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
    }
}
