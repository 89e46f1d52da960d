use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

/// String-keyed store that survives restarts, shaped after browser local
/// storage.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use web_sys::Storage;

    use super::KeyValueStorage;
    use crate::error::StorageError;

    /// `window.localStorage` of the current page.
    pub struct BrowserStorage {
        storage: Storage,
    }

    impl BrowserStorage {
        pub fn new() -> Result<Self, StorageError> {
            let window = web_sys::window()
                .ok_or_else(|| StorageError::Unavailable("no window".into()))?;
            let storage = window
                .local_storage()
                .map_err(|err| StorageError::Unavailable(format!("{:?}", err)))?
                .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))?;

            Ok(BrowserStorage { storage })
        }
    }

    impl KeyValueStorage for BrowserStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage
                .get_item(key)
                .map_err(|err| StorageError::Read {
                    key: key.to_owned(),
                    reason: format!("{:?}", err),
                })
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage
                .set_item(key, value)
                .map_err(|err| StorageError::Write {
                    key: key.to_owned(),
                    reason: format!("{:?}", err),
                })
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.storage
                .remove_item(key)
                .map_err(|err| StorageError::Remove {
                    key: key.to_owned(),
                    reason: format!("{:?}", err),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("user", "{}").unwrap();
        assert_eq!(other.get_item("user").unwrap().as_deref(), Some("{}"));

        other.remove_item("user").unwrap();
        assert!(!storage.contains_key("user"));
        assert_eq!(storage.get_item("user").unwrap(), None);
    }
}
