//! The single active identity, kept in memory and in local storage.
//!
//! A store is an ordinary value handed to whoever needs it; there is no
//! global. Login and logout notify subscribers synchronously, in the order
//! they subscribed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};

use crate::error::StorageError;
use crate::models::Identity;
use crate::storage::KeyValueStorage;
use crate::wire;
use crate::USERNAME_LOCAL_STORAGE_KEY;

/// Handle returned by [`IdentityStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback = Rc<dyn Fn()>;

pub struct IdentityStore {
    storage: Box<dyn KeyValueStorage>,
    key: String,
    current: RefCell<Option<Identity>>,
    subscribers: RefCell<Vec<(Subscription, Callback)>>,
    next_subscription: Cell<u64>,
}

impl IdentityStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        IdentityStore::with_key(storage, USERNAME_LOCAL_STORAGE_KEY)
    }

    pub fn with_key(storage: impl KeyValueStorage + 'static, key: impl Into<String>) -> Self {
        IdentityStore {
            storage: Box::new(storage),
            key: key.into(),
            current: RefCell::new(None),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Loads the stored identity, if any.
    ///
    /// Unreadable or malformed entries are removed and the store carries on
    /// without an identity.
    pub fn initialize(&self) {
        let stored = match self.storage.get_item(&self.key) {
            Ok(stored) => stored,
            Err(err) => {
                warn!("could not read stored identity: {}", err);
                self.discard_stored();
                return;
            }
        };

        let raw = match stored {
            Some(raw) if !raw.is_empty() => raw,
            _ => return,
        };

        match wire::decode_optional::<Identity>(&raw) {
            Ok(identity) => {
                debug!("loaded stored identity {:?}", identity);
                *self.current.borrow_mut() = identity;
            }
            Err(err) => {
                warn!("discarding corrupted identity under `{}`: {}", self.key, err);
                self.discard_stored();
            }
        }
    }

    /// The in-memory identity, loading it from storage first when absent.
    pub fn current_identity(&self) -> Option<Identity> {
        if self.current.borrow().is_none() {
            self.initialize();
        }

        self.current.borrow().clone()
    }

    /// Only looks at memory; never loads from storage.
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Replaces any previous identity. The username is trimmed but an empty
    /// result is still accepted.
    pub fn login(&self, username: &str) -> Result<Identity, StorageError> {
        let identity = Identity::new(username.trim());
        let encoded = wire::encode(&identity)?;

        *self.current.borrow_mut() = Some(identity.clone());
        self.storage.set_item(&self.key, &encoded)?;
        debug!("logged in as {:?}", identity.username);

        self.notify();
        Ok(identity)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        *self.current.borrow_mut() = None;
        self.storage.remove_item(&self.key)?;
        debug!("logged out");

        self.notify();
        Ok(())
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription.get());
        self.next_subscription.set(subscription.0 + 1);

        self.subscribers
            .borrow_mut()
            .push((subscription, Rc::new(callback)));
        subscription
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) {
        // snapshot so callbacks may (un)subscribe while being called
        let callbacks: Vec<Callback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in callbacks {
            callback();
        }
    }

    fn discard_stored(&self) {
        if let Err(err) = self.storage.remove_item(&self.key) {
            warn!("could not remove stored identity: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (IdentityStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (IdentityStore::new(storage.clone()), storage)
    }

    #[test]
    fn login_trims_and_persists() {
        let (identities, storage) = store();

        let identity = identities.login("  alice  ").unwrap();
        assert_eq!(identity.username, "alice");
        assert!(identities.is_authenticated());
        assert_eq!(
            identities.current_identity(),
            Some(Identity::new("alice"))
        );
        assert_eq!(
            storage.get_item("user").unwrap().as_deref(),
            Some(r#"{"username":"alice"}"#)
        );
    }

    #[test]
    fn login_replaces_previous_identity() {
        let (identities, _storage) = store();

        identities.login("alice").unwrap();
        identities.login("bob").unwrap();
        assert_eq!(identities.current_identity(), Some(Identity::new("bob")));
    }

    #[test]
    fn blank_usernames_are_accepted() {
        let (identities, _storage) = store();

        let identity = identities.login("   ").unwrap();
        assert_eq!(identity.username, "");
        assert!(identities.is_authenticated());
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let (identities, storage) = store();

        identities.login("alice").unwrap();
        identities.logout().unwrap();

        assert!(!identities.is_authenticated());
        assert_eq!(identities.current_identity(), None);
        assert!(!storage.contains_key("user"));
    }

    #[test]
    fn identity_loads_lazily_from_storage() {
        let storage = MemoryStorage::new();
        storage.set_item("user", r#"{"username":"carol"}"#).unwrap();
        let identities = IdentityStore::new(storage);

        assert!(!identities.is_authenticated());
        assert_eq!(identities.current_identity(), Some(Identity::new("carol")));
        assert!(identities.is_authenticated());
    }

    #[test]
    fn corrupted_entry_is_discarded() {
        let storage = MemoryStorage::new();
        storage.set_item("user", "{not json").unwrap();
        let identities = IdentityStore::new(storage.clone());

        identities.initialize();

        assert!(!identities.is_authenticated());
        assert_eq!(identities.current_identity(), None);
        assert!(!storage.contains_key("user"));
    }

    #[test]
    fn custom_key_is_used() {
        let storage = MemoryStorage::new();
        let identities = IdentityStore::with_key(storage.clone(), "forum_user");

        identities.login("dave").unwrap();
        assert!(storage.contains_key("forum_user"));
        assert!(!storage.contains_key("user"));
    }

    #[test]
    fn subscribers_hear_login_and_logout_in_order() {
        let (identities, _storage) = store();
        let heard = Rc::new(RefCell::new(Vec::new()));

        let first = heard.clone();
        identities.subscribe(move || first.borrow_mut().push("first"));
        let second = heard.clone();
        identities.subscribe(move || second.borrow_mut().push("second"));

        identities.login("alice").unwrap();
        identities.logout().unwrap();

        assert_eq!(
            *heard.borrow(),
            vec!["first", "second", "first", "second"]
        );
    }

    #[test]
    fn unsubscribed_callbacks_are_not_called() {
        let (identities, _storage) = store();
        let calls = Rc::new(Cell::new(0));

        let counter = calls.clone();
        let subscription = identities.subscribe(move || counter.set(counter.get() + 1));

        identities.login("alice").unwrap();
        assert!(identities.unsubscribe(subscription));
        assert!(!identities.unsubscribe(subscription));
        identities.logout().unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(identities.subscriber_count(), 0);
    }

    #[test]
    fn callbacks_may_read_the_store() {
        let identities = Rc::new(IdentityStore::new(MemoryStorage::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let observer = Rc::downgrade(&identities);
        let sink = seen.clone();
        identities.subscribe(move || {
            if let Some(identities) = observer.upgrade() {
                sink.borrow_mut().push(identities.is_authenticated());
            }
        });

        identities.login("alice").unwrap();
        identities.logout().unwrap();

        assert_eq!(*seen.borrow(), vec![true, false]);
    }
}
