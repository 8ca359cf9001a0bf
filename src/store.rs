/// Credential Store
///
/// Identity records keyed by email. The session coordinator only depends on
/// the [`CredentialStore`] trait; [`InMemoryCredentialStore`] is the backend
/// shipped with the service.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::StoreError;

/// A registered identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub password_hash: String,
}

pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<Identity>;

    /// Store a new identity.
    ///
    /// Checking for an existing email and inserting happen as one step, so
    /// two concurrent inserts for the same email cannot both succeed.
    ///
    /// # Errors
    /// `StoreError::DuplicateIdentity` if the email is already stored
    fn insert(&self, identity: Identity) -> Result<(), StoreError>;

    /// All identities, ordered by email
    fn list(&self) -> Vec<Identity>;
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    identities: DashMap<String, Identity>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_email(&self, email: &str) -> Option<Identity> {
        self.identities.get(email).map(|entry| entry.value().clone())
    }

    fn insert(&self, identity: Identity) -> Result<(), StoreError> {
        match self.identities.entry(identity.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateIdentity(identity.email)),
            Entry::Vacant(slot) => {
                slot.insert(identity);
                Ok(())
            }
        }
    }

    fn list(&self) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self
            .identities
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        identities.sort_by(|a, b| a.email.cmp(&b.email));
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str, hash: &str) -> Identity {
        Identity {
            email: email.to_string(),
            password_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let store = InMemoryCredentialStore::new();
        assert!(store.find_by_email("a@x.com").is_none());

        store.insert(identity("a@x.com", "hash-1")).unwrap();

        let found = store.find_by_email("a@x.com").expect("identity should exist");
        assert_eq!(found.password_hash, "hash-1");
    }

    #[test]
    fn test_duplicate_insert_does_not_overwrite() {
        let store = InMemoryCredentialStore::new();
        store.insert(identity("a@x.com", "hash-1")).unwrap();

        let result = store.insert(identity("a@x.com", "hash-2"));

        assert_eq!(result, Err(StoreError::DuplicateIdentity("a@x.com".to_string())));
        assert_eq!(store.find_by_email("a@x.com").unwrap().password_hash, "hash-1");
    }

    #[test]
    fn test_list_is_sorted() {
        let store = InMemoryCredentialStore::new();
        store.insert(identity("c@x.com", "h")).unwrap();
        store.insert(identity("a@x.com", "h")).unwrap();
        store.insert(identity("b@x.com", "h")).unwrap();

        let emails: Vec<String> = store.list().into_iter().map(|i| i.email).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[test]
    fn test_concurrent_inserts_single_winner() {
        let store = std::sync::Arc::new(InMemoryCredentialStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.insert(identity("race@x.com", &format!("hash-{}", i))).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.list().len(), 1);
    }
}
