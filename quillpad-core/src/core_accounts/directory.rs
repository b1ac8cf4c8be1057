//! In-memory credential directory

use super::account::{Account, Role};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Identifier already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("Lock poisoned: a thread panicked while holding the directory lock")]
    LockPoisoned,
}

fn handle_poison<T>(_err: PoisonError<T>) -> AccountError {
    AccountError::LockPoisoned
}

/// Registered accounts keyed by identifier
#[derive(Debug, Default)]
pub struct CredentialDirectory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl CredentialDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new account; identifiers are unique
    pub fn register(
        &self,
        identifier: impl Into<String>,
        secret: impl Into<String>,
        role: Role,
    ) -> Result<Account, AccountError> {
        let identifier = identifier.into();
        let mut accounts = self.accounts.write().map_err(handle_poison)?;

        if accounts.contains_key(&identifier) {
            return Err(AccountError::DuplicateIdentifier(identifier));
        }

        let account = Account::new(identifier.clone(), secret, role);
        accounts.insert(identifier, account.clone());
        debug!(identifier = account.identifier(), role = %role, "Account registered");

        Ok(account)
    }

    /// Return the account when both identifier and secret match
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Option<Account> {
        let accounts = match self.accounts.read() {
            Ok(accounts) => accounts,
            Err(_) => {
                warn!("Credential directory lock poisoned, refusing login");
                return None;
            }
        };

        accounts
            .get(identifier)
            .filter(|account| account.check_secret(secret))
            .cloned()
    }

    pub fn len(&self) -> Result<usize, AccountError> {
        Ok(self.accounts.read().map_err(handle_poison)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, AccountError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> CredentialDirectory {
        let directory = CredentialDirectory::new();
        directory.register("author1", "abcd", Role::Author).unwrap();
        directory.register("reader1", "xyz", Role::Reader).unwrap();
        directory
    }

    #[test]
    fn test_authenticate_success() {
        let account = directory().authenticate("author1", "abcd").unwrap();
        assert_eq!(account.identifier(), "author1");
        assert_eq!(account.role(), Role::Author);
    }

    #[test]
    fn test_authenticate_unknown_identifier() {
        assert!(directory().authenticate("ghost", "abcd").is_none());
    }

    #[test]
    fn test_authenticate_wrong_secret() {
        assert!(directory().authenticate("author1", "wrong").is_none());
        assert!(directory().authenticate("reader1", "XYZ").is_none());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let directory = directory();
        let err = directory
            .register("author1", "other", Role::Reader)
            .unwrap_err();

        assert!(matches!(err, AccountError::DuplicateIdentifier(ref id) if id == "author1"));
        assert_eq!(directory.len().unwrap(), 2);
        // The original account is untouched
        assert!(directory.authenticate("author1", "abcd").is_some());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let directory = std::sync::Arc::new(directory());
        let poisoner = directory.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.accounts.write().unwrap();
            panic!("poison the directory lock");
        })
        .join();

        assert!(matches!(directory.len(), Err(AccountError::LockPoisoned)));
        assert!(matches!(directory.is_empty(), Err(AccountError::LockPoisoned)));
        assert!(matches!(
            directory.register("late", "pw", Role::Reader),
            Err(AccountError::LockPoisoned)
        ));
    }
}
