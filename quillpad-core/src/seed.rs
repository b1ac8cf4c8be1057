//! Accounts and content present at start-up

use crate::core_accounts::{Account, AccountError, CredentialDirectory, Role};
use crate::core_content::{ContentError, ContentStore};

/// `(identifier, secret, role)` of the built-in accounts
pub const SEED_ACCOUNTS: &[(&str, &str, Role)] = &[
    ("admin1", "1234", Role::Admin),
    ("author1", "abcd", Role::Author),
    ("reader1", "xyz", Role::Reader),
];

pub const WELCOME_TITLE: &str = "Welcome to the Blog!";
pub const WELCOME_BODY: &str = "This is the very first post.";

/// Register the built-in accounts into `directory`
pub fn seed_directory(directory: &CredentialDirectory) -> Result<(), AccountError> {
    for (identifier, secret, role) in SEED_ACCOUNTS {
        directory.register(*identifier, *secret, *role)?;
    }
    Ok(())
}

/// Publish the welcome post (id 1) as author1, without persisting it
pub fn seed_content(store: &ContentStore) -> Result<(), ContentError> {
    let author = Account::new("author1", "abcd", Role::Author);
    store.seed_post(&author, WELCOME_TITLE, WELCOME_BODY)?;
    Ok(())
}
