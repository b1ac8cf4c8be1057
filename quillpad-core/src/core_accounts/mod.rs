//! Accounts and credential checks
//!
//! - **Account**: an identifier, a plaintext secret and a [`Role`]
//! - **CredentialDirectory**: the registered accounts, read-mostly after seeding
//!
//! Login failure is deliberately an `Option`, not an error: an unknown
//! identifier and a wrong secret look the same to the caller.

pub mod account;
pub mod directory;

pub use account::{Account, Dashboard, DashboardAction, Role};
pub use directory::{AccountError, CredentialDirectory};
