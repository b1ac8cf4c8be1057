//! Account and role definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission class of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages users and posts (read-only in this build)
    Admin,
    /// Writes posts
    Author,
    /// Reads and comments
    Reader,
}

/// Something the presentation layer may offer on a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    ListPosts,
    CreatePost,
    AddComment,
}

/// What a role sees after logging in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dashboard {
    pub title: &'static str,
    pub welcome: Option<&'static str>,
    pub actions: &'static [DashboardAction],
}

impl Dashboard {
    pub fn offers(&self, action: DashboardAction) -> bool {
        self.actions.contains(&action)
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Author => "Author",
            Role::Reader => "Reader",
        }
    }

    /// Only authors may publish
    pub fn can_create_posts(&self) -> bool {
        matches!(self, Role::Author)
    }

    /// Commenting is open to every role
    pub fn can_comment(&self) -> bool {
        true
    }

    pub fn dashboard(&self) -> Dashboard {
        match self {
            Role::Admin => Dashboard {
                title: "Admin Dashboard",
                welcome: Some("Welcome, Admin! You can manage users and posts."),
                actions: &[DashboardAction::ListPosts],
            },
            Role::Author => Dashboard {
                title: "Author Dashboard",
                welcome: None,
                actions: &[DashboardAction::ListPosts, DashboardAction::CreatePost],
            },
            Role::Reader => Dashboard {
                title: "Reader Dashboard",
                welcome: None,
                actions: &[DashboardAction::ListPosts, DashboardAction::AddComment],
            },
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered identity. Immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    identifier: String,
    secret: String,
    role: Role,
}

impl Account {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>, role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            role,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Exact comparison against the stored secret
    pub fn check_secret(&self, candidate: &str) -> bool {
        self.secret == candidate
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("identifier", &self.identifier)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_authors_create_posts() {
        assert!(Role::Author.can_create_posts());
        assert!(!Role::Admin.can_create_posts());
        assert!(!Role::Reader.can_create_posts());
    }

    #[test]
    fn test_every_role_may_comment() {
        for role in [Role::Admin, Role::Author, Role::Reader] {
            assert!(role.can_comment());
        }
    }

    #[test]
    fn test_dashboards() {
        let admin = Role::Admin.dashboard();
        assert_eq!(admin.title, "Admin Dashboard");
        assert!(admin.welcome.is_some());
        assert!(!admin.offers(DashboardAction::CreatePost));

        let author = Role::Author.dashboard();
        assert!(author.offers(DashboardAction::CreatePost));
        assert!(!author.offers(DashboardAction::AddComment));

        let reader = Role::Reader.dashboard();
        assert!(reader.offers(DashboardAction::AddComment));
        assert!(reader.offers(DashboardAction::ListPosts));
    }

    #[test]
    fn test_secret_is_exact_match() {
        let account = Account::new("author1", "abcd", Role::Author);
        assert!(account.check_secret("abcd"));
        assert!(!account.check_secret("ABCD"));
        assert!(!account.check_secret("abcd "));
        assert!(!account.check_secret(""));
    }

    #[test]
    fn test_debug_hides_secret() {
        let account = Account::new("admin1", "1234", Role::Admin);
        let rendered = format!("{:?}", account);
        assert!(rendered.contains("admin1"));
        assert!(!rendered.contains("1234"));
    }
}
