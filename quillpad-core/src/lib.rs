//! Quillpad: a small role-based blogging core
//!
//! Accounts log in through a [`SessionController`], authors publish posts
//! into the [`ContentStore`], anyone may comment, and every comment queues
//! a notification for the post's author on the [`NotificationDispatcher`].

pub mod config;
pub mod core_accounts;
pub mod core_content;
pub mod core_notify;
pub mod core_session;
pub mod listener;
pub mod logging;
pub mod persistence;
pub mod seed;
pub mod shutdown;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use core_accounts::{Account, CredentialDirectory, Role};
pub use core_content::{Comment, ContentError, ContentStore, Post, PostId};
pub use core_notify::{Notification, NotificationDispatcher, NotificationEvent};
pub use core_session::{SessionController, SessionError, SessionState};
pub use logging::{init_logging, LogLevel};
