//! The single interactive session
//!
//! [`SessionController`] holds who is logged in and is the only way the
//! presentation layer reaches the content store. Post creation and
//! commenting go through the current account; calling either while logged
//! out is an error.

pub mod controller;

pub use controller::{SessionController, SessionError, SessionState};
