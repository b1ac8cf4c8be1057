//! Comment notifications
//!
//! A fixed pool of tokio workers drains an unbounded queue of
//! [`Notification`]s. Submitting never waits on delivery, and nothing a
//! worker does is reported back to the submitter; observers subscribe to
//! [`NotificationEvent`]s instead.

pub mod dispatcher;
pub mod events;

pub use dispatcher::{NotificationDispatcher, NotifyError};
pub use events::{Notification, NotificationEvent};
