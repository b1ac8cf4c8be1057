//! Notification payloads and lifecycle events

use crate::core_content::PostId;

/// "Someone commented on your post"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Author of the post, i.e. the recipient
    pub recipient: String,
    pub post_id: PostId,
    pub commenter: String,
}

impl Notification {
    pub fn new(recipient: impl Into<String>, post_id: PostId, commenter: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            post_id,
            commenter: commenter.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Accepted onto the queue
    Queued(Notification),
    /// A worker finished delivering it
    Delivered(Notification),
}

impl NotificationEvent {
    pub fn notification(&self) -> &Notification {
        match self {
            NotificationEvent::Queued(n) | NotificationEvent::Delivered(n) => n,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationEvent::Delivered(_))
    }
}
