//! Per-post comment log

use super::errors::ContentError;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::info;

fn handle_poison<T>(_err: PoisonError<T>) -> ContentError {
    ContentError::LockPoisoned
}

/// A single comment; never edited once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub author: String,
}

impl Comment {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

/// Append-only, insertion-ordered comments for one post
///
/// Appends are serialised by a mutex owned by this log alone, so commenters
/// on different posts never contend. Readers take a cloned snapshot.
#[derive(Debug, Default)]
pub struct CommentLog {
    entries: Mutex<Vec<Comment>>,
}

impl CommentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, comment: Comment) -> Result<(), ContentError> {
        let mut entries = self.entries.lock().map_err(handle_poison)?;
        info!(author = %comment.author, text = %comment.text, "Comment added");
        entries.push(comment);
        Ok(())
    }

    /// Comments in append order
    pub fn snapshot(&self) -> Result<Vec<Comment>, ContentError> {
        Ok(self.entries.lock().map_err(handle_poison)?.clone())
    }

    pub fn len(&self) -> Result<usize, ContentError> {
        Ok(self.entries.lock().map_err(handle_poison)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ContentError> {
        Ok(self.len()? == 0)
    }

    /// One `  - text (author)` line per comment, or the empty-state line
    pub fn render(&self) -> Result<String, ContentError> {
        let comments = self.snapshot()?;
        if comments.is_empty() {
            return Ok("  No comments yet.\n".to_string());
        }

        let mut out = String::new();
        for comment in &comments {
            out.push_str(&format!("  - {} ({})\n", comment.text, comment.author));
        }
        Ok(out)
    }
}
