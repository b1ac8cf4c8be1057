//! Post data structure and display text

use super::comment_log::{Comment, CommentLog};
use super::errors::ContentError;
use super::types::PostId;
use serde::{Deserialize, Serialize};

/// A published post. Only its comment log changes after creation.
#[derive(Debug)]
pub struct Post {
    id: PostId,
    title: String,
    body: String,
    author: String,
    comments: CommentLog,
}

impl Post {
    pub(crate) fn new(id: PostId, title: String, body: String, author: String) -> Self {
        Self {
            id,
            title,
            body,
            author,
            comments: CommentLog::new(),
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Identifier of the account that wrote the post
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn comments(&self) -> &CommentLog {
        &self.comments
    }

    /// Block of text shown on the dashboards
    pub fn display_text(&self) -> Result<String, ContentError> {
        let mut out = String::new();
        out.push_str(&format!("--- POST [{}] ---\n", self.id));
        out.push_str(&format!("Title: {}\n", self.title));
        out.push_str(&format!("By: {}\n", self.author));
        out.push_str(&format!("Content: {}\n", self.body));
        out.push_str("Comments:\n");
        out.push_str(&self.comments.render()?);
        out.push_str("---------------------\n");
        Ok(out)
    }

    /// Owned, serialisable copy of the post and its current comments
    pub fn view(&self) -> Result<PostView, ContentError> {
        Ok(PostView {
            id: self.id,
            title: self.title.clone(),
            body: self.body.clone(),
            author: self.author.clone(),
            comments: self.comments.snapshot()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub author: String,
    pub comments: Vec<Comment>,
}
