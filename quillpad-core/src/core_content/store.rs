//! The post registry

use super::comment_log::Comment;
use super::errors::ContentError;
use super::post::{Post, PostView};
use super::types::PostId;
use crate::core_accounts::Account;
use crate::core_notify::{Notification, NotificationDispatcher};
use crate::persistence::PersistenceQueue;
use metrics::counter;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

fn handle_poison<T>(_err: PoisonError<T>) -> ContentError {
    ContentError::LockPoisoned
}

/// Posts in creation order plus the next id to hand out. Both live under one
/// lock so that listing order and id order can never disagree.
#[derive(Debug)]
struct Registry {
    posts: Vec<Arc<Post>>,
    next_id: PostId,
}

/// Owns every post and routes comments to their logs
pub struct ContentStore {
    registry: RwLock<Registry>,
    notifier: NotificationDispatcher,
    persistence: PersistenceQueue,
}

impl ContentStore {
    pub fn new(notifier: NotificationDispatcher, persistence: PersistenceQueue) -> Self {
        Self {
            registry: RwLock::new(Registry {
                posts: Vec::new(),
                next_id: PostId::FIRST,
            }),
            notifier,
            persistence,
        }
    }

    /// Publish a post as `author`, who must hold the Author role
    ///
    /// The post is handed to the persistence queue after it is visible in
    /// memory; a failed save does not undo it.
    pub fn create_post(
        &self,
        author: &Account,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Arc<Post>, ContentError> {
        let post = self.insert(author, title.into(), body.into())?;
        self.persistence.submit(post.clone());
        Ok(post)
    }

    /// Same as [`create_post`](Self::create_post) without persisting; used
    /// for the posts present at start-up
    pub(crate) fn seed_post(
        &self,
        author: &Account,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Arc<Post>, ContentError> {
        self.insert(author, title.into(), body.into())
    }

    fn insert(&self, author: &Account, title: String, body: String) -> Result<Arc<Post>, ContentError> {
        if !author.role().can_create_posts() {
            warn!(identifier = author.identifier(), role = %author.role(), "Only Authors can create posts");
            return Err(ContentError::Unauthorized {
                identifier: author.identifier().to_string(),
                role: author.role(),
            });
        }

        let mut registry = self.registry.write().map_err(handle_poison)?;
        let id = registry.next_id;
        registry.next_id = id.next();

        let post = Arc::new(Post::new(id, title, body, author.identifier().to_string()));
        registry.posts.push(post.clone());
        drop(registry);

        counter!("quillpad_posts_created_total").increment(1);
        info!(post_id = %id, author = post.author(), "Post created: {}", post.title());
        Ok(post)
    }

    /// Look up a post by id
    pub fn find_post(&self, id: PostId) -> Result<Option<Arc<Post>>, ContentError> {
        let registry = self.registry.read().map_err(handle_poison)?;
        // Ids are assigned in push order, so the list is sorted by id
        Ok(registry
            .posts
            .binary_search_by_key(&id, |post| post.id())
            .ok()
            .map(|index| registry.posts[index].clone()))
    }

    /// Every post in creation order, detached from later additions
    pub fn list_posts(&self) -> Result<Vec<Arc<Post>>, ContentError> {
        Ok(self.registry.read().map_err(handle_poison)?.posts.clone())
    }

    pub fn len(&self) -> Result<usize, ContentError> {
        Ok(self.registry.read().map_err(handle_poison)?.posts.len())
    }

    pub fn is_empty(&self) -> Result<bool, ContentError> {
        Ok(self.len()? == 0)
    }

    /// Append a comment to `post_id` and notify the post's author
    ///
    /// Any account may comment. The notification is queued, not awaited; if
    /// the dispatcher is already shut down the comment still stands.
    pub fn add_comment(
        &self,
        post_id: PostId,
        commenter: &Account,
        text: impl Into<String>,
    ) -> Result<Comment, ContentError> {
        let post = self
            .find_post(post_id)?
            .ok_or(ContentError::PostNotFound(post_id))?;

        let comment = Comment::new(text, commenter.identifier());
        post.comments().append(comment.clone())?;
        counter!("quillpad_comments_added_total").increment(1);

        let notification = Notification::new(post.author(), post_id, commenter.identifier());
        if let Err(e) = self.notifier.submit(notification) {
            warn!(post_id = %post_id, error = %e, "Comment notification dropped");
        }

        Ok(comment)
    }

    /// All posts as dashboard text
    pub fn render_all(&self) -> Result<String, ContentError> {
        let posts = self.list_posts()?;
        if posts.is_empty() {
            return Ok("No posts available.".to_string());
        }

        let blocks = posts
            .iter()
            .map(|post| post.display_text())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blocks.join("\n"))
    }

    /// Snapshot of every post with its comments
    pub fn views(&self) -> Result<Vec<PostView>, ContentError> {
        self.list_posts()?.iter().map(|post| post.view()).collect()
    }

    /// Pretty-printed JSON of [`views`](Self::views)
    pub fn export_json(&self) -> Result<String, ContentError> {
        Ok(serde_json::to_string_pretty(&self.views()?)?)
    }
}
