//! Posts and their comment logs
//!
//! ## Architecture
//!
//! - **ContentStore**: owns every post, hands out ids, lists and looks up
//! - **Post**: immutable title/body/author plus its own [`CommentLog`]
//! - **CommentLog**: append-only, one mutex per post
//!
//! Publishing forwards the new post to the persistence queue and
//! commenting forwards the post author to the notification dispatcher.
//! Neither collaborator can fail or slow down the caller.

pub mod comment_log;
pub mod errors;
pub mod post;
pub mod store;
pub mod types;

pub use comment_log::{Comment, CommentLog};
pub use errors::ContentError;
pub use post::{Post, PostView};
pub use store::ContentStore;
pub use types::PostId;
