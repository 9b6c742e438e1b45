//! Social platform trait and common types.

use async_trait::async_trait;

use super::error::SocialError;

/// Platform-assigned identifier of a published post.
pub type PostId = String;

/// A post read from the platform timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub author_id: Option<String>,
    pub author_username: Option<String>,
}

/// Trait for social platforms the agent can act on.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Publish a new post and return its id.
    async fn post(&self, content: &str) -> Result<PostId, SocialError>;

    /// Publish a reply to an existing post.
    async fn reply(&self, post_id: &str, content: &str) -> Result<PostId, SocialError>;

    /// Like an existing post.
    async fn like(&self, post_id: &str) -> Result<(), SocialError>;

    /// Read up to `count` recent posts from the home timeline.
    async fn read_timeline(&self, count: usize) -> Result<Vec<Post>, SocialError>;
}
