//! Social platform collaborators.
//!
//! The poll loop talks to the platform through two narrow traits so tests can
//! substitute stubs:
//!
//! - [`Inbox`]: newest mentions of the bot account and replying to them.
//! - [`UserContent`]: a user's most recent comments.
//!
//! [`RedditClient`] implements both against the Reddit OAuth API.

pub mod reddit;

pub use reddit::RedditClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PlatformError;

/// A single inbox notification where the bot account was mentioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Platform identifier used to address the reply (e.g. `t1_k3x9a`).
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A piece of text the user wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Access to the bot account's mention inbox.
#[async_trait]
pub trait Inbox: Send + Sync {
    /// Newest mentions first, at most `limit`.
    async fn latest_mentions(&self, limit: usize) -> Result<Vec<Mention>, PlatformError>;

    /// Post `text` as a reply to `mention`.
    async fn reply(&self, mention: &Mention, text: &str) -> Result<(), PlatformError>;
}

/// Access to a user's public contributions.
#[async_trait]
pub trait UserContent: Send + Sync {
    /// Newest comments first, at most `limit`.
    async fn recent_comments(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<Comment>, PlatformError>;
}
