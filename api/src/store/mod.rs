//! Data access for the three TalkRoute entities.
//!
//! Handlers only see the repository traits, so the backing store can be
//! swapped without touching routing code. Engagement updates (votes, the
//! comment counter) must be single atomic operations in every
//! implementation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{
    comment::{Comment, NewComment},
    post::{NewPost, Post, VoteDirection},
    user::{NewUser, Role, User},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("You have already {0}d this post")]
    AlreadyVoted(VoteDirection),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Could not get a database connection: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, RepositoryError>;

    /// Posts having at least one tag that contains `query`, ignoring case.
    async fn search_posts_by_tag(&self, query: &str) -> Result<Vec<Post>, RepositoryError>;

    async fn find_post(&self, id: i32) -> Result<Option<Post>, RepositoryError>;

    async fn posts_by_author(&self, email: &str) -> Result<Vec<Post>, RepositoryError>;

    async fn insert_post(&self, post: NewPost) -> Result<i32, RepositoryError>;

    /// Number of deleted posts, zero when the id is unknown.
    async fn delete_post(&self, id: i32) -> Result<u64, RepositoryError>;

    /// Records a vote in one atomic update. The user is moved out of the
    /// opposite voter-set if present.
    async fn apply_vote(
        &self,
        post_id: i32,
        user_id: &str,
        direction: VoteDirection,
    ) -> Result<(), RepositoryError>;

    /// Returns how many posts were incremented (0 or 1).
    async fn increment_comment_count(&self, post_id: i32) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments newest first, optionally only those of one post.
    async fn list_comments(&self, post_id: Option<i32>) -> Result<Vec<Comment>, RepositoryError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<i32, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Inserts unless a user with the same email exists. `None` means nothing
    /// was inserted.
    async fn insert_user_if_absent(&self, user: NewUser) -> Result<Option<i32>, RepositoryError>;

    async fn set_role(&self, id: i32, role: Role) -> Result<UpdateResult, RepositoryError>;
}

pub trait Store: PostRepository + CommentRepository + UserRepository {}

impl<T> Store for T where T: PostRepository + CommentRepository + UserRepository {}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: i32,
}

impl InsertResult {
    pub fn new(inserted_id: i32) -> Self {
        InsertResult {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        UpdateResult {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}
