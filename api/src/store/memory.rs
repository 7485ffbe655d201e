use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{
    comment::{Comment, NewComment},
    post::{NewPost, Post, VoteDirection},
    user::{NewUser, Role, User},
};

use super::{
    CommentRepository, PostRepository, RepositoryError, UpdateResult, UserRepository,
};

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i32, Post>,
    comments: BTreeMap<i32, Comment>,
    users: BTreeMap<i32, User>,
    last_post_id: i32,
    last_comment_id: i32,
    last_user_id: i32,
}

/// Keeps everything in process memory. Every mutation happens under a single
/// write lock, which gives the same per-operation atomicity as the
/// conditional updates of the SQL store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.post_time.cmp(&a.post_time).then(b.id.cmp(&a.id)));
    posts
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.posts.values().cloned().collect()))
    }

    async fn search_posts_by_tag(&self, query: &str) -> Result<Vec<Post>, RepositoryError> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;

        let matching = tables
            .posts
            .values()
            .filter(|p| p.tags.iter().any(|t| t.to_lowercase().contains(&needle)))
            .cloned()
            .collect();

        Ok(newest_first(matching))
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, RepositoryError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn posts_by_author(&self, email: &str) -> Result<Vec<Post>, RepositoryError> {
        let tables = self.tables.read().await;

        let matching = tables
            .posts
            .values()
            .filter(|p| p.author_email == email)
            .cloned()
            .collect();

        Ok(newest_first(matching))
    }

    async fn insert_post(&self, post: NewPost) -> Result<i32, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.last_post_id += 1;
        let id = tables.last_post_id;
        tables.posts.insert(id, post.into_post(id));
        Ok(id)
    }

    async fn delete_post(&self, id: i32) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.remove(&id).map_or(0, |_| 1))
    }

    async fn apply_vote(
        &self,
        post_id: i32,
        user_id: &str,
        direction: VoteDirection,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;

        let post = tables
            .posts
            .get_mut(&post_id)
            .ok_or(RepositoryError::NotFound("Post"))?;

        if post.record_vote(user_id, direction) {
            Ok(())
        } else {
            Err(RepositoryError::AlreadyVoted(direction))
        }
    }

    async fn increment_comment_count(&self, post_id: i32) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;

        match tables.posts.get_mut(&post_id) {
            Some(post) => {
                post.comment_count += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_comments(&self, post_id: Option<i32>) -> Result<Vec<Comment>, RepositoryError> {
        let tables = self.tables.read().await;

        let mut rows: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| post_id.is_none_or(|id| c.post_id == id))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.comment_time
                .cmp(&a.comment_time)
                .then(b.id.cmp(&a.id))
        });

        Ok(rows)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<i32, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.last_comment_id += 1;
        let id = tables.last_comment_id;
        tables.comments.insert(id, comment.into_comment(id));
        Ok(id)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user_if_absent(&self, user: NewUser) -> Result<Option<i32>, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Ok(None);
        }

        tables.last_user_id += 1;
        let id = tables.last_user_id;
        tables.users.insert(id, user.into_user(id));
        Ok(Some(id))
    }

    async fn set_role(&self, id: i32, role: Role) -> Result<UpdateResult, RepositoryError> {
        let mut tables = self.tables.write().await;

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(UpdateResult::new(0, 0));
        };

        if user.role == role.as_str() {
            return Ok(UpdateResult::new(1, 0));
        }

        user.role = role.as_str().to_string();
        Ok(UpdateResult::new(1, 1))
    }
}
