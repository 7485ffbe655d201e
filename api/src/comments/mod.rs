pub mod create;
pub mod get;
pub mod routes;

use crate::{
    models::comment::NewComment,
    store::{RepositoryError, Store},
};

/// Stores a comment and bumps the parent post's comment counter, matching
/// the post by id. The comment is kept even if the counter update fails.
pub async fn add_comment(store: &dyn Store, comment: NewComment) -> Result<i32, RepositoryError> {
    let post_id = comment.post_id;
    let comment_id = store.insert_comment(comment).await?;

    match store.increment_comment_count(post_id).await {
        Ok(0) => {
            tracing::warn!(post_id, comment_id, "comment stored for a post that does not exist");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(?e, post_id, comment_id, "failed to increment comment count");
        }
    }

    Ok(comment_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::post::NewPost,
        store::{CommentRepository, MemoryStore, PostRepository},
    };

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.into(),
            description: String::new(),
            tags: vec![],
            author_name: "Ann".into(),
            author_email: "ann@example.com".into(),
            author_image: None,
            post_time: chrono::Utc::now().naive_utc(),
        }
    }

    fn new_comment(post_id: i32, post_title: &str) -> NewComment {
        NewComment {
            post_id,
            post_title: post_title.into(),
            author_name: "Bob".into(),
            author_email: "bob@example.com".into(),
            content: "nice".into(),
            comment_time: chrono::Utc::now().naive_utc(),
        }
    }

    #[tokio::test]
    async fn counts_comments_by_post_id_not_title() {
        let store = MemoryStore::new();
        let first = store.insert_post(new_post("Same title")).await.unwrap();
        let second = store.insert_post(new_post("Same title")).await.unwrap();

        add_comment(&store, new_comment(second, "Same title"))
            .await
            .unwrap();
        add_comment(&store, new_comment(second, "Same title"))
            .await
            .unwrap();

        let first = store.find_post(first).await.unwrap().unwrap();
        let second = store.find_post(second).await.unwrap().unwrap();
        assert_eq!(first.comment_count, 0);
        assert_eq!(second.comment_count, 2);
    }

    #[tokio::test]
    async fn comment_persists_when_post_is_missing() {
        let store = MemoryStore::new();
        let id = add_comment(&store, new_comment(77, "gone")).await.unwrap();

        let comments = store.list_comments(Some(77)).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, id);
    }
}
