use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    App,
    error::AppError,
    models::post::NewPost,
    store::InsertResult,
    utils::{normalize_email, tags_from_string_or_list},
};

pub async fn create_post(
    State(ctx): State<App>,
    crate::json::Json(mut post): crate::json::Json<PostSubmission>,
) -> Result<Json<InsertResult>, AppError> {
    post.validate()
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let new_post = NewPost {
        title: post.title,
        description: post.description,
        tags: post.tags,
        author_name: post.author_name,
        author_email: post.author_email,
        author_image: post.author_image,
        post_time: chrono::Utc::now().naive_utc(),
    };

    let id = ctx.store.insert_post(new_post).await?;
    tracing::info!(post_id = id, "post created");

    Ok(Json(InsertResult::new(id)))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostSubmission {
    title: String,
    #[serde(default, alias = "body")]
    description: String,
    #[serde(default, deserialize_with = "tags_from_string_or_list")]
    tags: Vec<String>,
    author_name: String,
    author_email: String,
    author_image: Option<String>,
}

impl PostSubmission {
    fn validate(&mut self) -> Result<(), &'static str> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err("No title provided");
        }

        if self.title.len() > 200 {
            return Err("Title too long (max 200 characters)");
        }

        self.description = self.description.trim().to_string();
        if self.description.len() > 10000 {
            return Err("Description too long (max 10000 characters)");
        }

        self.author_name = self.author_name.trim().to_string();
        if self.author_name.is_empty() {
            return Err("No author name provided");
        }

        self.author_email = normalize_email(&self.author_email);
        if self.author_email.is_empty() {
            return Err("No email provided");
        }

        if !self.author_email.contains('@') {
            return Err("Invalid email");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        store::PostRepository,
        test_utils::{send, test_app},
    };

    #[tokio::test]
    async fn created_post_has_server_set_fields() {
        let (router, store) = test_app();
        let (status, body) = send(
            &router,
            "POST",
            "/posts",
            Some(json!({
                "title": "  First post ",
                "body": "hello",
                "tags": "rust,web",
                "authorName": "Ann",
                "authorEmail": "Ann@Example.com",
                "commentCount": 99,
                "upVote": 1000,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["acknowledged"], true);

        let id = body["insertedId"].as_i64().unwrap() as i32;
        let post = store.find_post(id).await.unwrap().unwrap();
        assert_eq!(post.title, "First post");
        assert_eq!(post.description, "hello");
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert_eq!(post.author_email, "ann@example.com");
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.up_vote, 0);
    }

    #[tokio::test]
    async fn rejects_post_without_title() {
        let (router, _) = test_app();
        let (status, body) = send(
            &router,
            "POST",
            "/posts",
            Some(json!({
                "title": "   ",
                "authorName": "Ann",
                "authorEmail": "ann@example.com",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["msg"], "No title provided");
    }

    #[tokio::test]
    async fn malformed_body_is_unprocessable() {
        let (router, _) = test_app();
        let (status, _) = send(&router, "POST", "/posts", Some(json!({ "title": 5 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
