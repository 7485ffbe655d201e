use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    App, error::AppError, models::comment::NewComment, store::InsertResult,
    utils::normalize_email,
};

use super::add_comment;

pub async fn create_comment(
    State(ctx): State<App>,
    crate::json::Json(mut comment): crate::json::Json<CommentSubmission>,
) -> Result<Json<InsertResult>, AppError> {
    comment
        .validate()
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let new_comment = NewComment {
        post_id: comment.post_id,
        post_title: comment.post_title,
        author_name: comment.author_name,
        author_email: comment.author_email,
        content: comment.content,
        comment_time: chrono::Utc::now().naive_utc(),
    };

    let id = add_comment(ctx.store.as_ref(), new_comment).await?;

    Ok(Json(InsertResult::new(id)))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmission {
    post_id: i32,
    #[serde(default)]
    post_title: String,
    author_name: String,
    author_email: String,
    content: String,
}

impl CommentSubmission {
    fn validate(&mut self) -> Result<(), &'static str> {
        if self.post_id <= 0 {
            return Err("Invalid post id");
        }

        self.author_name = self.author_name.trim().to_string();
        if self.author_name.is_empty() {
            return Err("No author name provided");
        }

        if self.author_name.len() > 50 {
            return Err("Author name too long");
        }

        self.author_email = normalize_email(&self.author_email);
        if !self.author_email.contains('@') {
            return Err("Invalid email");
        }

        self.content = self.content.trim().to_string();
        if self.content.len() > 5000 {
            return Err("Content too long (max 5000 characters)");
        }

        if self.content.is_empty() {
            return Err("No content provided");
        }

        self.post_title = self.post_title.trim().to_string();

        Ok(())
    }
}
