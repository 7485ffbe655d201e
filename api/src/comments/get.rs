use axum::{
    Json,
    extract::{Path, State},
};

use crate::{App, error::AppError, models::comment::Comment, posts::parse_post_id};

pub async fn get_comments(State(ctx): State<App>) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(ctx.store.list_comments(None).await?))
}

pub async fn get_comments_for_post(
    State(ctx): State<App>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    Ok(Json(ctx.store.list_comments(Some(post_id)).await?))
}
