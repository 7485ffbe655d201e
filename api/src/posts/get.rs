use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{App, error::AppError, models::post::Post};

use super::{PostRequestError, parse_post_id};

pub async fn get_posts(State(ctx): State<App>) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(ctx.store.list_posts().await?))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

pub async fn search_posts(
    State(ctx): State<App>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let query = q.query.as_deref().map(str::trim).unwrap_or_default();

    if query.is_empty() {
        return Ok(Json(ctx.store.list_posts().await?));
    }

    Ok(Json(ctx.store.search_posts_by_tag(query).await?))
}

pub async fn get_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id = parse_post_id(&id)?;

    let post = ctx
        .store
        .find_post(id)
        .await?
        .ok_or(PostRequestError::NotFound)?;

    Ok(Json(post))
}

pub async fn get_posts_by_author(
    State(ctx): State<App>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Post>>, AppError> {
    let email = crate::utils::normalize_email(&email);
    Ok(Json(ctx.store.posts_by_author(&email).await?))
}
