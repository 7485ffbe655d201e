use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    App,
    error::AppError,
    models::post::VoteDirection,
    store::{Store, UpdateResult},
};

use super::parse_post_id;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    user_id: String,
}

pub async fn upvote_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
    crate::json::Json(vote): crate::json::Json<VoteSubmission>,
) -> Result<Json<UpdateResult>, AppError> {
    apply_vote(ctx.store.as_ref(), &id, &vote.user_id, VoteDirection::Up).await
}

pub async fn downvote_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
    crate::json::Json(vote): crate::json::Json<VoteSubmission>,
) -> Result<Json<UpdateResult>, AppError> {
    apply_vote(ctx.store.as_ref(), &id, &vote.user_id, VoteDirection::Down).await
}

async fn apply_vote(
    store: &dyn Store,
    raw_id: &str,
    user_id: &str,
    direction: VoteDirection,
) -> Result<Json<UpdateResult>, AppError> {
    let post_id = parse_post_id(raw_id)?;

    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(("No user id provided", StatusCode::BAD_REQUEST))?;
    }

    store.apply_vote(post_id, user_id, direction).await?;
    tracing::debug!(post_id, user_id, %direction, "vote recorded");

    Ok(Json(UpdateResult::new(1, 1)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        store::PostRepository,
        test_utils::{create_post, send, test_app},
    };

    #[tokio::test]
    async fn second_upvote_is_rejected_and_count_unchanged() {
        let (router, store) = test_app();
        let id = create_post(&router, "vote me", &[]).await;
        let uri = format!("/posts/{id}/upvote");

        let (status, body) = send(&router, "POST", &uri, Some(json!({ "userId": "u1" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modifiedCount"], 1);

        let (status, body) = send(&router, "POST", &uri, Some(json!({ "userId": "u1" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["msg"], "You have already upvoted this post");

        let post = store.find_post(id).await.unwrap().unwrap();
        assert_eq!(post.up_vote, 1);
        assert_eq!(post.up_voters, vec!["u1"]);
    }

    #[tokio::test]
    async fn downvote_after_upvote_switches_the_vote() {
        let (router, store) = test_app();
        let id = create_post(&router, "switch", &[]).await;

        send(
            &router,
            "POST",
            &format!("/posts/{id}/upvote"),
            Some(json!({ "userId": "u1" })),
        )
        .await;
        let (status, _) = send(
            &router,
            "POST",
            &format!("/posts/{id}/downvote"),
            Some(json!({ "userId": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let post = store.find_post(id).await.unwrap().unwrap();
        assert_eq!((post.up_vote, post.down_vote), (0, 1));
        assert!(post.up_voters.is_empty());
        assert_eq!(post.down_voters, vec!["u1"]);
    }

    #[tokio::test]
    async fn vote_on_unknown_post_is_not_found() {
        let (router, _) = test_app();
        let (status, _) = send(
            &router,
            "POST",
            "/posts/404/downvote",
            Some(json!({ "userId": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn vote_requires_user_id() {
        let (router, _) = test_app();
        let id = create_post(&router, "anon", &[]).await;
        let (status, _) = send(
            &router,
            "POST",
            &format!("/posts/{id}/upvote"),
            Some(json!({ "userId": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
