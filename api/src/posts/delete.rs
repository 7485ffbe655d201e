use axum::{
    Json,
    extract::{Path, State},
};

use crate::{App, error::AppError, store::DeleteResult};

use super::parse_post_id;

// Unknown ids are not an error, the result just reports nothing was deleted
pub async fn delete_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_post_id(&id)?;

    let deleted_count = ctx.store.delete_post(id).await?;
    if deleted_count > 0 {
        tracing::info!(post_id = id, "post deleted");
    }

    Ok(Json(DeleteResult {
        acknowledged: true,
        deleted_count,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::{create_post, send, test_app};

    #[tokio::test]
    async fn deleting_unknown_post_reports_zero() {
        let (router, _) = test_app();
        let (status, body) = send(&router, "DELETE", "/posts/987", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "acknowledged": true, "deletedCount": 0 }));
    }

    #[tokio::test]
    async fn deletes_existing_post() {
        let (router, _) = test_app();
        let id = create_post(&router, "bye", &["x"]).await;

        let (status, body) = send(&router, "DELETE", &format!("/posts/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deletedCount"], 1);

        let (status, _) = send(&router, "GET", &format!("/posts/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_rejects_malformed_id() {
        let (router, _) = test_app();
        let (status, _) = send(&router, "DELETE", "/posts/xyz", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
