pub mod create;
pub mod delete;
pub mod get;
pub mod routes;
pub mod vote;

use axum::http::StatusCode;

use crate::error::ApiRequestError;

#[derive(thiserror::Error, Debug)]
pub enum PostRequestError {
    #[error("Invalid ID format")]
    InvalidId,

    #[error("Post not found")]
    NotFound,
}

impl ApiRequestError for PostRequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            PostRequestError::InvalidId => StatusCode::BAD_REQUEST,
            PostRequestError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Post ids are positive integers; anything else is rejected before it
/// reaches the store.
pub fn parse_post_id(raw: &str) -> Result<i32, PostRequestError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(PostRequestError::InvalidId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_ids() {
        assert_eq!(parse_post_id("42").unwrap(), 42);
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "abc", "-1", "0", "665f1c2e9b1e8a3d4c5b6a79", "99999999999"] {
            assert!(
                matches!(parse_post_id(raw), Err(PostRequestError::InvalidId)),
                "{raw} should be rejected"
            );
        }
    }
}
