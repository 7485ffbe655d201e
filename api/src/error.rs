#[cfg(debug_assertions)]
use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
#[cfg(debug_assertions)]
use serde_json::Value;

use crate::store::RepositoryError;

/// Errors caused by the request itself. They are reported to the client with
/// their message and status code.
pub trait ApiRequestError: std::error::Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug)]
pub enum ServerError {
    DatabaseError(diesel::result::Error),
    PoolError(diesel_async::pooled_connection::deadpool::PoolError),
    UpstreamError(reqwest::Error),
}

impl Serialize for ServerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;
        let message = match self {
            ServerError::DatabaseError(e) => e.to_string(),
            ServerError::PoolError(e) => e.to_string(),
            ServerError::UpstreamError(e) => e.to_string(),
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("message", &message)?;
        map.end()
    }
}

impl ServerError {
    fn public_message(&self) -> &'static str {
        match self {
            ServerError::DatabaseError(_) | ServerError::PoolError(_) => "Database error",
            ServerError::UpstreamError(_) => "Upstream service error",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    ServerError {
        error: ServerError,

        #[cfg(debug_assertions)]
        backtrace: backtrace::Backtrace,
    },
    RequestError {
        msg: String,
        status: StatusCode,
    },
    Unhandled(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

impl AppError {
    fn server(error: ServerError) -> Self {
        AppError::ServerError {
            error,
            #[cfg(debug_assertions)]
            backtrace: backtrace::Backtrace::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::ServerError {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(?error, "request failed with server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    #[cfg(debug_assertions)]
                    {
                        let frames_info = filter_backtrace(&backtrace);
                        ErrorResponse {
                            code: "SERVER_ERR".into(),
                            msg: Some(error.public_message().into()),
                            debug_info: Some(HashMap::from([
                                (
                                    "backtrace",
                                    serde_json::to_value(&frames_info).unwrap_or_default(),
                                ),
                                ("error", serde_json::to_value(&error).unwrap_or_default()),
                            ])),
                        }
                    },
                    #[cfg(not(debug_assertions))]
                    ErrorResponse {
                        code: "SERVER_ERR".into(),
                        msg: Some(error.public_message().into()),
                    },
                )
            }
            AppError::RequestError { msg, status } => (
                status,
                ErrorResponse {
                    code: "ERR".into(),
                    msg: Some(msg),
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
            AppError::Unhandled(e) => {
                tracing::error!(error = %e, "unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        code: "ERR".into(),
                        msg: Some(e),
                        #[cfg(debug_assertions)]
                        debug_info: None,
                    },
                )
            }
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: ApiRequestError,
{
    fn from(e: E) -> Self {
        AppError::RequestError {
            msg: e.to_string(),
            status: e.status_code(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(_) => AppError::RequestError {
                msg: e.to_string(),
                status: StatusCode::NOT_FOUND,
            },
            RepositoryError::AlreadyVoted(_) => AppError::RequestError {
                msg: e.to_string(),
                status: StatusCode::BAD_REQUEST,
            },
            RepositoryError::Database(e) => AppError::server(ServerError::DatabaseError(e)),
            RepositoryError::Pool(e) => AppError::server(ServerError::PoolError(e)),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::server(ServerError::UpstreamError(e))
    }
}

impl From<&'static str> for AppError {
    fn from(e: &'static str) -> Self {
        AppError::Unhandled(e.into())
    }
}

impl From<(&'static str, StatusCode)> for AppError {
    fn from((msg, status): (&'static str, StatusCode)) -> Self {
        AppError::RequestError {
            msg: msg.into(),
            status,
        }
    }
}

impl From<(String, StatusCode)> for AppError {
    fn from((msg, status): (String, StatusCode)) -> Self {
        AppError::RequestError { msg, status }
    }
}

#[cfg(debug_assertions)]
#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

#[cfg(debug_assertions)]
fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_PKG_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::VoteDirection;

    #[test]
    fn repository_errors_map_to_request_statuses() {
        let not_found: AppError = RepositoryError::NotFound("Post").into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let voted: AppError = RepositoryError::AlreadyVoted(VoteDirection::Up).into();
        assert_eq!(voted.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_are_server_errors() {
        let e: AppError = RepositoryError::Database(diesel::result::Error::NotFound).into();
        assert_eq!(
            e.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
