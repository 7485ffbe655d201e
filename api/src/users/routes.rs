use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    App,
    error::AppError,
    models::user::{NewUser, Role, User},
    store::{InsertResult, UpdateResult},
    utils::normalize_email,
};

use super::{Registration, register_user};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/users", get(get_users).post(create_user))
        // GET takes an email, PATCH takes a user id
        .route("/users/admin/{target}", get(is_admin).patch(make_admin))
}

async fn get_users(State(ctx): State<App>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(ctx.store.list_users().await?))
}

#[derive(Deserialize, Debug)]
pub struct UserSubmission {
    #[serde(default)]
    name: String,
    email: String,
    photo: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AlreadyRegistered {
    message: &'static str,
    inserted_id: Option<i32>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum RegistrationResponse {
    Created(InsertResult),
    Noop(AlreadyRegistered),
}

async fn create_user(
    State(ctx): State<App>,
    crate::json::Json(user): crate::json::Json<UserSubmission>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let email = normalize_email(&user.email);
    if !email.contains('@') {
        return Err(("Invalid email", StatusCode::BAD_REQUEST))?;
    }

    let new_user = NewUser::new(user.name.trim().to_string(), email, user.photo);

    let response = match register_user(ctx.store.as_ref(), new_user).await? {
        Registration::Created(id) => {
            tracing::info!(user_id = id, "user registered");
            RegistrationResponse::Created(InsertResult::new(id))
        }
        Registration::AlreadyExists => RegistrationResponse::Noop(AlreadyRegistered {
            message: "user already exists",
            inserted_id: None,
        }),
    };

    Ok(Json(response))
}

#[derive(Serialize, Debug)]
pub struct AdminStatus {
    admin: bool,
}

async fn is_admin(
    State(ctx): State<App>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    let user = ctx
        .store
        .find_user_by_email(&normalize_email(&email))
        .await?;

    Ok(Json(AdminStatus {
        admin: user.is_some_and(|u| u.is_admin()),
    }))
}

async fn make_admin(
    State(ctx): State<App>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, AppError> {
    let id = id
        .trim()
        .parse::<i32>()
        .map_err(|_| ("Invalid ID format", StatusCode::BAD_REQUEST))?;

    let result = ctx.store.set_role(id, Role::Admin).await?;
    if result.modified_count > 0 {
        tracing::info!(user_id = id, "user promoted to admin");
    }

    Ok(Json(result))
}
