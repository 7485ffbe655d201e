use axum::{Router, routing::get};

use crate::App;

use super::{
    create::create_comment,
    get::{get_comments, get_comments_for_post},
};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/comments", get(get_comments).post(create_comment))
        .route("/comments/post/{post_id}", get(get_comments_for_post))
}
