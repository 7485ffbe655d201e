use axum::{
    Router,
    routing::{get, post},
};

use crate::App;

use super::{
    create::create_post,
    delete::delete_post,
    get::{get_post, get_posts, get_posts_by_author, search_posts},
    vote::{downvote_post, upvote_post},
};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/posts", get(get_posts).post(create_post))
        .route("/posts/search", get(search_posts))
        .route("/posts/user/{email}", get(get_posts_by_author))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/upvote", post(upvote_post))
        .route("/posts/{id}/downvote", post(downvote_post))
}
