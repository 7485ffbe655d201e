use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use diesel_async::{
    AsyncPgConnection, RunQueryDsl,
    pooled_connection::{AsyncDieselConnectionManager, deadpool::Pool},
};

use crate::{
    models::{
        comment::{Comment, NewComment},
        post::{NewPost, Post, VoteDirection},
        user::{NewUser, Role, User},
    },
    schema::{comments, posts, users},
    utils::like_pattern,
};

use super::{
    CommentRepository, PostRepository, RepositoryError, UpdateResult, UserRepository,
};

pub type DbPool = Pool<AsyncPgConnection>;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn connect(database_url: &str, max_size: usize) -> Result<Self, eyre::Error> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager).max_size(max_size).build()?;
        Ok(PgStore { pool })
    }

    /// Round trip to the database so a bad `DATABASE_URL` fails at startup
    /// instead of on the first request.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn list_posts(&self) -> Result<Vec<Post>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let rows = posts::table
            .select(Post::as_select())
            .order(posts::post_time.desc())
            .load(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn search_posts_by_tag(&self, query: &str) -> Result<Vec<Post>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::sql_query(
            "
            SELECT * FROM posts
            WHERE EXISTS (
                SELECT 1 FROM unnest(posts.tags) AS tag WHERE tag ILIKE $1
            )
            ORDER BY post_time DESC;
            ",
        )
        .bind::<Text, _>(like_pattern(query))
        .load::<Post>(&mut conn)
        .await?;

        Ok(rows)
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let post = posts::table
            .find(id)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(post)
    }

    async fn posts_by_author(&self, email: &str) -> Result<Vec<Post>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let rows = posts::table
            .filter(posts::author_email.eq(email))
            .select(Post::as_select())
            .order(posts::post_time.desc())
            .load(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn insert_post(&self, post: NewPost) -> Result<i32, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let id = diesel::insert_into(posts::table)
            .values(&post)
            .returning(posts::id)
            .get_result::<i32>(&mut conn)
            .await?;

        Ok(id)
    }

    async fn delete_post(&self, id: i32) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(posts::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(deleted as u64)
    }

    async fn apply_vote(
        &self,
        post_id: i32,
        user_id: &str,
        direction: VoteDirection,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;

        let (counter, voters) = direction.columns();
        let (opposite_counter, opposite_voters) = direction.opposite().columns();

        // Every SET expression sees the row as it was before the update, so
        // the CASE below checks the opposite set prior to the removal.
        let sql = format!(
            "
            UPDATE posts SET
                {counter} = {counter} + 1,
                {voters} = array_append({voters}, $2),
                {opposite_counter} = {opposite_counter}
                    - CASE WHEN $2 = ANY({opposite_voters}) THEN 1 ELSE 0 END,
                {opposite_voters} = array_remove({opposite_voters}, $2)
            WHERE id = $1 AND NOT ($2 = ANY({voters}));
            "
        );

        let updated = diesel::sql_query(sql)
            .bind::<Integer, _>(post_id)
            .bind::<Text, _>(user_id)
            .execute(&mut conn)
            .await?;

        if updated > 0 {
            return Ok(());
        }

        let exists = diesel::select(diesel::dsl::exists(posts::table.find(post_id)))
            .get_result::<bool>(&mut conn)
            .await?;

        if exists {
            Err(RepositoryError::AlreadyVoted(direction))
        } else {
            Err(RepositoryError::NotFound("Post"))
        }
    }

    async fn increment_comment_count(&self, post_id: i32) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(posts::table.find(post_id))
            .set(posts::comment_count.eq(posts::comment_count + 1))
            .execute(&mut conn)
            .await?;

        Ok(updated as u64)
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn list_comments(&self, post_id: Option<i32>) -> Result<Vec<Comment>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = comments::table
            .select(Comment::as_select())
            .order(comments::comment_time.desc())
            .into_boxed();

        if let Some(post_id) = post_id {
            query = query.filter(comments::post_id.eq(post_id));
        }

        let rows = query.load::<Comment>(&mut conn).await?;

        Ok(rows)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<i32, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let id = diesel::insert_into(comments::table)
            .values(&comment)
            .returning(comments::id)
            .get_result::<i32>(&mut conn)
            .await?;

        Ok(id)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let rows = users::table
            .select(User::as_select())
            .order(users::id.asc())
            .load(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }

    async fn insert_user_if_absent(&self, user: NewUser) -> Result<Option<i32>, RepositoryError> {
        let mut conn = self.pool.get().await?;

        // The unique index on email settles concurrent registrations
        let id = diesel::insert_into(users::table)
            .values(&user)
            .on_conflict(users::email)
            .do_nothing()
            .returning(users::id)
            .get_result::<i32>(&mut conn)
            .await
            .optional()?;

        Ok(id)
    }

    async fn set_role(&self, id: i32, role: Role) -> Result<UpdateResult, RepositoryError> {
        let mut conn = self.pool.get().await?;

        let matched = diesel::select(diesel::dsl::exists(users::table.find(id)))
            .get_result::<bool>(&mut conn)
            .await?;

        let modified = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::role.ne(role.as_str())),
        )
        .set(users::role.eq(role.as_str()))
        .execute(&mut conn)
        .await?;

        Ok(UpdateResult::new(matched as u64, modified as u64))
    }
}
