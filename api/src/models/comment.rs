use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub post_title: String,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub comment_time: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub post_id: i32,
    pub post_title: String,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub comment_time: NaiveDateTime,
}

impl NewComment {
    pub fn into_comment(self, id: i32) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            post_title: self.post_title,
            author_name: self.author_name,
            author_email: self.author_email,
            content: self.content,
            comment_time: self.comment_time,
        }
    }
}
