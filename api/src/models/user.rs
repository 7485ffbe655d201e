use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl NewUser {
    pub fn new(name: String, email: String, photo: Option<String>) -> Self {
        NewUser {
            name,
            email,
            photo,
            role: Role::User.as_str().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn into_user(self, id: i32) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            photo: self.photo,
            role: self.role,
            created_at: self.created_at,
        }
    }
}
