use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, QueryableByName, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_image: Option<String>,
    pub post_time: NaiveDateTime,
    pub up_vote: i64,
    pub down_vote: i64,
    pub up_voters: Vec<String>,
    pub down_voters: Vec<String>,
    pub comment_count: i64,
}

// Counters and voter-sets are left to the column defaults
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_image: Option<String>,
    pub post_time: NaiveDateTime,
}

impl NewPost {
    /// Materializes a fresh post with zeroed engagement, the way the database
    /// defaults would.
    pub fn into_post(self, id: i32) -> Post {
        Post {
            id,
            title: self.title,
            description: self.description,
            tags: self.tags,
            author_name: self.author_name,
            author_email: self.author_email,
            author_image: self.author_image,
            post_time: self.post_time,
            up_vote: 0,
            down_vote: 0,
            up_voters: vec![],
            down_voters: vec![],
            comment_count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "upvote",
            VoteDirection::Down => "downvote",
        }
    }

    pub fn opposite(&self) -> VoteDirection {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }

    /// The (counter, voter-set) column pair this direction writes to.
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            VoteDirection::Up => ("up_vote", "up_voters"),
            VoteDirection::Down => ("down_vote", "down_voters"),
        }
    }
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Post {
    pub fn voters(&self, direction: VoteDirection) -> &Vec<String> {
        match direction {
            VoteDirection::Up => &self.up_voters,
            VoteDirection::Down => &self.down_voters,
        }
    }

    /// In-process equivalent of the conditional vote update. Returns false
    /// when the user already voted in this direction.
    pub fn record_vote(&mut self, user_id: &str, direction: VoteDirection) -> bool {
        if self.voters(direction).iter().any(|v| v == user_id) {
            return false;
        }

        let (counter, voters, opposite_counter, opposite_voters) = match direction {
            VoteDirection::Up => (
                &mut self.up_vote,
                &mut self.up_voters,
                &mut self.down_vote,
                &mut self.down_voters,
            ),
            VoteDirection::Down => (
                &mut self.down_vote,
                &mut self.down_voters,
                &mut self.up_vote,
                &mut self.up_voters,
            ),
        };

        *counter += 1;
        voters.push(user_id.to_string());

        let before = opposite_voters.len();
        opposite_voters.retain(|v| v != user_id);
        if opposite_voters.len() != before {
            *opposite_counter -= 1;
        }

        true
    }
}
