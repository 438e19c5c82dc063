use crate::schema::posts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Debug, Clone, Eq, PartialEq)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub link: String,

    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
