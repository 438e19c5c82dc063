use crate::models::post::Post;
use crate::schema::feed_follows;
use crate::schema::feeds;
use crate::schema::posts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error;

#[derive(Insertable, Debug, Clone, Eq, PartialEq)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub feed_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `(feed_id, link)` conflict means the post was already ingested on an
/// earlier cycle. `ON CONFLICT DO NOTHING` returns no row in that case, so
/// `None` here stands for "duplicate, nothing written".
pub fn create(conn: &mut PgConnection, new_post: &NewPost) -> Result<Option<Post>, Error> {
    diesel::insert_into(posts::table)
        .values(new_post)
        .on_conflict((posts::feed_id, posts::link))
        .do_nothing()
        .get_result::<Post>(conn)
        .optional()
}

pub fn find_for_user(
    conn: &mut PgConnection,
    user_id: i64,
    limit: i64,
) -> Result<Vec<(Post, String)>, Error> {
    posts::table
        .inner_join(feeds::table.inner_join(feed_follows::table))
        .filter(feed_follows::user_id.eq(user_id))
        .order(posts::published_at.desc().nulls_last())
        .limit(limit)
        .select((posts::all_columns, feeds::name))
        .load::<(Post, String)>(conn)
}
