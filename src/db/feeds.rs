use crate::db;
use crate::models::feed::Feed;
use crate::schema::feeds;
use crate::schema::users;
use diesel::prelude::*;
use diesel::result::Error;

#[derive(Insertable)]
#[diesel(table_name = feeds)]
struct NewFeed {
    name: String,
    link: String,
    user_id: i64,
}

pub fn create(
    conn: &mut PgConnection,
    name: String,
    link: String,
    user_id: i64,
) -> Result<Feed, Error> {
    let new_feed = NewFeed {
        name: name.trim().to_string(),
        link: link.trim().to_string(),
        user_id,
    };

    diesel::insert_into(feeds::table)
        .values(new_feed)
        .get_result::<Feed>(conn)
}

pub fn find_by_link(conn: &mut PgConnection, link: &str) -> Option<Feed> {
    match feeds::table
        .filter(feeds::link.eq(link))
        .first::<Feed>(conn)
    {
        Ok(record) => Some(record),
        _ => None,
    }
}

/// The least-recently-fetched feed comes first, feeds that were never
/// fetched before all of them. Ties break on id so the order is stable.
pub fn next_to_fetch(conn: &mut PgConnection) -> Result<Feed, Error> {
    feeds::table
        .order((feeds::last_fetched_at.asc().nulls_first(), feeds::id.asc()))
        .first::<Feed>(conn)
}

pub fn mark_fetched(conn: &mut PgConnection, feed_id: i64) -> Result<Feed, Error> {
    diesel::update(feeds::table.filter(feeds::id.eq(feed_id)))
        .set((
            feeds::last_fetched_at.eq(db::current_time()),
            feeds::updated_at.eq(db::current_time()),
        ))
        .get_result::<Feed>(conn)
}

pub fn all_with_owners(conn: &mut PgConnection) -> Result<Vec<(Feed, String)>, Error> {
    feeds::table
        .inner_join(users::table)
        .order(feeds::id)
        .select((feeds::all_columns, users::name))
        .load::<(Feed, String)>(conn)
}
