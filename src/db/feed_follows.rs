use crate::models::feed::Feed;
use crate::models::feed_follow::FeedFollow;
use crate::schema::feed_follows;
use crate::schema::feeds;
use diesel::prelude::*;
use diesel::result::Error;

#[derive(Insertable)]
#[diesel(table_name = feed_follows)]
struct NewFeedFollow {
    user_id: i64,
    feed_id: i64,
}

pub fn create(conn: &mut PgConnection, user_id: i64, feed_id: i64) -> Result<FeedFollow, Error> {
    let new_feed_follow = NewFeedFollow { user_id, feed_id };

    diesel::insert_into(feed_follows::table)
        .values(new_feed_follow)
        .get_result::<FeedFollow>(conn)
}

pub fn delete(conn: &mut PgConnection, user_id: i64, feed_id: i64) -> Result<usize, Error> {
    let record_query = feed_follows::table
        .filter(feed_follows::user_id.eq(user_id))
        .filter(feed_follows::feed_id.eq(feed_id));

    diesel::delete(record_query).execute(conn)
}

pub fn feeds_for_user(conn: &mut PgConnection, user_id: i64) -> Result<Vec<Feed>, Error> {
    feed_follows::table
        .inner_join(feeds::table)
        .filter(feed_follows::user_id.eq(user_id))
        .order(feeds::name)
        .select(feeds::all_columns)
        .load::<Feed>(conn)
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::db::feeds;
    use crate::db::users;
    use diesel::connection::Connection;
    use diesel::result::Error;

    #[test]
    #[ignore]
    fn create_and_delete_follow() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            let user = users::create(connection, "ayrat".to_string()).unwrap();
            let feed = feeds::create(
                connection,
                "Blog".to_string(),
                "https://example.com/rss".to_string(),
                user.id,
            )
            .unwrap();

            let follow = super::create(connection, user.id, feed.id).unwrap();
            assert_eq!(follow.user_id, user.id);
            assert_eq!(follow.feed_id, feed.id);

            let followed = super::feeds_for_user(connection, user.id).unwrap();
            assert_eq!(followed.len(), 1);

            let deleted = super::delete(connection, user.id, feed.id).unwrap();
            assert_eq!(deleted, 1);

            let followed = super::feeds_for_user(connection, user.id).unwrap();
            assert!(followed.is_empty());

            Ok(())
        });
    }

    #[test]
    #[ignore]
    fn create_fails_on_duplicate_follow() {
        let mut connection = db::establish_test_connection();

        connection.test_transaction::<_, Error, _>(|connection| {
            let user = users::create(connection, "ayrat".to_string()).unwrap();
            let feed = feeds::create(
                connection,
                "Blog".to_string(),
                "https://example.com/rss".to_string(),
                user.id,
            )
            .unwrap();

            super::create(connection, user.id, feed.id).unwrap();

            let result = super::create(connection, user.id, feed.id);

            assert!(result.is_err());

            Ok(())
        });
    }
}
