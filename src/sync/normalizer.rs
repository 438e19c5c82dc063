use crate::db;
use crate::db::posts::NewPost;
use crate::sync::reader::FetchedFeedItem;
use chrono::{DateTime, Utc};

/// Maps a fetched item to a storable post. This never fails: an unparseable
/// publication date becomes `None` instead of dropping the item, and an
/// omitted description is recorded as an empty one.
pub fn normalize_item(feed_id: i64, item: FetchedFeedItem) -> NewPost {
    let published_at = item.pub_date.as_deref().and_then(parse_publication_date);

    NewPost {
        feed_id,
        title: item.title,
        description: Some(item.description.unwrap_or_default()),
        link: item.link,
        published_at,
        created_at: db::current_time(),
        updated_at: db::current_time(),
    }
}

// RFC 2822 covers the RFC-1123-with-numeric-zone dates RSS feeds carry,
// e.g. "Mon, 02 Jan 2006 15:04:05 -0700".
fn parse_publication_date(raw_date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw_date)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
