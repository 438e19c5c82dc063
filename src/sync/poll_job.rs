use crate::sync::normalizer;
use crate::sync::reader::{FetchError, ReadFeed};
use crate::sync::store::{IngestionStore, SelectionError};
use log::error;
use log::info;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CycleError {
    Selection(SelectionError),
    Fetch(FetchError),
}

/// One fetch-parse-store cycle for exactly one feed. The order matters:
/// the feed is marked fetched before the network call, and an item-level
/// store error never aborts the rest of the document.
pub struct PollJob;

impl PollJob {
    pub fn new() -> Self {
        PollJob
    }

    pub fn execute(
        &self,
        store: &mut dyn IngestionStore,
        reader: &dyn ReadFeed,
    ) -> Result<(), CycleError> {
        let feed = store
            .next_feed_to_fetch()
            .map_err(CycleError::Selection)?;

        let feed = store
            .mark_fetched(feed.id)
            .map_err(CycleError::Selection)?;

        let fetched_feed = reader.read(&feed.link).map_err(CycleError::Fetch)?;

        let found_posts = fetched_feed.items.len();

        for item in fetched_feed.items {
            let new_post = normalizer::normalize_item(feed.id, item);

            if let Err(err) = store.insert_post(new_post) {
                error!(
                    "Couldn't create a post for feed with id {}: {:?}",
                    feed.id, err
                );
            }
        }

        info!("Feed {} collected, {} posts found", feed.name, found_posts);

        Ok(())
    }
}

impl Default for PollJob {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{CycleError, PollJob};
    use crate::db;
    use crate::models::feed::Feed;
    use crate::sync::reader::{FetchError, FetchedFeed, FetchedFeedItem, MockReadFeed};
    use crate::sync::store::{
        InsertOutcome, MockIngestionStore, SelectionError, StoreWriteError,
    };
    use mockall::Sequence;

    fn feed() -> Feed {
        Feed {
            id: 1,
            name: "Blog".to_string(),
            link: "https://example.com/rss".to_string(),
            user_id: 1,
            last_fetched_at: None,
            created_at: db::current_time(),
            updated_at: db::current_time(),
        }
    }

    fn fetched_feed(item_count: usize) -> FetchedFeed {
        let items = (0..item_count)
            .map(|number| FetchedFeedItem {
                title: format!("Post {number}"),
                description: Some("Description".to_string()),
                link: format!("https://example.com/posts/{number}"),
                pub_date: Some("Mon, 02 Jan 2006 15:04:05 -0700".to_string()),
            })
            .collect();

        FetchedFeed {
            title: "Blog".to_string(),
            description: "Description".to_string(),
            items,
        }
    }

    #[test]
    fn execute_stores_every_item_of_a_fetched_feed() {
        let mut store = MockIngestionStore::new();
        let mut reader = MockReadFeed::new();

        let selected_feed = feed();

        store
            .expect_next_feed_to_fetch()
            .times(1)
            .return_once(move || Ok(selected_feed));

        let marked_feed = feed();
        store
            .expect_mark_fetched()
            .withf(|feed_id| *feed_id == 1)
            .times(1)
            .return_once(move |_| Ok(marked_feed));

        reader
            .expect_read()
            .withf(|url| url == "https://example.com/rss")
            .times(1)
            .return_once(|_| Ok(fetched_feed(2)));

        store
            .expect_insert_post()
            .times(2)
            .returning(|_| Ok(InsertOutcome::Created));

        let result = PollJob::new().execute(&mut store, &reader);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn execute_marks_the_feed_fetched_before_reading_it() {
        let mut store = MockIngestionStore::new();
        let mut reader = MockReadFeed::new();
        let mut sequence = Sequence::new();

        let selected_feed = feed();
        store
            .expect_next_feed_to_fetch()
            .times(1)
            .in_sequence(&mut sequence)
            .return_once(move || Ok(selected_feed));

        let marked_feed = feed();
        store
            .expect_mark_fetched()
            .times(1)
            .in_sequence(&mut sequence)
            .return_once(move |_| Ok(marked_feed));

        // The fetch fails, but last_fetched_at was already bumped: the feed
        // is skipped until its next round-robin turn
        reader
            .expect_read()
            .times(1)
            .in_sequence(&mut sequence)
            .return_once(|_| Err(FetchError::HttpStatus { status: 500 }));

        let result = PollJob::new().execute(&mut store, &reader);

        assert_eq!(
            result,
            Err(CycleError::Fetch(FetchError::HttpStatus { status: 500 }))
        );
    }

    #[test]
    fn execute_continues_past_an_item_level_store_error() {
        let mut store = MockIngestionStore::new();
        let mut reader = MockReadFeed::new();

        let selected_feed = feed();
        store
            .expect_next_feed_to_fetch()
            .times(1)
            .return_once(move || Ok(selected_feed));

        let marked_feed = feed();
        store
            .expect_mark_fetched()
            .times(1)
            .return_once(move |_| Ok(marked_feed));

        reader
            .expect_read()
            .times(1)
            .return_once(|_| Ok(fetched_feed(3)));

        let mut insert_calls = 0;
        store
            .expect_insert_post()
            .times(3)
            .returning(move |_| {
                insert_calls += 1;

                if insert_calls == 2 {
                    Err(StoreWriteError {
                        msg: "constraint violation".to_string(),
                    })
                } else {
                    Ok(InsertOutcome::Created)
                }
            });

        let result = PollJob::new().execute(&mut store, &reader);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn execute_treats_duplicates_as_a_no_op() {
        let mut store = MockIngestionStore::new();
        let mut reader = MockReadFeed::new();

        let selected_feed = feed();
        store
            .expect_next_feed_to_fetch()
            .times(1)
            .return_once(move || Ok(selected_feed));

        let marked_feed = feed();
        store
            .expect_mark_fetched()
            .times(1)
            .return_once(move |_| Ok(marked_feed));

        reader
            .expect_read()
            .times(1)
            .return_once(|_| Ok(fetched_feed(2)));

        store
            .expect_insert_post()
            .times(2)
            .returning(|_| Ok(InsertOutcome::DuplicateIgnored));

        let result = PollJob::new().execute(&mut store, &reader);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn execute_ends_the_cycle_when_no_feed_is_available() {
        let mut store = MockIngestionStore::new();
        let reader = MockReadFeed::new();

        store
            .expect_next_feed_to_fetch()
            .times(1)
            .return_once(|| Err(SelectionError::NotFound));

        let result = PollJob::new().execute(&mut store, &reader);

        assert_eq!(
            result,
            Err(CycleError::Selection(SelectionError::NotFound))
        );
    }

    #[test]
    fn execute_normalizes_items_into_posts() {
        let mut store = MockIngestionStore::new();
        let mut reader = MockReadFeed::new();

        let selected_feed = feed();
        store
            .expect_next_feed_to_fetch()
            .times(1)
            .return_once(move || Ok(selected_feed));

        let marked_feed = feed();
        store
            .expect_mark_fetched()
            .times(1)
            .return_once(move |_| Ok(marked_feed));

        reader.expect_read().times(1).return_once(|_| {
            Ok(FetchedFeed {
                title: "Blog".to_string(),
                description: "Description".to_string(),
                items: vec![FetchedFeedItem {
                    title: "Undated".to_string(),
                    description: None,
                    link: "https://example.com/posts/undated".to_string(),
                    pub_date: Some("not a real date".to_string()),
                }],
            })
        });

        store
            .expect_insert_post()
            .withf(|post| {
                post.feed_id == 1
                    && post.title == "Undated"
                    && post.description == Some("".to_string())
                    && post.published_at.is_none()
            })
            .times(1)
            .returning(|_| Ok(InsertOutcome::Created));

        let result = PollJob::new().execute(&mut store, &reader);

        assert_eq!(result, Ok(()));
    }
}
