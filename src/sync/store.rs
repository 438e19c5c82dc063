use crate::db;
use crate::db::feeds;
use crate::db::posts;
use crate::db::posts::NewPost;
use crate::models::feed::Feed;
use diesel::result::Error;
use mockall::automock;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SelectionError {
    NotFound,
    Store { msg: String },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StoreWriteError {
    pub msg: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InsertOutcome {
    Created,
    DuplicateIgnored,
}

/// The persistence contract the poll cycle runs against. `mark_fetched` is
/// called before the network fetch, so a feed that hangs or errors mid-fetch
/// waits for its next round-robin turn instead of starving the others.
#[automock]
pub trait IngestionStore {
    fn next_feed_to_fetch(&mut self) -> Result<Feed, SelectionError>;

    fn mark_fetched(&mut self, feed_id: i64) -> Result<Feed, SelectionError>;

    fn insert_post(&mut self, post: NewPost) -> Result<InsertOutcome, StoreWriteError>;
}

pub struct DbStore;

impl DbStore {
    pub fn new() -> Self {
        DbStore
    }
}

impl Default for DbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionStore for DbStore {
    fn next_feed_to_fetch(&mut self) -> Result<Feed, SelectionError> {
        let mut connection = db::pool().get().map_err(|err| SelectionError::Store {
            msg: format!("{err:?}"),
        })?;

        feeds::next_to_fetch(&mut connection).map_err(|err| match err {
            Error::NotFound => SelectionError::NotFound,
            other => SelectionError::Store {
                msg: format!("{other:?}"),
            },
        })
    }

    fn mark_fetched(&mut self, feed_id: i64) -> Result<Feed, SelectionError> {
        let mut connection = db::pool().get().map_err(|err| SelectionError::Store {
            msg: format!("{err:?}"),
        })?;

        feeds::mark_fetched(&mut connection, feed_id).map_err(|err| SelectionError::Store {
            msg: format!("{err:?}"),
        })
    }

    fn insert_post(&mut self, post: NewPost) -> Result<InsertOutcome, StoreWriteError> {
        let mut connection = db::pool().get().map_err(|err| StoreWriteError {
            msg: format!("{err:?}"),
        })?;

        match posts::create(&mut connection, &post) {
            Ok(Some(_)) => Ok(InsertOutcome::Created),
            Ok(None) => Ok(InsertOutcome::DuplicateIgnored),
            Err(err) => Err(StoreWriteError {
                msg: format!("{err:?}"),
            }),
        }
    }
}
