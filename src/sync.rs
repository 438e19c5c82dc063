pub mod normalizer;
pub mod poll_job;
pub mod reader;
pub mod scheduler;
pub mod store;

pub use reader::{FetchedFeed, FetchedFeedItem};
