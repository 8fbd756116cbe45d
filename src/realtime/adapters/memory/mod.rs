//! In-memory adapters for realtime tests.

mod feed;

pub use feed::InMemoryChangeFeed;
