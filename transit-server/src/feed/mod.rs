//! Transit feed providers.
//!
//! The planner and the realtime view never load timetable data themselves;
//! they ask a [`FeedProvider`] for a ready-built, pre-sorted
//! [`TransitFeed`]. Providers are free to cache across calls; the core
//! treats every returned feed as a fresh immutable snapshot.

mod fixture;

pub use fixture::JsonFeedProvider;

use std::sync::Arc;

use crate::domain::TransitFeed;

/// Error from loading a feed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    /// Feed source could not be read
    #[error("failed to read feed: {0}")]
    Io(String),

    /// Feed source could not be parsed
    #[error("failed to parse feed: {0}")]
    Parse(String),

    /// Feed content failed validation
    #[error("invalid feed data: {0}")]
    Invalid(String),
}

/// Capability for loading the transit timetable.
///
/// This abstraction keeps the planner testable with in-memory fixtures.
pub trait FeedProvider: Send + Sync {
    /// Load the feed, fully validated and pre-sorted.
    fn load_feed(&self) -> Result<Arc<TransitFeed>, FeedError>;
}

/// Feed provider backed by an already-built feed.
///
/// Used in tests and wherever the feed is constructed in-process.
pub struct InMemoryFeedProvider {
    feed: Arc<TransitFeed>,
}

impl InMemoryFeedProvider {
    pub fn new(feed: TransitFeed) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }
}

impl FeedProvider for InMemoryFeedProvider {
    fn load_feed(&self) -> Result<Arc<TransitFeed>, FeedError> {
        Ok(self.feed.clone())
    }
}
