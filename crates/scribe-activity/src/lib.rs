//! Scribe activity — reading channel history through short-lived sessions.
//!
//! # Architecture
//!
//! - [`fetcher::ChannelFetcher`] — one channel: login, resolve name, read
//!   history, normalize, always close
//! - [`aggregator::ActivityAggregator`] — many channels, one after another,
//!   successes and failures collected separately
//! - [`error::FetchError`] — classification of platform failures

pub mod aggregator;
pub mod error;
pub mod fetcher;

pub use aggregator::ActivityAggregator;
pub use error::FetchError;
pub use fetcher::ChannelFetcher;
