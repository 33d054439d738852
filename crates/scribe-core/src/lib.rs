//! Scribe core — shared types, fetch limits, and configuration.
//!
//! - [`types`] — channel ids, normalized message records, fetch results and
//!   the aggregate activity report
//! - [`config`] — schema, loading, env var overrides and startup validation
//! - [`utils`] — data directory helpers

pub mod config;
pub mod types;
pub mod utils;

pub use types::{
    ActivityReport, ChannelActivity, ChannelId, FetchErrorKind, FetchFailure, FetchLimit,
    FetchResult, InvalidChannelId, InvalidLimit, MessageRecord,
};
