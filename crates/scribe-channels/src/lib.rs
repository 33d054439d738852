//! Scribe Channels — chat platform sessions.
//!
//! This crate provides:
//! - **base**: the `ChatPlatform` / `ChatSession` traits every platform implements
//! - **discord**: Discord REST v10 sessions over `reqwest`
//! - **testing**: a scripted in-memory platform (feature `testing`)

pub mod base;
pub mod discord;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use base::{BotUser, ChannelInfo, ChatPlatform, ChatSession, HistoryAuthor, HistoryMessage, PlatformError};
pub use discord::DiscordPlatform;
