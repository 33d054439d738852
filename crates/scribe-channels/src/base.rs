//! Platform traits — the abstract interface every chat platform implements.
//!
//! A [`ChatPlatform`] hands out fresh [`ChatSession`]s. A session is a
//! short-lived, exclusively owned connection:
//! - `login()` — authenticate with the platform credential
//! - `fetch_channel()` — resolve channel metadata
//! - `history()` — read the most recent messages, newest first
//! - `close()` — release the connection (idempotent)
//!
//! Sessions are never pooled. Callers open one per unit of work and must call
//! `close()` on every path once they are done with it.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use scribe_core::{ChannelId, FetchLimit};

/// Errors surfaced by a platform session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The resource does not exist or is not visible (HTTP 404).
    #[error("not found (HTTP 404): {0}")]
    NotFound(String),
    /// The session lacks permission (HTTP 403).
    #[error("forbidden (HTTP 403): {0}")]
    Forbidden(String),
    /// The credential was rejected (HTTP 401).
    #[error("unauthorized (HTTP 401): improper token has been passed")]
    Unauthorized,
    /// A call was made before `login()` or after `close()`.
    #[error("session is not logged in")]
    NotLoggedIn,
    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The platform answered with a payload we could not decode.
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

/// The authenticated bot account.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
}

/// Channel metadata. Some channel kinds (DMs) have no name.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Author of a history message.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HistoryAuthor {
    pub id: String,
    pub username: String,
}

/// A raw history message as returned by the platform.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    pub id: String,
    pub author: HistoryAuthor,
    #[serde(default)]
    pub content: String,
    /// ISO-8601 creation time.
    pub timestamp: String,
}

/// A chat platform that can open sessions.
pub trait ChatPlatform: Send + Sync {
    /// Platform name for logging (e.g. "discord").
    fn name(&self) -> &str;

    /// Create a new, not yet authenticated session. Performs no I/O.
    fn open_session(&self) -> Box<dyn ChatSession>;
}

/// One short-lived, exclusively owned platform connection.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Authenticate with the platform credential.
    async fn login(&mut self) -> Result<BotUser, PlatformError>;

    /// Resolve a channel's metadata.
    async fn fetch_channel(&self, channel_id: &ChannelId) -> Result<ChannelInfo, PlatformError>;

    /// Read up to `limit` of the most recent messages, newest first.
    async fn history(
        &self,
        channel_id: &ChannelId,
        limit: FetchLimit,
    ) -> Result<Vec<HistoryMessage>, PlatformError>;

    /// Release the session. Safe to call more than once.
    async fn close(&mut self) -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_message_deserializes_discord_shape() {
        let msg: HistoryMessage = serde_json::from_value(json!({
            "id": "1200000000000000001",
            "type": 0,
            "channel_id": "1308488868252614687",
            "author": { "id": "80351110224678912", "username": "nelly", "global_name": "Nelly" },
            "content": "rolled a 20",
            "timestamp": "2024-05-01T12:34:56.789000+00:00",
            "attachments": []
        }))
        .unwrap();

        assert_eq!(msg.id, "1200000000000000001");
        assert_eq!(msg.author.username, "nelly");
        assert_eq!(msg.content, "rolled a 20");
    }

    #[test]
    fn test_history_message_missing_content() {
        let msg: HistoryMessage = serde_json::from_value(json!({
            "id": "1",
            "author": { "id": "2", "username": "u" },
            "timestamp": "2024-05-01T12:34:56+00:00"
        }))
        .unwrap();
        assert_eq!(msg.content, "");
    }

    #[test]
    fn test_channel_info_without_name() {
        let info: ChannelInfo = serde_json::from_value(json!({ "id": "5", "type": 1 })).unwrap();
        assert_eq!(info.name, None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PlatformError::Http { status: 502, message: "Bad Gateway".into() }.to_string(),
            "HTTP 502: Bad Gateway"
        );
        assert_eq!(
            PlatformError::NotFound("Unknown Channel".into()).to_string(),
            "not found (HTTP 404): Unknown Channel"
        );
    }
}
