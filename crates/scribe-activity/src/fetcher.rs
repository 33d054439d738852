//! Channel fetcher — reads recent history from one channel.
//!
//! Every call owns exactly one platform session:
//! 1. open + login
//! 2. resolve the channel name (best effort; a failure keeps the placeholder)
//! 3. read up to `limit` messages, newest first
//! 4. normalize each message to a [`MessageRecord`]
//! 5. close the session, on every path, exactly once
//!
//! Platform failures are classified into [`FetchError`] and returned as a
//! [`FetchFailure`] payload; nothing is retried.

use std::sync::Arc;

use chrono::DateTime;
use tracing::{debug, warn};

use scribe_channels::{ChatPlatform, ChatSession, HistoryMessage};
use scribe_core::types::UNKNOWN_CHANNEL_NAME;
use scribe_core::{ChannelActivity, ChannelId, FetchLimit, FetchResult, MessageRecord};

use crate::error::FetchError;

/// Fetches one channel's recent history through a fresh session per call.
#[derive(Clone)]
pub struct ChannelFetcher {
    platform: Arc<dyn ChatPlatform>,
}

impl ChannelFetcher {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }

    /// Platform name, for logging.
    pub fn platform_name(&self) -> &str {
        self.platform.name()
    }

    /// Fetch up to `limit` of the most recent messages from `channel_id`.
    pub async fn fetch(&self, channel_id: &ChannelId, limit: FetchLimit) -> FetchResult {
        let mut session = self.platform.open_session();
        debug!(
            platform = self.platform.name(),
            channel = %channel_id,
            limit = limit.get(),
            "opened session"
        );

        let mut channel_name = UNKNOWN_CHANNEL_NAME.to_string();
        let outcome = read_channel(session.as_mut(), channel_id, limit, &mut channel_name).await;

        if let Err(e) = session.close().await {
            warn!(channel = %channel_id, error = %e, "failed to close session");
        }

        match outcome {
            Ok(messages) => {
                debug!(
                    channel = %channel_id,
                    name = %channel_name,
                    messages = messages.len(),
                    "channel fetched"
                );
                Ok(ChannelActivity {
                    channel_name,
                    channel_id: channel_id.clone(),
                    messages,
                })
            }
            Err(err) => {
                warn!(
                    channel = %channel_id,
                    kind = %err.kind(),
                    error = %err,
                    "channel fetch failed"
                );
                Err(err.into_failure(channel_name, channel_id.clone()))
            }
        }
    }
}

/// Everything between login and close. `channel_name` is updated as soon as
/// it is known so failures after resolution still report it.
async fn read_channel(
    session: &mut dyn ChatSession,
    channel_id: &ChannelId,
    limit: FetchLimit,
    channel_name: &mut String,
) -> Result<Vec<MessageRecord>, FetchError> {
    session.login().await?;

    match session.fetch_channel(channel_id).await {
        Ok(info) => {
            if let Some(name) = info.name {
                *channel_name = name;
            }
        }
        Err(e) => {
            warn!(
                channel = %channel_id,
                error = %e,
                "could not resolve channel name, reading history anyway"
            );
        }
    }

    let history = session.history(channel_id, limit).await?;
    Ok(history
        .into_iter()
        .take(limit.as_usize())
        .map(normalize)
        .collect())
}

/// Flatten a platform message into a [`MessageRecord`].
fn normalize(msg: HistoryMessage) -> MessageRecord {
    MessageRecord {
        id: msg.id,
        author: msg.author.username,
        author_id: msg.author.id,
        content: msg.content,
        timestamp: normalize_timestamp(msg.timestamp),
    }
}

/// Re-render an RFC 3339 timestamp in canonical form; pass anything else through.
fn normalize_timestamp(raw: String) -> String {
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(dt) => dt.to_rfc3339(),
        Err(_) => raw,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_channels::testing::{message, ScriptedChannel, ScriptedPlatform};
    use scribe_channels::{ChannelInfo, PlatformError};
    use scribe_core::FetchErrorKind;

    const CHANNEL: &str = "1308488868252614687";

    fn channel() -> ChannelId {
        ChannelId::parse(CHANNEL).unwrap()
    }

    fn three_messages() -> Vec<HistoryMessage> {
        vec![
            message("103", "mira", "2", "the door is locked", 3),
            message("102", "tomas", "1", "", 2),
            message("101", "mira", "2", "we enter the manor", 1),
        ]
    }

    fn fetcher(platform: &ScriptedPlatform) -> ChannelFetcher {
        ChannelFetcher::new(Arc::new(platform.clone()))
    }

    #[tokio::test]
    async fn test_fetch_success_keeps_newest_first() {
        let platform = ScriptedPlatform::new()
            .with_channel(CHANNEL, ScriptedChannel::ok(CHANNEL, "adventure-log", three_messages()));

        let activity = fetcher(&platform)
            .fetch(&channel(), FetchLimit::DEFAULT)
            .await
            .unwrap();

        assert_eq!(activity.channel_name, "adventure-log");
        assert_eq!(activity.channel_id, channel());
        let ids: Vec<_> = activity.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["103", "102", "101"]);

        let first = &activity.messages[0];
        assert_eq!(first.author, "mira");
        assert_eq!(first.author_id, "2");
        assert_eq!(first.content, "the door is locked");
        assert_eq!(first.timestamp, "2024-05-01T12:00:03+00:00");
        assert_eq!(activity.messages[1].content, "");
    }

    #[tokio::test]
    async fn test_fetch_never_exceeds_limit() {
        let many: Vec<_> = (0..30u32)
            .rev()
            .map(|n| message(&n.to_string(), "a", "1", "x", n))
            .collect();
        let platform = ScriptedPlatform::new()
            .with_channel(CHANNEL, ScriptedChannel::ok(CHANNEL, "busy", many));

        let limit = FetchLimit::checked(5).unwrap();
        let activity = fetcher(&platform).fetch(&channel(), limit).await.unwrap();

        assert_eq!(activity.messages.len(), 5);
        assert_eq!(activity.messages[0].id, "29");
        assert!(platform.events().contains(&format!("history:{CHANNEL}:5")));
    }

    #[tokio::test]
    async fn test_fetch_unknown_channel_is_not_found() {
        let platform = ScriptedPlatform::new();

        let failure = fetcher(&platform)
            .fetch(&ChannelId::parse("999999999999999999").unwrap(), FetchLimit::DEFAULT)
            .await
            .unwrap_err();

        assert_eq!(failure.error_kind, FetchErrorKind::ChannelNotFound);
        assert_eq!(failure.channel_name, UNKNOWN_CHANNEL_NAME);
        assert_eq!(failure.channel_id.as_str(), "999999999999999999");
        assert_eq!(failure.error, "Channel not found or inaccessible with the given ID");
    }

    #[tokio::test]
    async fn test_fetch_forbidden_keeps_resolved_name() {
        let platform = ScriptedPlatform::new()
            .with_channel(CHANNEL, ScriptedChannel::forbidden(CHANNEL, "dm-notes"));

        let failure = fetcher(&platform)
            .fetch(&channel(), FetchLimit::DEFAULT)
            .await
            .unwrap_err();

        assert_eq!(failure.error_kind, FetchErrorKind::AccessForbidden);
        assert_eq!(failure.channel_name, "dm-notes");
    }

    #[tokio::test]
    async fn test_name_resolution_failure_is_not_fatal() {
        let platform = ScriptedPlatform::new().with_channel(
            CHANNEL,
            ScriptedChannel {
                info: Err(PlatformError::Http {
                    status: 500,
                    message: "flaky".into(),
                }),
                history: Ok(three_messages()),
            },
        );

        let activity = fetcher(&platform)
            .fetch(&channel(), FetchLimit::DEFAULT)
            .await
            .unwrap();

        assert_eq!(activity.channel_name, UNKNOWN_CHANNEL_NAME);
        assert_eq!(activity.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_unnamed_channel_uses_placeholder() {
        let platform = ScriptedPlatform::new().with_channel(
            CHANNEL,
            ScriptedChannel {
                info: Ok(ChannelInfo {
                    id: CHANNEL.into(),
                    name: None,
                }),
                history: Ok(vec![]),
            },
        );

        let activity = fetcher(&platform)
            .fetch(&channel(), FetchLimit::DEFAULT)
            .await
            .unwrap();
        assert_eq!(activity.channel_name, UNKNOWN_CHANNEL_NAME);
        assert!(activity.messages.is_empty());
    }

    #[tokio::test]
    async fn test_login_failure_is_internal() {
        let platform = ScriptedPlatform::new()
            .with_channel(CHANNEL, ScriptedChannel::ok(CHANNEL, "x", vec![]))
            .with_login_error(PlatformError::Unauthorized);

        let failure = fetcher(&platform)
            .fetch(&channel(), FetchLimit::DEFAULT)
            .await
            .unwrap_err();

        assert_eq!(failure.error_kind, FetchErrorKind::InternalFailure);
        assert!(failure.error.starts_with("An internal error occurred: "));
        assert!(failure.error.contains("401"));
        assert_eq!(platform.events(), ["login", "close"]);
    }

    #[tokio::test]
    async fn test_session_closed_exactly_once_on_every_path() {
        let platform = ScriptedPlatform::new()
            .with_channel("1", ScriptedChannel::ok("1", "ok", three_messages()))
            .with_channel("2", ScriptedChannel::forbidden("2", "locked"));
        let fetcher = fetcher(&platform);

        let mut calls = 0;
        for id in ["1", "2", "3"] {
            let _ = fetcher
                .fetch(&ChannelId::parse(id).unwrap(), FetchLimit::DEFAULT)
                .await;
            calls += 1;
            assert_eq!(platform.opened(), calls);
            assert_eq!(platform.closed(), calls);
        }
    }

    #[tokio::test]
    async fn test_session_call_order() {
        let platform = ScriptedPlatform::new()
            .with_channel(CHANNEL, ScriptedChannel::ok(CHANNEL, "log", three_messages()));

        fetcher(&platform)
            .fetch(&channel(), FetchLimit::DEFAULT)
            .await
            .unwrap();

        assert_eq!(
            platform.events(),
            [
                "login".to_string(),
                format!("channel:{CHANNEL}"),
                format!("history:{CHANNEL}:10"),
                "close".to_string(),
            ]
        );
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("2024-05-01T12:34:56.789000+00:00".into()),
            "2024-05-01T12:34:56.789+00:00"
        );
        assert_eq!(normalize_timestamp("yesterday".into()), "yesterday");
    }

    #[test]
    fn test_success_payload_shape() {
        let activity = ChannelActivity {
            channel_name: "log".into(),
            channel_id: channel(),
            messages: vec![normalize(message("1", "mira", "2", "hi", 0))],
        };
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["channel_id"], CHANNEL);
        assert_eq!(value["messages"][0]["author"], "mira");
        assert_eq!(value["messages"][0]["author_id"], "2");
        assert_eq!(value["messages"][0]["timestamp"], "2024-05-01T12:00:00+00:00");
    }
}
