//! Scripted in-memory platform for tests.
//!
//! Channels are registered with a name lookup result and a history result.
//! History is returned as scripted, without applying the requested limit.
//! Every session call is appended to a shared event log so tests can assert
//! ordering (e.g. that one session is closed before the next one logs in).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use scribe_core::{ChannelId, FetchLimit};

use crate::base::{
    BotUser, ChannelInfo, ChatPlatform, ChatSession, HistoryAuthor, HistoryMessage, PlatformError,
};

/// What the scripted platform answers for one channel.
#[derive(Clone, Debug)]
pub struct ScriptedChannel {
    pub info: Result<ChannelInfo, PlatformError>,
    pub history: Result<Vec<HistoryMessage>, PlatformError>,
}

impl ScriptedChannel {
    /// A readable channel with the given name and messages (newest first).
    pub fn ok(id: &str, name: &str, messages: Vec<HistoryMessage>) -> Self {
        Self {
            info: Ok(ChannelInfo {
                id: id.to_string(),
                name: Some(name.to_string()),
            }),
            history: Ok(messages),
        }
    }

    /// Channel that resolves but whose history is forbidden.
    pub fn forbidden(id: &str, name: &str) -> Self {
        Self {
            info: Ok(ChannelInfo {
                id: id.to_string(),
                name: Some(name.to_string()),
            }),
            history: Err(PlatformError::Forbidden("Missing Access".into())),
        }
    }
}

/// Build a history message with a deterministic timestamp derived from `seq`.
pub fn message(id: &str, author: &str, author_id: &str, content: &str, seq: u32) -> HistoryMessage {
    HistoryMessage {
        id: id.to_string(),
        author: HistoryAuthor {
            id: author_id.to_string(),
            username: author.to_string(),
        },
        content: content.to_string(),
        timestamp: format!("2024-05-01T12:{:02}:{:02}.000000+00:00", seq / 60 % 60, seq % 60),
    }
}

#[derive(Default)]
struct Shared {
    channels: HashMap<String, ScriptedChannel>,
    login_error: Option<PlatformError>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    events: Mutex<Vec<String>>,
}

impl Shared {
    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// In-memory [`ChatPlatform`]. Unknown channels answer `NotFound`.
#[derive(Clone, Default)]
pub struct ScriptedPlatform {
    shared: Arc<Shared>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. Must be called before the platform is shared.
    pub fn with_channel(mut self, id: &str, channel: ScriptedChannel) -> Self {
        Arc::get_mut(&mut self.shared)
            .expect("configure ScriptedPlatform before cloning it")
            .channels
            .insert(id.to_string(), channel);
        self
    }

    /// Make every `login()` fail with `error`.
    pub fn with_login_error(mut self, error: PlatformError) -> Self {
        Arc::get_mut(&mut self.shared)
            .expect("configure ScriptedPlatform before cloning it")
            .login_error = Some(error);
        self
    }

    /// Sessions handed out so far.
    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// `close()` calls received so far.
    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of the event log, e.g. `["login", "channel:1", "history:1:10", "close"]`.
    pub fn events(&self) -> Vec<String> {
        self.shared
            .events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ChatPlatform for ScriptedPlatform {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open_session(&self) -> Box<dyn ChatSession> {
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedSession {
            shared: self.shared.clone(),
            logged_in: false,
        })
    }
}

struct ScriptedSession {
    shared: Arc<Shared>,
    logged_in: bool,
}

impl ScriptedSession {
    fn channel(&self, id: &ChannelId) -> Result<&ScriptedChannel, PlatformError> {
        if !self.logged_in {
            return Err(PlatformError::NotLoggedIn);
        }
        self.shared
            .channels
            .get(id.as_str())
            .ok_or_else(|| PlatformError::NotFound("Unknown Channel".into()))
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn login(&mut self) -> Result<BotUser, PlatformError> {
        self.shared.record("login".into());
        if let Some(err) = &self.shared.login_error {
            return Err(err.clone());
        }
        self.logged_in = true;
        Ok(BotUser {
            id: "900".into(),
            username: "scripted-bot".into(),
        })
    }

    async fn fetch_channel(&self, channel_id: &ChannelId) -> Result<ChannelInfo, PlatformError> {
        self.shared.record(format!("channel:{channel_id}"));
        self.channel(channel_id)?.info.clone()
    }

    async fn history(
        &self,
        channel_id: &ChannelId,
        limit: FetchLimit,
    ) -> Result<Vec<HistoryMessage>, PlatformError> {
        self.shared.record(format!("history:{channel_id}:{limit}"));
        self.channel(channel_id)?.history.clone()
    }

    async fn close(&mut self) -> Result<(), PlatformError> {
        self.shared.record("close".into());
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
        self.logged_in = false;
        Ok(())
    }
}
