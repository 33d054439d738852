//! Discord platform — short-lived REST v10 sessions.
//!
//! Each session owns its own `reqwest::Client`, created at `login()` and
//! dropped at `close()`. Nothing is shared between sessions.
//!
//! Endpoints used:
//! - `GET /users/@me` — credential check (login)
//! - `GET /channels/{id}` — channel name
//! - `GET /channels/{id}/messages?limit=N` — newest-first history, N ≤ 100

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use scribe_core::config::DiscordConfig;
use scribe_core::{ChannelId, FetchLimit};

use crate::base::{BotUser, ChannelInfo, ChatPlatform, ChatSession, HistoryMessage, PlatformError};

// ─────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────

pub use scribe_core::config::DEFAULT_DISCORD_API_BASE as DISCORD_API_BASE;

/// Discord requires bots to identify as `DiscordBot ($url, $version)`.
const USER_AGENT: &str = concat!("DiscordBot (scribe, ", env!("CARGO_PKG_VERSION"), ")");

/// Error body Discord returns on non-2xx responses.
#[derive(Deserialize)]
struct DiscordErrorBody {
    message: String,
    #[serde(default)]
    code: u64,
}

// ─────────────────────────────────────────────
// DiscordPlatform
// ─────────────────────────────────────────────

/// Opens Discord sessions authenticated with a bot token.
#[derive(Clone)]
pub struct DiscordPlatform {
    token: String,
    api_base: String,
}

impl std::fmt::Debug for DiscordPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordPlatform")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl DiscordPlatform {
    /// Create a platform for `token` against `api_base` (no trailing slash needed).
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &DiscordConfig) -> Self {
        Self::new(config.token.trim(), config.api_base.as_str())
    }
}

impl ChatPlatform for DiscordPlatform {
    fn name(&self) -> &str {
        "discord"
    }

    fn open_session(&self) -> Box<dyn ChatSession> {
        Box::new(DiscordSession {
            token: self.token.clone(),
            api_base: self.api_base.clone(),
            http: None,
        })
    }
}

// ─────────────────────────────────────────────
// DiscordSession
// ─────────────────────────────────────────────

/// One Discord REST session. Logged in while `http` is `Some`.
pub struct DiscordSession {
    token: String,
    api_base: String,
    http: Option<reqwest::Client>,
}

impl DiscordSession {
    fn client(&self) -> Result<&reqwest::Client, PlatformError> {
        self.http.as_ref().ok_or(PlatformError::NotLoggedIn)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        http: &reqwest::Client,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PlatformError> {
        let url = format!("{}{}", self.api_base, path);
        debug!(url = %url, "discord GET");

        let resp = http
            .get(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .query(query)
            .send()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatSession for DiscordSession {
    async fn login(&mut self) -> Result<BotUser, PlatformError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let user: BotUser = self.get_json(&http, "/users/@me", &[]).await?;
        debug!(user = %user.username, "discord session logged in");
        self.http = Some(http);
        Ok(user)
    }

    async fn fetch_channel(&self, channel_id: &ChannelId) -> Result<ChannelInfo, PlatformError> {
        let http = self.client()?;
        self.get_json(http, &format!("/channels/{channel_id}"), &[])
            .await
    }

    async fn history(
        &self,
        channel_id: &ChannelId,
        limit: FetchLimit,
    ) -> Result<Vec<HistoryMessage>, PlatformError> {
        let http = self.client()?;
        self.get_json(
            http,
            &format!("/channels/{channel_id}/messages"),
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn close(&mut self) -> Result<(), PlatformError> {
        if self.http.take().is_some() {
            debug!("discord session closed");
        }
        Ok(())
    }
}

/// Map a non-success response to a [`PlatformError`].
fn classify_status(status: StatusCode, body: &str) -> PlatformError {
    let message = match serde_json::from_str::<DiscordErrorBody>(body) {
        Ok(err) if err.code != 0 => format!("{} (code {})", err.message, err.code),
        Ok(err) => err.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    match status {
        StatusCode::NOT_FOUND => PlatformError::NotFound(message),
        StatusCode::FORBIDDEN => PlatformError::Forbidden(message),
        StatusCode::UNAUTHORIZED => PlatformError::Unauthorized,
        _ => PlatformError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
