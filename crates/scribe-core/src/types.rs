//! Core types for Scribe — channel ids, fetch limits, and the JSON shapes
//! returned by the HTTP API.
//!
//! Everything here is created per request and dropped once the response is
//! written. None of it is shared between requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder used when a channel's name cannot be resolved.
pub const UNKNOWN_CHANNEL_NAME: &str = "Unknown Channel";

// ─────────────────────────────────────────────
// ChannelId
// ─────────────────────────────────────────────

/// Rejected channel identifier (empty or containing a non-digit).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid channel ID '{0}': must be a non-empty string of digits")]
pub struct InvalidChannelId(pub String);

/// A chat channel identifier: a non-empty string of ASCII decimal digits.
///
/// Kept as a string end to end. Discord snowflakes exceed `i53` and clients
/// routinely mangle them when treated as numbers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Validate and wrap a raw identifier.
    pub fn parse(raw: &str) -> Result<Self, InvalidChannelId> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(ChannelId(raw.to_string()))
        } else {
            Err(InvalidChannelId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelId {
    type Err = InvalidChannelId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelId::parse(s)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = InvalidChannelId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChannelId::parse(&value)
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────
// FetchLimit
// ─────────────────────────────────────────────

/// Rejected `limit` value that is not an integer at all.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid limit '{0}': must be an integer")]
pub struct InvalidLimit(pub String);

/// Number of messages to read from a channel, always within `1..=MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchLimit(u8);

impl FetchLimit {
    /// Used when no limit is given, or the given one is out of range.
    pub const DEFAULT: FetchLimit = FetchLimit(10);
    /// Largest page a single history request may return.
    pub const MAX: FetchLimit = FetchLimit(100);
    /// Per-channel limit of the all-channels activity report.
    pub const ALL_CHANNELS: FetchLimit = FetchLimit(15);

    /// Accept `n` if it is within `1..=100`, otherwise fall back to the default.
    pub fn clamped(n: i64) -> Self {
        if (1..=i64::from(Self::MAX.0)).contains(&n) {
            FetchLimit(n as u8)
        } else {
            Self::DEFAULT
        }
    }

    /// Accept `n` only if it is within `1..=100`.
    pub fn checked(n: i64) -> Option<Self> {
        if (1..=i64::from(Self::MAX.0)).contains(&n) {
            Some(FetchLimit(n as u8))
        } else {
            None
        }
    }

    /// Parse an optional query parameter.
    ///
    /// Missing → default. Integers out of range (including ones too large for
    /// `i64`) → default. Anything that is not an integer → error.
    pub fn parse(raw: Option<&str>) -> Result<Self, InvalidLimit> {
        let Some(raw) = raw else {
            return Ok(Self::DEFAULT);
        };

        match raw.parse::<i64>() {
            Ok(n) => Ok(Self::clamped(n)),
            Err(_) if is_integer_literal(raw) => Ok(Self::DEFAULT),
            Err(_) => Err(InvalidLimit(raw.to_string())),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for FetchLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FetchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `[+-]?[0-9]+`
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// ─────────────────────────────────────────────
// Messages and fetch results
// ─────────────────────────────────────────────

/// A single history message flattened to strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    /// Author display name.
    pub author: String,
    pub author_id: String,
    /// May be empty (attachment-only or embed-only messages).
    pub content: String,
    /// ISO-8601 creation time.
    pub timestamp: String,
}

/// Successful fetch payload for one channel.
///
/// `messages` keeps the platform's order: most recent first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelActivity {
    pub channel_name: String,
    pub channel_id: ChannelId,
    pub messages: Vec<MessageRecord>,
}

/// Why a channel fetch failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The channel does not exist or is not visible to the bot.
    ChannelNotFound,
    /// The bot can see the channel but may not read its history.
    AccessForbidden,
    /// Anything else: login, transport, or unexpected platform responses.
    InternalFailure,
}

impl FetchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::ChannelNotFound => "channel_not_found",
            FetchErrorKind::AccessForbidden => "access_forbidden",
            FetchErrorKind::InternalFailure => "internal_failure",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed fetch payload for one channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Human-readable description.
    pub error: String,
    pub error_kind: FetchErrorKind,
    /// Best effort; [`UNKNOWN_CHANNEL_NAME`] when resolution never succeeded.
    pub channel_name: String,
    pub channel_id: ChannelId,
}

/// Outcome of fetching one channel.
pub type FetchResult = Result<ChannelActivity, FetchFailure>;

// ─────────────────────────────────────────────
// ActivityReport
// ─────────────────────────────────────────────

/// Combined results across every configured channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub all_channel_activity: Vec<ChannelActivity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fetch_errors: Vec<FetchFailure>,
}

impl ActivityReport {
    /// Record one channel's outcome, keeping input order within each list.
    pub fn push(&mut self, result: FetchResult) {
        match result {
            Ok(activity) => self.all_channel_activity.push(activity),
            Err(failure) => self.fetch_errors.push(failure),
        }
    }

    /// Number of channels accounted for (successes + failures).
    pub fn attempted(&self) -> usize {
        self.all_channel_activity.len() + self.fetch_errors.len()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(raw: &str) -> ChannelId {
        ChannelId::parse(raw).unwrap()
    }

    // ── ChannelId ──

    #[test]
    fn test_channel_id_accepts_digits() {
        let cid = id("1308488868252614687");
        assert_eq!(cid.as_str(), "1308488868252614687");
        assert_eq!(cid.to_string(), "1308488868252614687");
    }

    #[test]
    fn test_channel_id_rejects_empty() {
        assert_eq!(ChannelId::parse(""), Err(InvalidChannelId(String::new())));
    }

    #[test]
    fn test_channel_id_rejects_non_digits() {
        for raw in ["abc", "12a4", " 123", "123 ", "-123", "1.5", "YOUR_FIRST_CHANNEL_ID_HERE", "１２３"] {
            assert!(ChannelId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_channel_id_from_str() {
        let cid: ChannelId = "42".parse().unwrap();
        assert_eq!(cid, id("42"));
        assert!("x".parse::<ChannelId>().is_err());
    }

    #[test]
    fn test_channel_id_serializes_as_string() {
        assert_eq!(serde_json::to_value(id("999")).unwrap(), json!("999"));
    }

    #[test]
    fn test_channel_id_deserialize_validates() {
        let ok: ChannelId = serde_json::from_value(json!("123")).unwrap();
        assert_eq!(ok.as_str(), "123");
        assert!(serde_json::from_value::<ChannelId>(json!("12x")).is_err());
    }

    // ── FetchLimit ──

    #[test]
    fn test_limit_missing_uses_default() {
        assert_eq!(FetchLimit::parse(None).unwrap(), FetchLimit::DEFAULT);
        assert_eq!(FetchLimit::DEFAULT.get(), 10);
    }

    #[test]
    fn test_limit_in_range() {
        assert_eq!(FetchLimit::parse(Some("1")).unwrap().get(), 1);
        assert_eq!(FetchLimit::parse(Some("37")).unwrap().get(), 37);
        assert_eq!(FetchLimit::parse(Some("100")).unwrap().get(), 100);
    }

    #[test]
    fn test_limit_out_of_range_falls_back_to_default() {
        for raw in ["0", "-3", "101", "500", "99999999999999999999999"] {
            assert_eq!(
                FetchLimit::parse(Some(raw)).unwrap(),
                FetchLimit::DEFAULT,
                "{raw} should clamp to default"
            );
        }
    }

    #[test]
    fn test_limit_non_integer_rejected() {
        for raw in ["abc", "", "2.5", "10abc", " 5", "-"] {
            assert_eq!(
                FetchLimit::parse(Some(raw)),
                Err(InvalidLimit(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_limit_checked() {
        assert_eq!(FetchLimit::checked(15), Some(FetchLimit::ALL_CHANNELS));
        assert_eq!(FetchLimit::checked(0), None);
        assert_eq!(FetchLimit::checked(101), None);
    }

    // ── Results ──

    #[test]
    fn test_failure_serialization() {
        let failure = FetchFailure {
            error: "Bot forbidden from accessing channel history for the given ID".into(),
            error_kind: FetchErrorKind::AccessForbidden,
            channel_name: UNKNOWN_CHANNEL_NAME.into(),
            channel_id: id("7"),
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["error_kind"], "access_forbidden");
        assert_eq!(value["channel_name"], "Unknown Channel");
        assert_eq!(value["channel_id"], "7");
    }

    #[test]
    fn test_report_omits_empty_errors() {
        let mut report = ActivityReport::default();
        report.push(Ok(ChannelActivity {
            channel_name: "general".into(),
            channel_id: id("1"),
            messages: vec![],
        }));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["all_channel_activity"].as_array().unwrap().len(), 1);
        assert!(value.get("fetch_errors").is_none());
    }

    #[test]
    fn test_report_push_preserves_order() {
        let mut report = ActivityReport::default();
        for (n, ok) in [("1", true), ("2", false), ("3", true), ("4", false)] {
            let result = if ok {
                Ok(ChannelActivity {
                    channel_name: format!("ch{n}"),
                    channel_id: id(n),
                    messages: vec![],
                })
            } else {
                Err(FetchFailure {
                    error: "boom".into(),
                    error_kind: FetchErrorKind::InternalFailure,
                    channel_name: UNKNOWN_CHANNEL_NAME.into(),
                    channel_id: id(n),
                })
            };
            report.push(result);
        }

        assert_eq!(report.attempted(), 4);
        let ok: Vec<_> = report.all_channel_activity.iter().map(|a| a.channel_id.as_str()).collect();
        let failed: Vec<_> = report.fetch_errors.iter().map(|f| f.channel_id.as_str()).collect();
        assert_eq!(ok, ["1", "3"]);
        assert_eq!(failed, ["2", "4"]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["fetch_errors"].as_array().unwrap().len(), 2);
    }
}
