//! Fetch error classification.

use thiserror::Error;

use scribe_channels::PlatformError;
use scribe_core::{ChannelId, FetchErrorKind, FetchFailure};

/// Why fetching one channel failed, as reported to API callers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Channel not found or inaccessible with the given ID")]
    ChannelNotFound,
    #[error("Bot forbidden from accessing channel history for the given ID")]
    AccessForbidden,
    #[error("An internal error occurred: {0}")]
    InternalFailure(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::ChannelNotFound => FetchErrorKind::ChannelNotFound,
            FetchError::AccessForbidden => FetchErrorKind::AccessForbidden,
            FetchError::InternalFailure(_) => FetchErrorKind::InternalFailure,
        }
    }

    /// Build the JSON failure payload for `channel_id`.
    pub fn into_failure(self, channel_name: String, channel_id: ChannelId) -> FetchFailure {
        FetchFailure {
            error: self.to_string(),
            error_kind: self.kind(),
            channel_name,
            channel_id,
        }
    }
}

impl From<PlatformError> for FetchError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound(_) => FetchError::ChannelNotFound,
            PlatformError::Forbidden(_) => FetchError::AccessForbidden,
            other => FetchError::InternalFailure(other.to_string()),
        }
    }
}
