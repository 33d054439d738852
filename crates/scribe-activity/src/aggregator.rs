//! Activity aggregator — recent history across a fixed list of channels.
//!
//! Channels are fetched strictly one after another, in the given order. Each
//! fetch, including its session teardown, finishes before the next starts.
//! A failing channel is recorded and never stops the rest.

use tracing::{debug, info};

use scribe_core::{ActivityReport, ChannelId, FetchLimit};

use crate::fetcher::ChannelFetcher;

/// Builds an [`ActivityReport`] by running the fetcher over many channels.
#[derive(Clone)]
pub struct ActivityAggregator {
    fetcher: ChannelFetcher,
}

impl ActivityAggregator {
    pub fn new(fetcher: ChannelFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch `per_channel_limit` messages from each channel in order.
    ///
    /// The report always accounts for every channel:
    /// `all_channel_activity.len() + fetch_errors.len() == channel_ids.len()`.
    pub async fn aggregate(
        &self,
        channel_ids: &[ChannelId],
        per_channel_limit: FetchLimit,
    ) -> ActivityReport {
        let mut report = ActivityReport::default();

        for channel_id in channel_ids {
            let result = self.fetcher.fetch(channel_id, per_channel_limit).await;
            if let Err(failure) = &result {
                debug!(channel = %channel_id, error = %failure.error, "recording fetch error");
            }
            report.push(result);
        }

        info!(
            channels = channel_ids.len(),
            succeeded = report.all_channel_activity.len(),
            failed = report.fetch_errors.len(),
            "activity report built"
        );
        report
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
