//! Which series a scheduled run covers.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use ytrack_types::{
    CycleReport, SeriesKey, TrackerConfig, VideoEntry, WindowKind, YtrackError,
};

use crate::Tracker;
use crate::registry::VideoRegistry;

/// Videos to track hourly this cycle.
///
/// The union of the videos the channel card attributed and the last
/// `hourly_video_count` registered uploads, minus registered videos younger
/// than `min_video_age_days`. Sorted and deduplicated.
#[must_use]
pub fn select_hourly_videos(
    attributed: &[String],
    videos: &[VideoEntry],
    now: DateTime<Utc>,
    cfg: &TrackerConfig,
) -> Vec<String> {
    let min_age = TimeDelta::days(i64::from(cfg.min_video_age_days));
    let mut by_upload: Vec<&VideoEntry> = videos.iter().collect();
    by_upload.sort_by_key(|v| v.uploaded);

    let latest = by_upload
        .iter()
        .rev()
        .take(cfg.hourly_video_count)
        .map(|v| v.id.clone());
    let too_young: BTreeSet<&str> = videos
        .iter()
        .filter(|v| now - v.uploaded < min_age)
        .map(|v| v.id.as_str())
        .collect();

    attributed
        .iter()
        .cloned()
        .chain(latest)
        .filter(|id| !too_young.contains(id.as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl Tracker {
    /// Hourly cycle: the channel series first, then the selected videos.
    ///
    /// If the channel series fails, videos are still selected from the
    /// registry alone.
    ///
    /// # Errors
    /// Returns an error only if the registry cannot be read; per-series
    /// failures land in the report.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "ytrack::tracker", skip(self, registry))
    )]
    pub fn run_hourly_cycle(
        &self,
        registry: &VideoRegistry,
        now: DateTime<Utc>,
    ) -> Result<CycleReport, YtrackError> {
        let videos = registry.load()?;
        let channel = SeriesKey::hourly_channel(self.cfg.channel_id.clone());
        let mut report = self.run_cycle(std::slice::from_ref(&channel));
        let attributed = report
            .report_for(&channel)
            .map(|r| r.attributed_columns.clone())
            .unwrap_or_default();

        let keys: Vec<SeriesKey> = select_hourly_videos(&attributed, &videos, now, &self.cfg)
            .into_iter()
            .map(SeriesKey::hourly_video)
            .collect();
        #[cfg(feature = "tracing")]
        tracing::info!(videos = keys.len(), "selected videos for hourly tracking");
        report.extend(self.run_cycle(&keys));
        Ok(report)
    }

    /// Explore cycle over registered videos for `window`.
    ///
    /// `SincePublished` only covers videos still flagged recent. A video whose
    /// chart has coarsened past the configured maximum spacing is marked not
    /// recent so later cycles skip it.
    ///
    /// # Errors
    /// Returns an error only if the registry cannot be read.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "ytrack::tracker", skip(self, registry))
    )]
    pub fn run_explore_cycle(
        &self,
        registry: &VideoRegistry,
        window: WindowKind,
    ) -> Result<CycleReport, YtrackError> {
        let recent_only = window == WindowKind::SincePublished;
        let keys: Vec<SeriesKey> = registry
            .list(recent_only)?
            .into_iter()
            .map(|v| SeriesKey::explore_video(v.id, window))
            .collect();
        let mut report = self.run_cycle(&keys);

        if recent_only {
            let max = self.cfg.granularity_bounds.max.as_secs();
            let coarsened: Vec<SeriesKey> = report
                .failed
                .iter()
                .filter(|(_, e)| {
                    matches!(e, YtrackError::UnsupportedGranularity { seconds }
                        if u64::try_from(*seconds).is_ok_and(|s| s > max))
                })
                .map(|(k, _)| k.clone())
                .collect();
            for key in coarsened {
                if let Err(e) = registry.mark_not_recent(key.scope.id()) {
                    report.failed.push((key, e));
                }
            }
        }
        Ok(report)
    }
}
