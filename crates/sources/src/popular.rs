//! Popular Source - global top-series ranking
//!
//! Fallback for readers the collaborative source has nothing for (new
//! readers, or readers whose likes overlap with nobody). Ranks series by the
//! number of likes they received, optionally counting only likes made at or
//! after a cutoff ("top series this year").

use data_loader::{DataIndex, SeriesId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A series with the number of likes counted for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularSeries {
    pub series_id: SeriesId,
    pub like_count: u32,
}

/// Ranks series by like count
#[derive(Clone)]
pub struct PopularSource {
    data_index: Arc<DataIndex>,

    /// Only likes with `timestamp >= since` count, `None` counts everything
    since: Option<i64>,
}

impl PopularSource {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            data_index,
            since: None,
        }
    }

    /// Count only likes made at or after `since` (unix seconds)
    pub fn with_since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    /// Top `limit` series by like count, most liked first.
    ///
    /// Series with no counted likes are left out. Series in `exclude` are
    /// skipped. Ties go to the lower series id.
    #[instrument(skip(self, exclude), fields(since = self.since))]
    pub fn get_top_series(
        &self,
        exclude: Option<&HashSet<SeriesId>>,
        limit: usize,
    ) -> Vec<PopularSeries> {
        let mut ranked: Vec<PopularSeries> = self
            .data_index
            .get_all_series_ids()
            .into_iter()
            .filter(|id| exclude.is_none_or(|excluded| !excluded.contains(id)))
            .filter_map(|series_id| {
                let like_count = self.count_likes(series_id);
                (like_count > 0).then_some(PopularSeries {
                    series_id,
                    like_count,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then_with(|| a.series_id.cmp(&b.series_id))
        });
        ranked.truncate(limit);

        debug!("Ranked {} popular series", ranked.len());
        ranked
    }

    fn count_likes(&self, series_id: SeriesId) -> u32 {
        match self.since {
            // Precomputed all-time count
            None => self
                .data_index
                .get_series_stats(series_id)
                .map_or(0, |stats| stats.like_count),
            Some(since) => self
                .data_index
                .get_series_likes(series_id)
                .iter()
                .filter(|like| like.timestamp >= since)
                .count()
                .try_into()
                .unwrap_or(u32::MAX),
        }
    }
}
