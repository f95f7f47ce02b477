//! # Recommendation Orchestrator
//!
//! Serves one page of series recommendations for a reader:
//! 1. Run the collaborative source on the blocking pool (optionally time-boxed)
//! 2. Fall back to the popular source when it comes back empty or runs out of time
//! 3. Enrich series ids with catalog data and thumbnail URLs
//! 4. Cut the requested page out of the ranked list

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use data_loader::{DataIndex, SeriesId, SeriesKind};
use sources::{CollaborativeRecommender, Neighbor, PopularSource, ScoredSeries};

use crate::pagination::{PageRequest, PagedList};
use crate::thumbnails::{PublicUrlResolver, ThumbnailResolver, resolve_thumbnail};

/// Default size of the neighbor pool
pub const DEFAULT_NEIGHBOR_LIMIT: usize = 50;

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationSource {
    Collaborative,
    Popular,
}

/// A recommended series ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecommendation {
    pub series_id: SeriesId,
    pub title: String,
    pub kind: SeriesKind,
    pub thumbnail_url: String,
    /// All-time like count
    pub like_count: u32,
    /// Neighbors who liked it, for collaborative recommendations
    pub neighbor_count: Option<u32>,
    pub source: RecommendationSource,
    pub explanation: String,
}

/// Coordinates the recommendation sources for page requests
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    data_index: Arc<DataIndex>,
    recommender: CollaborativeRecommender,
    popular: PopularSource,
    thumbnails: Arc<dyn ThumbnailResolver>,
    neighbor_limit: usize,
    time_budget: Option<Duration>,
    /// Extra time the collaborative task spends before it starts
    #[cfg(test)]
    collaborative_delay: Option<Duration>,
}

impl RecommendationOrchestrator {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            recommender: CollaborativeRecommender::new(),
            popular: PopularSource::new(data_index.clone()),
            thumbnails: Arc::new(PublicUrlResolver::new("")),
            neighbor_limit: DEFAULT_NEIGHBOR_LIMIT,
            time_budget: None,
            #[cfg(test)]
            collaborative_delay: None,
            data_index,
        }
    }

    /// Number of similar readers consulted (default: [`DEFAULT_NEIGHBOR_LIMIT`])
    pub fn with_neighbor_limit(mut self, neighbor_limit: usize) -> Self {
        self.neighbor_limit = neighbor_limit;
        self
    }

    /// Maximum number of series in the ranked result
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.recommender = self.recommender.with_max_results(max_results);
        self
    }

    /// Fallback ranking only counts likes at or after `since` (unix seconds)
    pub fn with_popular_since(mut self, since: i64) -> Self {
        self.popular = self.popular.with_since(since);
        self
    }

    /// Give up on the collaborative source after `budget` and serve the fallback
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn with_thumbnail_resolver(
        mut self,
        resolver: impl ThumbnailResolver + 'static,
    ) -> Self {
        self.thumbnails = Arc::new(resolver);
        self
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    /// Main entry point: one page of recommendations for a reader
    #[instrument(
        skip(self, request),
        fields(user_id = %request.user_id, page = request.page_number)
    )]
    pub async fn get_recommendations(
        &self,
        request: &PageRequest,
    ) -> Result<PagedList<SeriesRecommendation>> {
        let start_time = Instant::now();

        let scored = self.run_collaborative(&request.user_id).await?;

        let ranked = if scored.is_empty() {
            info!("No collaborative recommendations, serving popular series");
            self.popular_fallback(&request.user_id)
        } else {
            info!("Collaborative source returned {} series", scored.len());
            self.enrich_collaborative(scored)
        };

        let page = PagedList::from_ranked(ranked, request.page_number, request.page_size);
        info!(
            "Served {} of {} recommendations in {:.2?}",
            page.items.len(),
            page.total_count,
            start_time.elapsed()
        );
        Ok(page)
    }

    /// The `n` readers most similar to `user_id`
    pub fn similar_readers(&self, user_id: &str, n: usize) -> Vec<Neighbor> {
        self.recommender
            .find_neighbors(user_id, self.data_index.liked_sets(), n)
    }

    /// Run the O(U²) similarity work off the async workers.
    ///
    /// A timed-out task keeps running to completion on the blocking pool;
    /// only its result is discarded.
    async fn run_collaborative(&self, user_id: &str) -> Result<Vec<ScoredSeries>> {
        let task = tokio::task::spawn_blocking({
            let recommender = self.recommender.clone();
            let data_index = self.data_index.clone();
            let user_id = user_id.to_string();
            let neighbor_limit = self.neighbor_limit;
            #[cfg(test)]
            let delay = self.collaborative_delay;
            move || {
                #[cfg(test)]
                if let Some(delay) = delay {
                    std::thread::sleep(delay);
                }
                recommender.recommend_scored(&user_id, data_index.liked_sets(), neighbor_limit)
            }
        });

        let joined = match self.time_budget {
            Some(budget) => match tokio::time::timeout(budget, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("Collaborative source exceeded {:?} budget", budget);
                    return Ok(Vec::new());
                }
            },
            None => task.await,
        };

        joined.context("Collaborative task panicked")
    }

    fn enrich_collaborative(&self, scored: Vec<ScoredSeries>) -> Vec<SeriesRecommendation> {
        scored
            .into_iter()
            .filter_map(|s| {
                let plural = if s.neighbor_count == 1 { "" } else { "s" };
                self.to_recommendation(
                    s.series_id,
                    RecommendationSource::Collaborative,
                    Some(s.neighbor_count),
                    format!(
                        "Liked by {} reader{} with similar taste",
                        s.neighbor_count, plural
                    ),
                )
            })
            .collect()
    }

    fn popular_fallback(&self, user_id: &str) -> Vec<SeriesRecommendation> {
        let exclude = self.data_index.get_user_likes(user_id);
        self.popular
            .get_top_series(exclude, self.recommender.max_results())
            .into_iter()
            .filter_map(|p| {
                self.to_recommendation(
                    p.series_id,
                    RecommendationSource::Popular,
                    None,
                    format!("Popular: {} likes", p.like_count),
                )
            })
            .collect()
    }

    /// Series missing from the catalog are dropped
    fn to_recommendation(
        &self,
        series_id: SeriesId,
        source: RecommendationSource,
        neighbor_count: Option<u32>,
        explanation: String,
    ) -> Option<SeriesRecommendation> {
        let Some(series) = self.data_index.get_series(series_id) else {
            warn!("Series {} not in catalog, skipping", series_id);
            return None;
        };
        let like_count = self
            .data_index
            .get_series_stats(series_id)
            .map_or(0, |stats| stats.like_count);
        debug!("Enriching series {} ({:?})", series_id, source);

        Some(SeriesRecommendation {
            series_id,
            title: series.title.clone(),
            kind: series.kind,
            thumbnail_url: resolve_thumbnail(
                self.thumbnails.as_ref(),
                series.thumbnail.as_deref(),
            ),
            like_count,
            neighbor_count,
            source,
            explanation,
        })
    }
}
