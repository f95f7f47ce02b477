//! Collaborative Source - user-based collaborative filtering
//!
//! "Readers whose likes overlap with yours also liked these series."
//!
//! ## Algorithm
//! 1. Look up the target reader's liked set (absent reader → no recommendations)
//! 2. Score every other reader by Jaccard similarity against the target
//! 3. Keep the `limit` most similar readers with a non-zero score (the neighbor pool)
//! 4. Count, per series, how many neighbors liked it, skipping series the
//!    target already liked
//! 5. Return the most-liked series, at most `max_results` of them
//!
//! Ties are broken by id (user id for neighbors, series id for candidates),
//! so identical inputs always produce identical output.
//!
//! Every call recomputes from scratch; nothing is cached between calls.

use crate::similarity::jaccard;
use data_loader::{LikedSets, SeriesId, UserId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Default cap on the number of recommended series
pub const MAX_RECOMMENDATIONS: usize = 10;

/// A reader selected into the neighbor pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub user_id: UserId,
    pub similarity: f64,
}

/// A recommended series with the number of neighbors who liked it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSeries {
    pub series_id: SeriesId,
    pub neighbor_count: u32,
}

/// User-based collaborative filtering over liked-series sets
#[derive(Debug, Clone)]
pub struct CollaborativeRecommender {
    /// Maximum number of series returned
    max_results: usize,
}

impl CollaborativeRecommender {
    pub fn new() -> Self {
        Self {
            max_results: MAX_RECOMMENDATIONS,
        }
    }

    /// Configure the output cap (default: [`MAX_RECOMMENDATIONS`])
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Recommend series ids for `target`, best first.
    ///
    /// `limit` caps the neighbor pool, not the output.
    pub fn recommend(&self, target: &str, liked_sets: &LikedSets, limit: usize) -> Vec<SeriesId> {
        self.recommend_scored(target, liked_sets, limit)
            .into_iter()
            .map(|scored| scored.series_id)
            .collect()
    }

    /// Same as [`recommend`](Self::recommend) but keeps the neighbor counts
    #[instrument(skip(self, liked_sets), fields(users = liked_sets.len()))]
    pub fn recommend_scored(
        &self,
        target: &str,
        liked_sets: &LikedSets,
        limit: usize,
    ) -> Vec<ScoredSeries> {
        let Some(target_likes) = liked_sets.get(target) else {
            debug!("Unknown reader {}, nothing to recommend", target);
            return Vec::new();
        };

        let neighbors = self.find_neighbors(target, liked_sets, limit);
        debug!("Found {} neighbors", neighbors.len());

        let tally = self.tally_candidates(&neighbors, liked_sets, target_likes);

        let mut scored: Vec<ScoredSeries> = tally
            .into_iter()
            .map(|(series_id, neighbor_count)| ScoredSeries {
                series_id,
                neighbor_count,
            })
            .collect();
        scored.sort_unstable_by(|a, b| {
            b.neighbor_count
                .cmp(&a.neighbor_count)
                .then_with(|| a.series_id.cmp(&b.series_id))
        });
        scored.truncate(self.max_results);

        debug!("Recommending {} series", scored.len());
        scored
    }

    /// The `limit` readers most similar to `target`, most similar first.
    ///
    /// Readers with zero similarity are never neighbors. Returns an empty
    /// pool when `target` is unknown.
    pub fn find_neighbors(
        &self,
        target: &str,
        liked_sets: &LikedSets,
        limit: usize,
    ) -> Vec<Neighbor> {
        let Some(target_likes) = liked_sets.get(target) else {
            return Vec::new();
        };
        if limit == 0 {
            return Vec::new();
        }

        let mut neighbors: Vec<Neighbor> = liked_sets
            .par_iter()
            .filter(|(user_id, _)| user_id.as_str() != target)
            .filter_map(|(user_id, likes)| {
                let similarity = jaccard(target_likes, likes);
                (similarity > 0.0).then(|| Neighbor {
                    user_id: user_id.clone(),
                    similarity,
                })
            })
            .collect();

        neighbors.sort_unstable_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        neighbors.truncate(limit);
        neighbors
    }

    /// Count how many neighbors liked each series the target has not liked
    pub fn tally_candidates(
        &self,
        neighbors: &[Neighbor],
        liked_sets: &LikedSets,
        target_likes: &HashSet<SeriesId>,
    ) -> HashMap<SeriesId, u32> {
        neighbors
            .par_iter()
            .fold(HashMap::new, |mut local_counts, neighbor| {
                if let Some(likes) = liked_sets.get(&neighbor.user_id) {
                    for &series_id in likes {
                        if !target_likes.contains(&series_id) {
                            *local_counts.entry(series_id).or_insert(0) += 1;
                        }
                    }
                }
                local_counts
            })
            .reduce(HashMap::new, |mut acc, local_counts| {
                for (series_id, count) in local_counts {
                    *acc.entry(series_id).or_insert(0) += count;
                }
                acc
            })
    }
}

impl Default for CollaborativeRecommender {
    fn default() -> Self {
        Self::new()
    }
}

/// Recommend series for `target` from raw `(user, liked set)` pairs.
///
/// Builds the liked-set mapping (unioning repeated users) and runs a
/// default [`CollaborativeRecommender`] with a neighbor pool of `limit`.
pub fn recommend<I>(target: &str, pairs: I, limit: usize) -> Vec<SeriesId>
where
    I: IntoIterator<Item = (UserId, HashSet<SeriesId>)>,
{
    let liked_sets = LikedSets::from_pairs(pairs);
    CollaborativeRecommender::new().recommend(target, &liked_sets, limit)
}
