//! Core domain types for the series catalog and reader likes.
//!
//! Readers like series (comics or novels). The recommender only ever needs
//! the "who liked what" relation, which lives in [`LikedSets`]; the rest of
//! the catalog is used to enrich recommendations for display.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a reader account (opaque string, e.g. a GUID)
pub type UserId = String;

/// Identifier of a published series
pub type SeriesId = u32;

// =============================================================================
// Catalog Types
// =============================================================================

/// A reader account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
}

/// Format of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Comic,
    Novel,
}

/// A published series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub title: String,
    pub kind: SeriesKind,
    /// Storage key of the cover thumbnail, `None` when the author never uploaded one
    pub thumbnail: Option<String>,
}

/// A single "reader liked series" event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: UserId,
    pub series_id: SeriesId,
    /// Unix timestamp of the like
    pub timestamp: i64,
}

/// Precomputed statistics for a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub like_count: u32,
}

impl SeriesStats {
    /// Counts past `u32::MAX` saturate
    pub fn from_like_count(count: usize) -> Self {
        Self {
            like_count: u32::try_from(count).unwrap_or(u32::MAX),
        }
    }
}

// =============================================================================
// LikedSets
// =============================================================================

/// Mapping from reader to the set of series they liked.
///
/// Set semantics: liking the same series twice is recorded once, and
/// building from pairs that mention a user more than once unions the sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikedSets {
    sets: HashMap<UserId, HashSet<SeriesId>>,
}

impl LikedSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(user, liked series)` pairs in any order
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (UserId, HashSet<SeriesId>)>,
    {
        pairs.into_iter().collect()
    }

    /// Record that `user_id` liked `series_id`
    pub fn insert(&mut self, user_id: UserId, series_id: SeriesId) {
        self.sets.entry(user_id).or_default().insert(series_id);
    }

    /// Make sure `user_id` has an entry, even when they liked nothing yet
    pub fn ensure_user(&mut self, user_id: UserId) {
        self.sets.entry(user_id).or_default();
    }

    pub fn get(&self, user_id: &str) -> Option<&HashSet<SeriesId>> {
        self.sets.get(user_id)
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.sets.contains_key(user_id)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, UserId, HashSet<SeriesId>> {
        self.sets.iter()
    }

    pub fn par_iter(&self) -> rayon::collections::hash_map::Iter<'_, UserId, HashSet<SeriesId>> {
        self.sets.par_iter()
    }

    /// Number of users with an entry
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl FromIterator<(UserId, HashSet<SeriesId>)> for LikedSets {
    fn from_iter<T: IntoIterator<Item = (UserId, HashSet<SeriesId>)>>(iter: T) -> Self {
        let mut sets: HashMap<UserId, HashSet<SeriesId>> = HashMap::new();
        for (user_id, liked) in iter {
            sets.entry(user_id).or_default().extend(liked);
        }
        Self { sets }
    }
}

impl FromIterator<(UserId, SeriesId)> for LikedSets {
    fn from_iter<T: IntoIterator<Item = (UserId, SeriesId)>>(iter: T) -> Self {
        let mut liked_sets = Self::new();
        for (user_id, series_id) in iter {
            liked_sets.insert(user_id, series_id);
        }
        liked_sets
    }
}

impl<'a> IntoIterator for &'a LikedSets {
    type Item = (&'a UserId, &'a HashSet<SeriesId>);
    type IntoIter = hash_map::Iter<'a, UserId, HashSet<SeriesId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

// =============================================================================
// DataIndex - The Core In-Memory Store
// =============================================================================

/// Holds the catalog, the likes, and the indices built over them.
#[derive(Debug, Default)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) series: HashMap<SeriesId, Series>,

    /// Liked series per user
    pub(crate) liked_sets: LikedSets,
    /// All likes received by each series
    pub(crate) series_likes: HashMap<SeriesId, Vec<Like>>,

    // Precomputed statistics
    pub(crate) series_stats: HashMap<SeriesId, SeriesStats>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn get_series(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(&id)
    }

    /// Liked-series sets for every known user
    pub fn liked_sets(&self) -> &LikedSets {
        &self.liked_sets
    }

    /// Series liked by a user, `None` when the user has never liked anything
    pub fn get_user_likes(&self, user_id: &str) -> Option<&HashSet<SeriesId>> {
        self.liked_sets.get(user_id)
    }

    /// All likes received by a series, empty when it has none
    pub fn get_series_likes(&self, series_id: SeriesId) -> &[Like] {
        self.series_likes
            .get(&series_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_series_stats(&self, series_id: SeriesId) -> Option<&SeriesStats> {
        self.series_stats.get(&series_id)
    }

    /// Ids of every series in the catalog, sorted ascending
    pub fn get_all_series_ids(&self) -> Vec<SeriesId> {
        let mut ids: Vec<SeriesId> = self.series.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of every user, sorted ascending
    pub fn get_all_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn insert_series(&mut self, series: Series) {
        self.series.insert(series.id, series);
    }

    /// Insert a like and update indices.
    ///
    /// A repeated like of the same series by the same user is ignored.
    pub fn insert_like(&mut self, like: Like) {
        let already_liked = self
            .liked_sets
            .get(&like.user_id)
            .is_some_and(|liked| liked.contains(&like.series_id));
        if already_liked {
            return;
        }

        self.liked_sets.insert(like.user_id.clone(), like.series_id);
        self.series_likes
            .entry(like.series_id)
            .or_default()
            .push(like);
    }

    /// Get counts for debugging/validation: (users, series, likes)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_likes = self.series_likes.values().map(|v| v.len()).sum();
        (self.users.len(), self.series.len(), total_likes)
    }
}
