//! # Data Loader Crate
//!
//! Loads the catalog export (readers, series, likes) and indexes it for the
//! recommender.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, Series, Like, LikedSets, DataIndex)
//! - **parser**: Parse the `::`-separated `.dat` files into Rust structs
//! - **index**: Build the DataIndex, compute statistics, validate references
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/catalog"))?;
//! let liked = index.get_user_likes("reader-42");
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    SeriesId,
    UserId,
    // Core types
    DataIndex,
    Like,
    LikedSets,
    Series,
    SeriesKind,
    SeriesStats,
    User,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_data_index_creation() {
        let index = DataIndex::new();
        assert_eq!(index.counts(), (0, 0, 0));
    }

    #[test]
    fn test_insert_series() {
        let mut index = DataIndex::new();
        index.insert_series(Series {
            id: 1,
            title: "Moon Harbor".to_string(),
            kind: SeriesKind::Comic,
            thumbnail: Some("covers/1.png".to_string()),
        });

        let retrieved = index.get_series(1).unwrap();
        assert_eq!(retrieved.title, "Moon Harbor");
        assert_eq!(retrieved.kind, SeriesKind::Comic);
    }

    #[test]
    fn test_insert_like_is_deduplicated() {
        let mut index = DataIndex::new();
        let like = Like {
            user_id: "a".to_string(),
            series_id: 5,
            timestamp: 1,
        };

        index.insert_like(like.clone());
        index.insert_like(Like { timestamp: 2, ..like });

        assert_eq!(index.get_user_likes("a").unwrap().len(), 1);
        assert_eq!(index.get_series_likes(5).len(), 1);
        assert_eq!(index.get_series_likes(5)[0].timestamp, 1);
    }

    #[test]
    fn test_liked_sets_from_pairs_unions_repeated_users() {
        let liked = LikedSets::from_pairs(vec![
            ("a".to_string(), HashSet::from([1, 2])),
            ("b".to_string(), HashSet::from([3])),
            ("a".to_string(), HashSet::from([2, 4])),
        ]);

        assert_eq!(liked.len(), 2);
        assert_eq!(liked.get("a").unwrap(), &HashSet::from([1, 2, 4]));
    }

    #[test]
    fn test_liked_sets_from_like_pairs() {
        let liked: LikedSets = vec![
            ("a".to_string(), 1),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
        ]
        .into_iter()
        .collect();

        assert_eq!(liked.get("a").unwrap().len(), 1);
        assert!(liked.contains_user("b"));
    }

    #[test]
    fn test_series_stats_like_count_saturates() {
        assert_eq!(SeriesStats::from_like_count(7).like_count, 7);
        assert_eq!(SeriesStats::from_like_count(u32::MAX as usize + 1).like_count, u32::MAX);
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new();
        assert!(index.get_user("nobody").is_none());
        assert!(index.get_series(999).is_none());
        assert!(index.get_user_likes("nobody").is_none());
        assert!(index.get_series_likes(999).is_empty());
        assert!(index.get_all_series_ids().is_empty());
    }
}
