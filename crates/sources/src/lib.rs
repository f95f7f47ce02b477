//! # Sources Crate
//!
//! Recommendation sources for the series catalog.
//!
//! ## Components
//!
//! ### Collaborative Source
//! User-based collaborative filtering with Jaccard similarity:
//! - "Readers whose likes overlap with yours also liked..."
//! - Returns at most [`MAX_RECOMMENDATIONS`] series
//!
//! ### Popular Source
//! Global top series by like count, used as the fallback when the
//! collaborative source comes back empty.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CollaborativeRecommender, PopularSource};
//! use data_loader::DataIndex;
//! use std::sync::Arc;
//!
//! let data_index = Arc::new(DataIndex::load_from_files("data/catalog".as_ref())?);
//!
//! let recommender = CollaborativeRecommender::new();
//! let mut series = recommender.recommend("reader-42", data_index.liked_sets(), 50);
//! if series.is_empty() {
//!     let popular = PopularSource::new(data_index.clone());
//!     series = popular.get_top_series(None, 10).iter().map(|p| p.series_id).collect();
//! }
//! ```

pub mod collaborative;
pub mod popular;
pub mod similarity;

pub use collaborative::{
    CollaborativeRecommender, MAX_RECOMMENDATIONS, Neighbor, ScoredSeries, recommend,
};
pub use popular::{PopularSeries, PopularSource};
pub use similarity::jaccard;
