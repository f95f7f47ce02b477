//! Server crate for the Inkwell series recommender.
//!
//! Wraps the recommendation sources in the contract a web handler needs:
//! fallback to popular series, catalog enrichment, and pagination.

pub mod orchestrator;
pub mod pagination;
pub mod thumbnails;

pub use orchestrator::{
    DEFAULT_NEIGHBOR_LIMIT, RecommendationOrchestrator, RecommendationSource,
    SeriesRecommendation,
};
pub use pagination::{PageRequest, PagedList, RequestError};
pub use thumbnails::{DEFAULT_THUMBNAIL_URL, PublicUrlResolver, ThumbnailResolver};
