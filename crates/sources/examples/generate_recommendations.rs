//! Example: Recommend series for one reader
//!
//! Run with:
//! cargo run --package sources --example generate_recommendations -- [data_dir] [user_id]
//!
//! Loads a catalog export, prints the reader's nearest neighbors and the
//! collaborative recommendations, and falls back to the popular ranking
//! when collaborative filtering has nothing to offer.

use anyhow::{Context, anyhow};
use data_loader::DataIndex;
use sources::{CollaborativeRecommender, PopularSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const NEIGHBOR_LIMIT: usize = 50;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().map_or_else(|| PathBuf::from("data/catalog"), PathBuf::from);

    println!("=== Inkwell Recommendation Example ===\n");

    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&data_dir)
            .with_context(|| format!("Failed to load catalog from {}", data_dir.display()))?,
    );
    let (users, series, likes) = data_index.counts();
    println!(
        "Loaded {} readers, {} series, {} likes in {:?}\n",
        users,
        series,
        likes,
        start.elapsed()
    );

    let user_id = match args.next() {
        Some(id) => id,
        None => data_index
            .get_all_user_ids()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Catalog has no readers"))?,
    };
    let liked_count = data_index.get_user_likes(&user_id).map_or(0, |likes| likes.len());
    println!("Target reader: {} ({} liked series)\n", user_id, liked_count);

    let recommender = CollaborativeRecommender::new();

    let start = Instant::now();
    let neighbors = recommender.find_neighbors(&user_id, data_index.liked_sets(), NEIGHBOR_LIMIT);
    println!("Found {} neighbors in {:?}", neighbors.len(), start.elapsed());
    for neighbor in neighbors.iter().take(5) {
        println!("  - {} (similarity {:.3})", neighbor.user_id, neighbor.similarity);
    }

    let start = Instant::now();
    let scored = recommender.recommend_scored(&user_id, data_index.liked_sets(), NEIGHBOR_LIMIT);
    println!("\nGenerated {} recommendations in {:?}", scored.len(), start.elapsed());
    for (i, s) in scored.iter().enumerate() {
        if let Some(series) = data_index.get_series(s.series_id) {
            println!(
                "  {}. {} - liked by {} similar readers",
                i + 1,
                series.title,
                s.neighbor_count
            );
        }
    }

    if scored.is_empty() {
        println!("\nNothing collaborative, popular series instead:");
        let popular = PopularSource::new(data_index.clone());
        let exclude = data_index.get_user_likes(&user_id);
        let top_series = popular.get_top_series(exclude, recommender.max_results());
        for (i, top) in top_series.iter().enumerate() {
            if let Some(series) = data_index.get_series(top.series_id) {
                println!("  {}. {} - {} likes", i + 1, series.title, top.like_count);
            }
        }
    }

    Ok(())
}
