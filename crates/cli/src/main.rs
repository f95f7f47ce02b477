use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, UserId};
use rand::seq::IndexedRandom;
use server::{
    PageRequest, PagedList, PublicUrlResolver, RecommendationOrchestrator, SeriesRecommendation,
    DEFAULT_NEIGHBOR_LIMIT,
};
use sources::{PopularSource, MAX_RECOMMENDATIONS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Inkwell - series recommendations for readers
#[derive(Parser)]
#[command(name = "inkwell-recs")]
#[command(about = "Series recommendations using collaborative filtering", long_about = None)]
struct Cli {
    /// Directory holding users.dat, series.dat and likes.dat
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    /// Base URL thumbnail keys are resolved against
    #[arg(long, default_value = "")]
    thumbnail_base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get series recommendations for a reader
    Recommend {
        /// Reader to recommend for
        #[arg(long)]
        user_id: UserId,

        /// Page to show (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Recommendations per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Number of similar readers to consult
        #[arg(long, default_value_t = DEFAULT_NEIGHBOR_LIMIT)]
        neighbors: usize,

        /// Popular fallback only counts likes since this unix timestamp
        #[arg(long)]
        since: Option<i64>,

        /// Serve the popular fallback if collaborative filtering takes longer (ms)
        #[arg(long)]
        time_budget_ms: Option<u64>,

        /// Show why each series was recommended
        #[arg(long)]
        explain: bool,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a reader's likes and most similar readers
    User {
        #[arg(long)]
        user_id: UserId,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the most liked series
    Top {
        #[arg(long, default_value_t = MAX_RECOMMENDATIONS)]
        limit: usize,

        /// Only count likes since this unix timestamp
        #[arg(long)]
        since: Option<i64>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&cli.data_dir).context("Failed to load catalog")?,
    );
    let (users, series, likes) = data_index.counts();
    info!(
        "Loaded {} readers, {} series, {} likes in {:?}",
        users,
        series,
        likes,
        start.elapsed()
    );

    let orchestrator = RecommendationOrchestrator::new(data_index.clone())
        .with_thumbnail_resolver(PublicUrlResolver::new(cli.thumbnail_base_url));

    match cli.command {
        Commands::Recommend {
            user_id,
            page,
            page_size,
            neighbors,
            since,
            time_budget_ms,
            explain,
            json,
        } => {
            let mut orchestrator = orchestrator.with_neighbor_limit(neighbors);
            if let Some(since) = since {
                orchestrator = orchestrator.with_popular_since(since);
            }
            if let Some(ms) = time_budget_ms {
                orchestrator = orchestrator.with_time_budget(Duration::from_millis(ms));
            }
            let request = PageRequest::new(user_id, page, page_size)?;
            handle_recommend(&orchestrator, &request, explain, json).await?
        }
        Commands::User { user_id, json } => handle_user(&orchestrator, &user_id, json)?,
        Commands::Top { limit, since } => handle_top(data_index, limit, since),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    request: &PageRequest,
    explain: bool,
    json: bool,
) -> Result<()> {
    let page = orchestrator.get_recommendations(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_recommendations(&page, explain);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(orchestrator: &RecommendationOrchestrator, user_id: &str, json: bool) -> Result<()> {
    let data_index = orchestrator.data_index();
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("Reader {} not found", user_id))?;

    let mut liked: Vec<_> = data_index
        .get_user_likes(user_id)
        .map(|likes| likes.iter().copied().collect())
        .unwrap_or_default();
    liked.sort_unstable();
    let similar = orchestrator.similar_readers(user_id, 5);

    if json {
        let profile = serde_json::json!({
            "user": user,
            "liked_series": liked,
            "similar_readers": similar,
        });
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("{}", format!("Reader: {} ({})", user.display_name, user.id).bold().blue());
    println!("{}Liked series: {}", "• ".green(), liked.len());
    for series_id in &liked {
        if let Some(series) = data_index.get_series(*series_id) {
            println!("  - {} [{:?}]", series.title, series.kind);
        }
    }

    println!("{}Most similar readers:", "• ".cyan());
    for neighbor in &similar {
        let name = data_index
            .get_user(&neighbor.user_id)
            .map_or(neighbor.user_id.as_str(), |u| u.display_name.as_str());
        println!("  - {} (similarity {:.2})", name, neighbor.similarity);
    }
    Ok(())
}

/// Handle the 'top' command
fn handle_top(data_index: Arc<DataIndex>, limit: usize, since: Option<i64>) {
    let mut popular = PopularSource::new(data_index.clone());
    if let Some(since) = since {
        popular = popular.with_since(since);
    }

    println!("{}", "Most liked series:".bold().blue());
    for (rank, top) in popular.get_top_series(None, limit).iter().enumerate() {
        let title = data_index
            .get_series(top.series_id)
            .map_or("<unknown>", |s| s.title.as_str());
        println!(
            "{}. {} - {} likes",
            (rank + 1).to_string().green(),
            title,
            top.like_count
        );
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let all_users = orchestrator.data_index().get_all_user_ids();
    if all_users.is_empty() {
        return Err(anyhow!("Catalog has no readers to benchmark with"));
    }
    if requests == 0 {
        return Err(anyhow!("Benchmark needs at least one request"));
    }

    let user_ids: Vec<UserId> = {
        let mut rng = rand::rng();
        (0..requests)
            .filter_map(|_| all_users.choose(&mut rng).cloned())
            .collect()
    };

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for user_id in user_ids {
        let orchestrator = orchestrator.clone();
        let permits = permits.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let request = PageRequest::new(user_id, 1, MAX_RECOMMENDATIONS)?;
            let start = Instant::now();
            orchestrator.get_recommendations(&request).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let sum: Duration = timings.iter().sum();
    let avg_latency = sum / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(page: &PagedList<SeriesRecommendation>, explain: bool) {
    println!("{}", "Series Recommendations:".bold().blue());
    if page.items.is_empty() {
        println!("  (nothing to recommend)");
    }

    let offset = (page.page_number - 1) * page.page_size;
    for (i, rec) in page.items.iter().enumerate() {
        println!(
            "{}. {} [{:?}] - {} likes",
            (offset + i + 1).to_string().green(),
            rec.title,
            rec.kind,
            rec.like_count
        );
        if explain {
            println!("   {:?}: {}", rec.source, rec.explanation);
            println!("   Thumbnail: {}", rec.thumbnail_url);
        }
    }

    println!(
        "Page {} of {} ({} total)",
        page.page_number,
        page.total_pages(),
        page.total_count
    );
}
