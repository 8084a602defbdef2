// src/main.rs
// =============================================================================
// Entry point of the CLI application.
//
// What happens here:
// 1. Parse arguments and environment configuration
// 2. Load the user cache, warn (don't fail) if it is unusable
// 3. Run the breadth-first crawl
// 4. Merge the crawled users into the cache and persist it
// 5. Build the graph dataset and print or save it
// 6. Report the remaining API quota
//
// Exit codes: 0 = success, 2 = error (a failed crawl produces no graph).
// =============================================================================

mod cache;
mod cli;
mod config;
mod crawl;
mod github;
mod graph;
mod user;

use anyhow::Result;
use clap::Parser;

use cache::{UserCache, CACHE_FILE_NAME};
use cli::Cli;
use config::Config;
use crawl::CrawlEngine;
use github::GithubClient;
use graph::GraphData;
use user::Connections;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = Config::from_env();

    if !config.has_credentials() {
        eprintln!("⚠️  No API credentials configured; running under the lower unauthenticated quota");
    }

    println!(
        "🔍 Crawling the social neighborhood of {} (depth {})",
        cli.user, cli.depth
    );

    let mut cache = UserCache::load(CACHE_FILE_NAME);
    if cache.is_empty() {
        println!("📦 Starting with an empty cache");
    } else {
        println!("📦 Cache loaded: {} user(s)", cache.len());
    }

    let client = GithubClient::new(&config)?;
    let engine = CrawlEngine::new(
        client.clone(),
        config.followers_limit,
        config.followings_limit,
        config.concurrency,
    );

    // A fetch failure anywhere in a wave aborts the whole crawl here.
    let users = engine.crawl(&cache, &cli.user, cli.depth, cli.refresh).await?;
    println!("📄 Crawled {} user(s)", users.len());

    cache.merge(&users, cli.refresh);
    match cache.persist() {
        Ok(()) => println!("💾 Cache updated: {} user(s)", cache.len()),
        // The crawl result in memory is still good; persistence is the
        // only thing that failed.
        Err(err) => eprintln!("⚠️  Warning: {err}"),
    }

    let graph = graph::build(&users);
    println!(
        "🌐 Graph built: {} node(s), {} edge(s)\n",
        graph.nodes.len(),
        graph.edges.len()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        print_summary(&graph);
    }

    if let Some(path) = &cli.save {
        std::fs::write(path, serde_json::to_string_pretty(&graph)?)?;
        println!("💾 Graph dataset written to {}", path.display());
    }

    match client.rate_limit().await {
        Ok(limit) => println!("📊 {} of {} API call(s) remaining", limit.remaining, limit.max),
        Err(err) => eprintln!("⚠️  Warning: could not query the rate limit: {err}"),
    }

    Ok(0)
}

// Prints the crawled users as a human-readable table.
fn print_summary(graph: &GraphData) {
    println!("{:<22} {:<28} {:<12} {:<12}", "USERNAME", "NAME", "FOLLOWERS", "FOLLOWINGS");
    println!("{}", "=".repeat(76));

    for node in &graph.nodes {
        let name = node.name.as_deref().unwrap_or("");
        let name_display = if name.chars().count() > 25 {
            let short: String = name.chars().take(25).collect();
            format!("{short}...")
        } else {
            name.to_string()
        };

        println!(
            "{:<22} {:<28} {:<12} {:<12}",
            node.username,
            name_display,
            describe_connections(&node.followers),
            describe_connections(&node.followings),
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   👤 Users: {}", graph.nodes.len());
    println!("   🔗 Edges: {}", graph.edges.len());
}

fn describe_connections(connections: &Connections) -> String {
    match connections {
        Connections::None => "-".to_string(),
        Connections::Skipped => "skipped".to_string(),
        Connections::Resolved(users) => users.len().to_string(),
    }
}
