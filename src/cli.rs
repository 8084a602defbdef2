// src/cli.rs
// =============================================================================
// Command-line interface, built with clap's derive API.
//
// Example: github-social-graph --user octocat --depth 2 --save graph.json
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "github-social-graph",
    version,
    about = "Crawl the social connections around a GitHub user into a graph dataset",
    long_about = "github-social-graph walks a user's followers and followings breadth-first \
                  out to the given depth, caches every fetched profile locally, and emits a \
                  node/edge dataset for visualization."
)]
pub struct Cli {
    /// GitHub username to start from
    #[arg(short, long)]
    pub user: String,

    /// How many follower/following levels to expand beyond the root
    #[arg(short, long)]
    pub depth: u32,

    /// Re-fetch every user from the API, overwriting cached entries
    #[arg(short, long)]
    pub refresh: bool,

    /// Write the graph dataset to FILE (defaults to graph.json)
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "graph.json"
    )]
    pub save: Option<PathBuf>,

    /// Print the graph dataset as JSON instead of the summary table
    #[arg(long)]
    pub json: bool,
}
