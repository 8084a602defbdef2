// src/github/mod.rs
// =============================================================================
// This module is the crawler's I/O boundary with the GitHub API.
//
// Submodules:
// - fetch: the ProfileFetcher trait, raw Profile shape, and FetchError
// - api: the reqwest-backed GithubClient implementation
// =============================================================================

mod api;
mod fetch;

pub use api::GithubClient;
pub use fetch::{FetchError, Profile, ProfileFetcher, RateLimit};
