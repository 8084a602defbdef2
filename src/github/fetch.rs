// src/github/fetch.rs
// =============================================================================
// The fetch boundary between the crawl engine and the GitHub API.
//
// ProfileFetcher is the seam: the engine only ever talks to this trait, so
// tests can drive it with an in-memory fetcher while production uses the
// reqwest-backed GithubClient from api.rs.
// =============================================================================

use async_trait::async_trait;
use thiserror::Error;

// A raw profile as fetched from the API, follower/following counts still
// attached. The engine turns this into a UserRecord once it has decided
// whether the lists are fetched or skipped; the counts are dropped then.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub public_repos: u32,
    pub public_gists: u32,
    pub avatar: String,
    pub followers_count: u32,
    pub followings_count: u32,
}

/// Remaining API quota, reported after a crawl. Informational only; the
/// crawler never paces itself on it.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub max: u32,
    pub remaining: u32,
}

// Anything that can go wrong resolving one profile or list. A single
// FetchError fails the whole wave it occurred in; nothing is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (connect failure, timeout).
    #[error("request for {resource} failed: {source}")]
    Request {
        resource: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with a non-success status.
    #[error("{resource} returned HTTP {status}")]
    Status {
        resource: String,
        status: reqwest::StatusCode,
    },
    /// The response body did not match the expected shape.
    #[error("malformed response for {resource}: {source}")]
    Malformed {
        resource: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fetches single users and their connection lists from the remote API.
#[async_trait]
pub trait ProfileFetcher {
    /// Fetches the base profile for one username, counts included.
    async fn profile(&self, username: &str) -> Result<Profile, FetchError>;

    /// Fetches the complete followers list, in API order.
    async fn followers(&self, username: &str) -> Result<Vec<String>, FetchError>;

    /// Fetches the complete followings list, in API order.
    async fn followings(&self, username: &str) -> Result<Vec<String>, FetchError>;
}
