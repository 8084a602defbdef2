// src/github/api.rs
// =============================================================================
// The reqwest-backed GitHub API client.
//
// Endpoints used:
// - GET /users/{username}            -> profile attributes + counts
// - GET /users/{username}/followers  -> list of users following them
// - GET /users/{username}/following  -> list of users they follow
// - GET /rate_limit                  -> remaining API quota
//
// Credentials (when configured) travel as client_id/client_secret query
// parameters; without them GitHub applies the lower unauthenticated quota.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::fetch::{FetchError, Profile, ProfileFetcher, RateLimit};
use crate::config::Config;

const API_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "github-social-graph";

// Shape of GET /users/{username}. Only the fields we carry forward.
#[derive(Debug, Deserialize)]
struct ApiUser {
    id: u64,
    login: String,
    name: Option<String>,
    company: Option<String>,
    location: Option<String>,
    blog: Option<String>,
    email: Option<String>,
    public_repos: u32,
    public_gists: u32,
    avatar_url: String,
    followers: u32,
    following: u32,
}

impl From<ApiUser> for Profile {
    fn from(user: ApiUser) -> Self {
        Profile {
            id: user.id,
            username: user.login,
            name: user.name,
            company: user.company,
            location: user.location,
            blog: user.blog,
            email: user.email,
            public_repos: user.public_repos,
            public_gists: user.public_gists,
            avatar: user.avatar_url,
            followers_count: user.followers,
            followings_count: user.following,
        }
    }
}

// Entries of the /followers and /following lists; we only need the login.
#[derive(Debug, Deserialize)]
struct ApiListEntry {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRateLimit {
    resources: ApiRateLimitResources,
}

#[derive(Debug, Deserialize)]
struct ApiRateLimitResources {
    core: ApiRateLimitCore,
}

#[derive(Debug, Deserialize)]
struct ApiRateLimitCore {
    limit: u32,
    remaining: u32,
}

// Cloning is cheap: the inner reqwest client is reference-counted.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    // (client_id, client_secret) pairs appended to every request; empty
    // when running unauthenticated.
    credentials: Vec<(String, String)>,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(GithubClient {
            client,
            base_url: API_BASE_URL.to_string(),
            credentials: credential_params(config),
        })
    }

    // Performs one GET against the API and deserializes the JSON body.
    // Non-success statuses and undecodable bodies both count as fetch
    // failures; `resource` names what was being fetched for the error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&self.credentials)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                resource: resource.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource: resource.to_string(),
                status,
            });
        }

        response.json().await.map_err(|source| FetchError::Malformed {
            resource: resource.to_string(),
            source,
        })
    }

    /// Queries the remaining core API quota.
    pub async fn rate_limit(&self) -> Result<RateLimit, FetchError> {
        let body: ApiRateLimit = self.get_json("/rate_limit", "rate limit").await?;
        Ok(RateLimit {
            max: body.resources.core.limit,
            remaining: body.resources.core.remaining,
        })
    }
}

#[async_trait]
impl ProfileFetcher for GithubClient {
    async fn profile(&self, username: &str) -> Result<Profile, FetchError> {
        let user: ApiUser = self
            .get_json(&format!("/users/{username}"), &format!("user '{username}'"))
            .await?;
        Ok(user.into())
    }

    async fn followers(&self, username: &str) -> Result<Vec<String>, FetchError> {
        let entries: Vec<ApiListEntry> = self
            .get_json(
                &format!("/users/{username}/followers"),
                &format!("followers of '{username}'"),
            )
            .await?;
        Ok(entries.into_iter().map(|entry| entry.login).collect())
    }

    async fn followings(&self, username: &str) -> Result<Vec<String>, FetchError> {
        let entries: Vec<ApiListEntry> = self
            .get_json(
                &format!("/users/{username}/following"),
                &format!("followings of '{username}'"),
            )
            .await?;
        Ok(entries.into_iter().map(|entry| entry.login).collect())
    }
}

// Turns configured credentials into query parameters. Both halves must be
// present; a lone id or secret is treated as no credentials at all.
fn credential_params(config: &Config) -> Vec<(String, String)> {
    if config.has_credentials() {
        vec![
            ("client_id".to_string(), config.client_id.clone()),
            ("client_secret".to_string(), config.client_secret.clone()),
        ]
    } else {
        Vec::new()
    }
}
