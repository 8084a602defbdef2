// src/config.rs
// =============================================================================
// Environment-driven configuration.
//
// - GH_CLIENT_ID / GH_CLIENT_SECRET: API credentials, appended as query
//   parameters. Missing credentials are not fatal; unauthenticated calls
//   just run under GitHub's lower quota.
// - GSG_FOLLOWERS_LIMIT / GSG_FOLLOWINGS_LIMIT: fan-out limits. An account
//   with that many or more connections in a direction has its list skipped.
//   Negative means unlimited.
// - GSG_CONCURRENCY: how many profile fetches one crawl wave runs at once.
// =============================================================================

use std::env;
use std::str::FromStr;

pub const DEFAULT_FOLLOWERS_LIMIT: i64 = 25;
pub const DEFAULT_FOLLOWINGS_LIMIT: i64 = 15;
pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub followers_limit: i64,
    pub followings_limit: i64,
    pub concurrency: usize,
}

impl Config {
    /// Builds the configuration from environment variables, falling back to
    /// the defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        Config {
            client_id: env::var("GH_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("GH_CLIENT_SECRET").unwrap_or_default(),
            followers_limit: parse_or(env::var("GSG_FOLLOWERS_LIMIT").ok(), DEFAULT_FOLLOWERS_LIMIT),
            followings_limit: parse_or(
                env::var("GSG_FOLLOWINGS_LIMIT").ok(),
                DEFAULT_FOLLOWINGS_LIMIT,
            ),
            // A wave always needs at least one slot to make progress.
            concurrency: parse_or(env::var("GSG_CONCURRENCY").ok(), DEFAULT_CONCURRENCY).max(1),
        }
    }

    /// True when both halves of the client credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

// Parses an optional environment value, keeping the default when the
// variable is unset or not a valid number.
fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
