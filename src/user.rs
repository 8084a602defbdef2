// src/user.rs
// =============================================================================
// This module defines the user record shared by the crawler, the cache and
// the graph builder.
//
// A record's follower/following lists are a three-way variant:
// - None: the account had zero connections in that direction
// - Skipped: the count exceeded the configured limit, list never fetched
// - Resolved: the full list, in API order
//
// A list is never partial: it is fully resolved or not fetched at all.
// =============================================================================

use serde::{Deserialize, Serialize};

// One direction (followers or followings) of a user's connections.
//
// Serializes externally tagged: "none", "skipped", or
// {"resolved": ["alice", "bob"]}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connections {
    /// The account has no connections in this direction.
    None,
    /// The list was not fetched because the count exceeded the limit.
    Skipped,
    /// The complete list of usernames, in the order the API returned them.
    Resolved(Vec<String>),
}

impl Connections {
    /// The usernames behind this variant. Empty for None and Skipped, so
    /// skipped accounts never feed the next crawl frontier.
    pub fn usernames(&self) -> &[String] {
        match self {
            Connections::Resolved(users) => users,
            Connections::None | Connections::Skipped => &[],
        }
    }
}

// A fully resolved GitHub user as stored in the cache and handed to the
// graph builder. The raw follower/following counts from the API are not
// kept; the Connections variants carry the outcome of the limit decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// GitHub's numeric id, stable across username changes.
    pub id: u64,
    /// The login used for lookups and fetch requests.
    pub username: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub public_repos: u32,
    pub public_gists: u32,
    /// Avatar image URL, carried as data (never downloaded).
    pub avatar: String,
    /// RFC 3339 timestamp of when this record was fetched.
    pub last_updated: String,
    pub followers: Connections,
    pub followings: Connections,
}
