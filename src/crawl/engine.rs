// src/crawl/engine.rs
// =============================================================================
// Breadth-first expansion of a user's social neighborhood.
//
// How it works:
// 1. Resolve the root user; it is always the first record of the result
// 2. Seed the frontier with the root's followers and followings
// 3. For each depth level, resolve every frontier user as one concurrent
//    wave, then build the next frontier from the wave's resolved lists
// 4. Stop when the depth is exhausted or the frontier runs dry
//
// Invariants:
// - A username is resolved at most once per crawl (the visited set covers
//   every level, so mutual followers never cause a refetch)
// - A wave is atomic: one failed resolve fails the whole crawl
// - Levels never overlap: wave N completes before wave N+1 dispatches
// - Records append in dispatch order, which keeps results deterministic
//   for a given API state
// =============================================================================

use std::collections::HashSet;

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::cache::UserCache;
use crate::github::{FetchError, ProfileFetcher};
use crate::user::{Connections, UserRecord};

pub struct CrawlEngine<F> {
    fetcher: F,
    followers_limit: i64,
    followings_limit: i64,
    concurrency: usize,
}

impl<F: ProfileFetcher + Sync> CrawlEngine<F> {
    /// A negative limit means unlimited; `concurrency` caps how many
    /// resolves one wave runs at the same time.
    pub fn new(fetcher: F, followers_limit: i64, followings_limit: i64, concurrency: usize) -> Self {
        CrawlEngine {
            fetcher,
            followers_limit,
            followings_limit,
            concurrency: concurrency.max(1),
        }
    }

    /// Crawls outward from `root` for `depth` levels and returns every
    /// resolved record, root first. The cache is only read here; merging
    /// the result back is the caller's step once the crawl succeeded.
    pub async fn crawl(
        &self,
        cache: &UserCache,
        root: &str,
        depth: u32,
        refresh: bool,
    ) -> Result<Vec<UserRecord>, FetchError> {
        let root_user = self.resolve(cache, root, refresh).await?;

        let mut visited = HashSet::new();
        // The requested name and the API login can differ (GitHub treats
        // logins case-insensitively); record both so the root is never
        // refetched through a back-edge.
        visited.insert(root.to_string());
        visited.insert(root_user.username.clone());

        let mut frontier = Vec::new();
        let mut queued = HashSet::new();
        extend_frontier(&mut frontier, &mut queued, &visited, &root_user);

        let mut accumulated = vec![root_user];

        for level in 1..=depth {
            let pending: Vec<String> = frontier
                .drain(..)
                .filter(|username| !visited.contains(username))
                .collect();
            if pending.is_empty() {
                break;
            }

            println!("  Resolving [depth {}]: {} user(s)", level, pending.len());

            // One wave: every pending resolve dispatched together, capped
            // at `concurrency` in flight. `buffered` keeps dispatch order
            // and the first error aborts the stream, dropping the wave's
            // in-flight siblings.
            let wave: Vec<UserRecord> = stream::iter(
                pending
                    .iter()
                    .map(|username| self.resolve(cache, username, refresh)),
            )
            .buffered(self.concurrency)
            .try_collect()
            .await?;

            for username in pending {
                visited.insert(username);
            }
            for record in &wave {
                visited.insert(record.username.clone());
            }

            let mut queued = HashSet::new();
            for record in &wave {
                extend_frontier(&mut frontier, &mut queued, &visited, record);
            }

            accumulated.extend(wave);

            if frontier.is_empty() {
                break;
            }
        }

        Ok(accumulated)
    }

    // Resolves one username into a record, consulting the cache first.
    //
    // The cache-hit fast path short-circuits before any request goes out
    // unless the crawl runs in refresh mode. On a miss the base profile is
    // fetched, then each connection list independently of the other:
    // zero count -> None, within its limit -> the full list, over the
    // limit -> Skipped. The raw counts are dropped afterwards.
    async fn resolve(
        &self,
        cache: &UserCache,
        username: &str,
        refresh: bool,
    ) -> Result<UserRecord, FetchError> {
        if !refresh {
            if let Some(cached) = cache.get(username) {
                println!("  Using cached data for {}", username);
                return Ok(cached.clone());
            }
        }

        let profile = self.fetcher.profile(username).await?;

        let followers = if profile.followers_count == 0 {
            Connections::None
        } else if within_limit(profile.followers_count, self.followers_limit) {
            Connections::Resolved(self.fetcher.followers(username).await?)
        } else {
            println!(
                "  Skipped followers of {} ({} over the limit)",
                username, profile.followers_count
            );
            Connections::Skipped
        };

        let followings = if profile.followings_count == 0 {
            Connections::None
        } else if within_limit(profile.followings_count, self.followings_limit) {
            Connections::Resolved(self.fetcher.followings(username).await?)
        } else {
            println!(
                "  Skipped followings of {} ({} over the limit)",
                username, profile.followings_count
            );
            Connections::Skipped
        };

        Ok(UserRecord {
            id: profile.id,
            username: profile.username,
            name: profile.name,
            company: profile.company,
            location: profile.location,
            blog: profile.blog,
            email: profile.email,
            public_repos: profile.public_repos,
            public_gists: profile.public_gists,
            avatar: profile.avatar,
            last_updated: Utc::now().to_rfc3339(),
            followers,
            followings,
        })
    }
}

// Strict comparison: an account with exactly `limit` connections is
// already over it.
fn within_limit(count: u32, limit: i64) -> bool {
    limit < 0 || i64::from(count) < limit
}

// Queues every username from the record's resolved lists that is neither
// visited nor already queued for this frontier. Followers first, then
// followings; first occurrence wins. Skipped and empty lists contribute
// nothing.
fn extend_frontier(
    frontier: &mut Vec<String>,
    queued: &mut HashSet<String>,
    visited: &HashSet<String>,
    record: &UserRecord,
) {
    let connections = record
        .followers
        .usernames()
        .iter()
        .chain(record.followings.usernames());

    for username in connections {
        if !visited.contains(username) && queued.insert(username.clone()) {
            frontier.push(username.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Profile;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct MockUser {
        profile: Profile,
        followers: Vec<String>,
        followings: Vec<String>,
    }

    // In-memory stand-in for the GitHub API: a user table, a log of every
    // network-shaped call, and a set of usernames whose fetches fail.
    struct MockFetcher {
        users: HashMap<String, MockUser>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn new(users: Vec<MockUser>) -> Self {
            MockFetcher {
                users: users
                    .into_iter()
                    .map(|user| (user.profile.username.clone(), user))
                    .collect(),
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, username: &str) -> Self {
            self.failing.insert(username.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn lookup(&self, username: &str, what: &str) -> Result<&MockUser, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{what}:{username}"));
            if self.failing.contains(username) {
                return Err(FetchError::Status {
                    resource: format!("user '{username}'"),
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            self.users.get(username).ok_or_else(|| FetchError::Status {
                resource: format!("user '{username}'"),
                status: reqwest::StatusCode::NOT_FOUND,
            })
        }
    }

    #[async_trait]
    impl ProfileFetcher for MockFetcher {
        async fn profile(&self, username: &str) -> Result<Profile, FetchError> {
            Ok(self.lookup(username, "profile")?.profile.clone())
        }

        async fn followers(&self, username: &str) -> Result<Vec<String>, FetchError> {
            Ok(self.lookup(username, "followers")?.followers.clone())
        }

        async fn followings(&self, username: &str) -> Result<Vec<String>, FetchError> {
            Ok(self.lookup(username, "followings")?.followings.clone())
        }
    }

    fn user(id: u64, username: &str, followers: &[&str], followings: &[&str]) -> MockUser {
        MockUser {
            profile: Profile {
                id,
                username: username.to_string(),
                name: Some(format!("{username} name")),
                company: None,
                location: None,
                blog: None,
                email: None,
                public_repos: 2,
                public_gists: 0,
                avatar: format!("https://example.com/{username}.png"),
                followers_count: followers.len() as u32,
                followings_count: followings.len() as u32,
            },
            followers: followers.iter().map(|s| s.to_string()).collect(),
            followings: followings.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn engine(fetcher: MockFetcher) -> CrawlEngine<MockFetcher> {
        CrawlEngine::new(fetcher, -1, -1, 4)
    }

    fn empty_cache(dir: &tempfile::TempDir) -> UserCache {
        UserCache::load(dir.path().join(".users_cache"))
    }

    fn usernames(records: &[UserRecord]) -> Vec<&str> {
        records.iter().map(|r| r.username.as_str()).collect()
    }

    #[tokio::test]
    async fn test_depth_zero_returns_only_root() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![
            user(1, "alice", &["bob", "carol"], &[]),
            user(2, "bob", &[], &[]),
            user(3, "carol", &[], &[]),
        ]));

        let result = engine.crawl(&empty_cache(&dir), "alice", 0, false).await.unwrap();

        assert_eq!(usernames(&result), ["alice"]);
        // The root's own lists are still resolved at depth 0.
        assert_eq!(
            result[0].followers,
            Connections::Resolved(vec!["bob".to_string(), "carol".to_string()])
        );
    }

    #[tokio::test]
    async fn test_depth_one_resolves_root_neighborhood_in_order() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![
            user(1, "alice", &["bob", "carol"], &[]),
            user(2, "bob", &[], &[]),
            user(3, "carol", &[], &[]),
        ]));

        let result = engine.crawl(&empty_cache(&dir), "alice", 1, false).await.unwrap();

        assert_eq!(usernames(&result), ["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_frontier_orders_followers_before_followings() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![
            user(1, "alice", &["bob"], &["carol", "bob"]),
            user(2, "bob", &[], &[]),
            user(3, "carol", &[], &[]),
        ]));

        let result = engine.crawl(&empty_cache(&dir), "alice", 1, false).await.unwrap();

        // bob appears once even though he is in both of alice's lists.
        assert_eq!(usernames(&result), ["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_shared_follower_resolved_once() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![
            user(1, "alice", &["bob", "carol"], &[]),
            user(2, "bob", &["dave"], &["carol"]),
            user(3, "carol", &["dave"], &["bob"]),
            user(4, "dave", &[], &[]),
        ]));

        let result = engine.crawl(&empty_cache(&dir), "alice", 2, false).await.unwrap();

        assert_eq!(usernames(&result), ["alice", "bob", "carol", "dave"]);

        // dave was fetched exactly once despite two paths to him, and the
        // mutual bob<->carol edges never caused a refetch.
        let calls = engine.fetcher.calls();
        let dave_fetches = calls.iter().filter(|c| *c == "profile:dave").count();
        assert_eq!(dave_fetches, 1);
        let bob_fetches = calls.iter().filter(|c| *c == "profile:bob").count();
        assert_eq!(bob_fetches, 1);
    }

    #[tokio::test]
    async fn test_back_edge_to_root_is_not_refetched() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![
            user(1, "alice", &["bob"], &[]),
            user(2, "bob", &[], &["alice"]),
        ]));

        let result = engine.crawl(&empty_cache(&dir), "alice", 3, false).await.unwrap();

        assert_eq!(usernames(&result), ["alice", "bob"]);
        let calls = engine.fetcher.calls();
        assert_eq!(calls.iter().filter(|c| *c == "profile:alice").count(), 1);
    }

    #[tokio::test]
    async fn test_crawl_stops_when_frontier_runs_dry() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![
            user(1, "alice", &["bob"], &[]),
            user(2, "bob", &[], &[]),
        ]));

        // Far more depth than the graph has; the crawl ends early.
        let result = engine.crawl(&empty_cache(&dir), "alice", 10, false).await.unwrap();

        assert_eq!(usernames(&result), ["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_over_limit_followers_are_skipped_and_not_expanded() {
        let dir = tempdir().unwrap();
        let fans = ["f1", "f2", "f3", "f4", "f5", "f6"];
        let mut users = vec![
            user(1, "alice", &[], &["hub"]),
            user(2, "hub", &fans, &[]),
        ];
        for (i, fan) in fans.iter().enumerate() {
            users.push(user(10 + i as u64, fan, &[], &[]));
        }
        let engine = CrawlEngine::new(MockFetcher::new(users), 5, -1, 4);

        let result = engine.crawl(&empty_cache(&dir), "alice", 2, false).await.unwrap();

        // hub has 6 followers against a limit of 5: list skipped, none of
        // the fans reached the next frontier through hub.
        assert_eq!(usernames(&result), ["alice", "hub"]);
        let hub = &result[1];
        assert_eq!(hub.followers, Connections::Skipped);

        let calls = engine.fetcher.calls();
        assert!(!calls.contains(&"followers:hub".to_string()));
    }

    #[tokio::test]
    async fn test_exact_limit_count_is_skipped() {
        let dir = tempdir().unwrap();
        let engine = CrawlEngine::new(
            MockFetcher::new(vec![user(1, "alice", &["b1", "b2", "b3"], &[])]),
            3,
            -1,
            4,
        );

        let result = engine.crawl(&empty_cache(&dir), "alice", 0, false).await.unwrap();

        assert_eq!(result[0].followers, Connections::Skipped);
    }

    #[tokio::test]
    async fn test_zero_connections_are_none_not_skipped() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![user(1, "alice", &[], &[])]));

        let result = engine.crawl(&empty_cache(&dir), "alice", 1, false).await.unwrap();

        assert_eq!(result[0].followers, Connections::None);
        assert_eq!(result[0].followings, Connections::None);
    }

    #[tokio::test]
    async fn test_warm_cache_issues_no_network_calls() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![user(1, "alice", &["bob"], &[]), user(2, "bob", &[], &[])]));

        let mut cache = empty_cache(&dir);
        let first = engine.crawl(&cache, "alice", 1, false).await.unwrap();
        cache.merge(&first, false);
        let calls_after_first = engine.fetcher.calls().len();

        let second = engine.crawl(&cache, "alice", 1, false).await.unwrap();

        // Byte-for-byte the same records, zero additional fetches.
        assert_eq!(second, first);
        assert_eq!(engine.fetcher.calls().len(), calls_after_first);
    }

    #[tokio::test]
    async fn test_refresh_refetches_and_overwrites() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![user(1, "alice", &[], &[])]));

        let mut cache = empty_cache(&dir);
        let mut stale = engine.crawl(&cache, "alice", 0, false).await.unwrap();
        stale[0].name = Some("stale name".to_string());
        cache.merge(&stale, false);

        let fresh = engine.crawl(&cache, "alice", 0, true).await.unwrap();
        assert_ne!(fresh[0], stale[0]);
        // Refresh mode went to the network despite the warm cache.
        assert_eq!(
            engine
                .fetcher
                .calls()
                .iter()
                .filter(|c| *c == "profile:alice")
                .count(),
            2
        );

        cache.merge(&fresh, true);
        assert_eq!(cache.get("alice"), Some(&fresh[0]));
    }

    #[tokio::test]
    async fn test_failed_resolve_fails_the_whole_wave() {
        let dir = tempdir().unwrap();
        let engine = engine(
            MockFetcher::new(vec![
                user(1, "alice", &["bob", "carol"], &[]),
                user(2, "bob", &[], &[]),
                user(3, "carol", &[], &[]),
            ])
            .failing("carol"),
        );

        let result = engine.crawl(&empty_cache(&dir), "alice", 1, false).await;

        assert!(matches!(result, Err(FetchError::Status { .. })));
    }

    #[tokio::test]
    async fn test_failed_root_fails_the_crawl() {
        let dir = tempdir().unwrap();
        let engine = engine(MockFetcher::new(vec![]).failing("ghost"));

        let result = engine.crawl(&empty_cache(&dir), "ghost", 0, false).await;

        assert!(result.is_err());
    }
}
