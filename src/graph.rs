// src/graph.rs
// =============================================================================
// Turns the crawl's resolved records into a node/edge dataset.
//
// Nodes keep the accumulated order (root first). Edges point in follow
// direction: follower -> user for follower lists, user -> following for
// following lists. Only users present in the crawled set become edge
// endpoints; a mutual follow produces the same pair twice and collapses
// into one edge.
// =============================================================================

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::user::UserRecord;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: String,
    pub source: u64,
    pub target: u64,
}

#[derive(Debug, Serialize)]
pub struct GraphData {
    pub nodes: Vec<UserRecord>,
    pub edges: Vec<GraphEdge>,
}

/// Builds the dataset for the given records. Deterministic: the same
/// records in the same order always produce the same nodes and edges.
pub fn build(users: &[UserRecord]) -> GraphData {
    // Username -> id for O(1) endpoint lookups.
    let ids: HashMap<&str, u64> = users
        .iter()
        .map(|user| (user.username.as_str(), user.id))
        .collect();

    let mut edges = Vec::new();
    let mut seen = HashSet::new();

    for user in users {
        for follower in user.followers.usernames() {
            if let Some(&source) = ids.get(follower.as_str()) {
                push_edge(&mut edges, &mut seen, source, user.id);
            }
        }
        for following in user.followings.usernames() {
            if let Some(&target) = ids.get(following.as_str()) {
                push_edge(&mut edges, &mut seen, user.id, target);
            }
        }
    }

    GraphData {
        nodes: users.to_vec(),
        edges,
    }
}

// First occurrence of a (source, target) pair wins; edge ids number the
// edges in insertion order.
fn push_edge(
    edges: &mut Vec<GraphEdge>,
    seen: &mut HashSet<(u64, u64)>,
    source: u64,
    target: u64,
) {
    if seen.insert((source, target)) {
        edges.push(GraphEdge {
            id: format!("e{}", edges.len()),
            source,
            target,
        });
    }
}
