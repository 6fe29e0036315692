use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::graph::{IndexGraph, Segment};

/// A segment from which fewer than this many segments are reachable is
/// considered a dead end for snapping purposes.
pub const DEAD_END_TEST_LIMIT: usize = 250;

/// Remembers segments proven to sit in a cul-de-sac so repeated snapping
/// around the same spot stays cheap. Reachability caps out at the test
/// limit, so the check fails open on large networks.
#[derive(Default)]
pub struct DeadEndCache {
    dead: FxHashSet<(Segment, bool)>,
}

impl DeadEndCache {
    pub fn new() -> Self {
        DeadEndCache::default()
    }

    /// Whether too little of the network is reachable from `segment`
    /// travelling `outgoing`.
    pub fn is_dead_end(
        &mut self,
        graph: &mut IndexGraph,
        segment: Segment,
        outgoing: bool,
    ) -> bool {
        if self.dead.contains(&(segment, outgoing)) {
            return true;
        }

        let mut visited = FxHashSet::default();
        visited.insert(segment);
        let mut frontier = VecDeque::from([segment]);

        while let Some(current) = frontier.pop_front() {
            if visited.len() >= DEAD_END_TEST_LIMIT {
                return false;
            }
            for next in graph.neighbors(current, outgoing) {
                if visited.insert(next) {
                    frontier.push_back(next);
                }
            }
        }

        // Everything reachable from a visited segment is itself visited,
        // so the whole set shares the verdict.
        self.dead
            .extend(visited.into_iter().map(|s| (s, outgoing)));
        true
    }
}
