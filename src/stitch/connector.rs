use rustc_hash::FxHashMap;

use crate::graph::{Segment, ShardId};
use crate::search::RouteWeight;

/// One border crossing of a shard: a segment whose feature continues in
/// a neighboring shard.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Forward direction of the border segment inside this shard.
    pub segment: Segment,
    /// The mirrored segment(s) across the border; normally one, more if
    /// the border splits the feature.
    pub twins: Vec<Segment>,
    /// Usable to enter this shard.
    pub enter: bool,
    /// Usable to leave this shard.
    pub exit: bool,
}

/// Border transitions of one shard plus the precomputed enter-to-exit
/// weights used by leap search.
///
/// The weight matrix is optional; a connector without one still answers
/// transition and twin queries, and leap edges fall back to the caller's
/// heuristic.
pub struct Connector {
    shard: ShardId,
    transitions: Vec<Transition>,
    by_segment: FxHashMap<Segment, usize>,
    enters: Vec<usize>,
    exits: Vec<usize>,
    /// Row per enter, column per exit; `None` = no route across.
    weights: Option<Vec<Option<RouteWeight>>>,
}

impl Connector {
    pub fn new(shard: ShardId, transitions: Vec<Transition>) -> Self {
        let mut by_segment = FxHashMap::default();
        let mut enters = Vec::new();
        let mut exits = Vec::new();
        for (i, t) in transitions.iter().enumerate() {
            by_segment.insert(t.segment, i);
            by_segment.insert(t.segment.reversed(), i);
            if t.enter {
                enters.push(i);
            }
            if t.exit {
                exits.push(i);
            }
        }
        Connector {
            shard,
            transitions,
            by_segment,
            enters,
            exits,
            weights: None,
        }
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn enters(&self) -> impl Iterator<Item = &Transition> {
        self.enters.iter().map(|&i| &self.transitions[i])
    }

    pub fn exits(&self) -> impl Iterator<Item = &Transition> {
        self.exits.iter().map(|&i| &self.transitions[i])
    }

    /// Installs the enter-by-exit weight matrix, row-major over the
    /// enter and exit orders of this connector.
    pub fn set_weights(&mut self, weights: Vec<Option<RouteWeight>>) {
        debug_assert_eq!(weights.len(), self.enters.len() * self.exits.len());
        self.weights = Some(weights);
    }

    pub fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    /// Whether crossing this segment's far point (travelling `outgoing`)
    /// leaves the shard.
    pub fn is_transition(&self, segment: Segment, outgoing: bool) -> bool {
        let Some(&i) = self.by_segment.get(&segment) else {
            return false;
        };
        let t = &self.transitions[i];
        if outgoing {
            t.exit
        } else {
            t.enter
        }
    }

    pub fn twins(&self, segment: Segment) -> &[Segment] {
        match self.by_segment.get(&segment) {
            Some(&i) => &self.transitions[i].twins,
            None => &[],
        }
    }

    /// Precomputed in-shard weight from an enter transition to an exit
    /// transition, if the matrix knows a route.
    pub fn enter_to_exit(&self, enter: Segment, exit: Segment) -> Option<RouteWeight> {
        let weights = self.weights.as_ref()?;
        let enter_row = self
            .enters
            .iter()
            .position(|&i| self.by_segment.get(&enter) == Some(&i))?;
        let exit_col = self
            .exits
            .iter()
            .position(|&i| self.by_segment.get(&exit) == Some(&i))?;
        weights[enter_row * self.exits.len() + exit_col]
    }
}
