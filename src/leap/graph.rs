use geo::Point;
use rustc_hash::FxHashSet;

use crate::graph::{FeatureId, Segment, ShardId};
use crate::search::{AStarGraph, Edge, RouteWeight};
use crate::stitch::Transition;
use crate::world::WorldGraph;

/// Border features excluded from the start and finish attachments of
/// the coarse search; each collected candidate bans its own endpoints
/// so later runs diverge.
#[derive(Default)]
pub struct LeapBans {
    pub entries: FxHashSet<FeatureId>,
    pub exits: FxHashSet<FeatureId>,
}

/// The coarse leap graph: vertices are border transitions plus one
/// synthetic start and finish, edges are connector matrix weights,
/// zero-cost twin crossings, and heuristic attachments at both ends.
///
/// Attachment and matrix weights are estimates, so reduced weights may
/// undershoot; searches over this graph must tolerate that.
pub struct LeapsGraph<'a> {
    world: &'a mut WorldGraph,
    start_origin: Point<f64>,
    finish_origin: Point<f64>,
    start_shard: ShardId,
    finish_shard: ShardId,
    start: Segment,
    finish: Segment,
    bans: &'a LeapBans,
}

impl<'a> LeapsGraph<'a> {
    pub fn new(
        world: &'a mut WorldGraph,
        start_origin: Point<f64>,
        start_shard: ShardId,
        finish_origin: Point<f64>,
        finish_shard: ShardId,
        bans: &'a LeapBans,
    ) -> Self {
        LeapsGraph {
            world,
            start_origin,
            finish_origin,
            start_shard,
            finish_shard,
            start: Segment::fake(0),
            finish: Segment::fake(1),
            bans,
        }
    }

    pub fn start(&self) -> Segment {
        self.start
    }

    pub fn finish(&self) -> Segment {
        self.finish
    }

    fn position(&mut self, vertex: Segment) -> Point<f64> {
        if vertex == self.start {
            return self.start_origin;
        }
        if vertex == self.finish {
            return self.finish_origin;
        }
        self.world
            .point(vertex, true)
            .unwrap_or(self.start_origin)
    }

    fn crow(&mut self, from: Segment, to: Point<f64>) -> RouteWeight {
        let at = self.position(from);
        RouteWeight::from_seconds(self.world.estimator().heuristic(at, to))
    }

    /// Exits of the start shard surviving the entry ban, or enters of
    /// the finish shard surviving the exit ban.
    fn attachments(&mut self, shard: ShardId, exits: bool) -> Vec<Segment> {
        let source = self.world.source();
        let Ok(connector) = self.world.stitch().connector(source.as_ref(), shard) else {
            return Vec::new();
        };
        let banned = if exits {
            &self.bans.entries
        } else {
            &self.bans.exits
        };
        let picked: Vec<&Transition> = if exits {
            connector.exits().collect()
        } else {
            connector.enters().collect()
        };
        picked
            .into_iter()
            .map(|t| t.segment)
            .filter(|s| !banned.contains(&s.feature()))
            .collect()
    }

    fn is_enter(&mut self, vertex: Segment) -> bool {
        let source = self.world.source();
        self.world
            .stitch()
            .is_transition(source.as_ref(), vertex, false)
    }

    fn is_exit(&mut self, vertex: Segment) -> bool {
        let source = self.world.source();
        self.world
            .stitch()
            .is_transition(source.as_ref(), vertex, true)
    }
}

impl AStarGraph for LeapsGraph<'_> {
    type Vertex = Segment;

    fn edges(&mut self, from: &Segment, outgoing: bool, out: &mut Vec<Edge<Segment>>) {
        let from = *from;

        if from == self.start {
            if !outgoing {
                return;
            }
            for exit in self.attachments(self.start_shard, true) {
                let weight = self.crow(exit, self.start_origin);
                out.push(Edge::new(exit, weight));
            }
            if self.start_shard == self.finish_shard {
                let finish = self.finish;
                let weight = self.crow(finish, self.start_origin);
                out.push(Edge::new(finish, weight));
            }
            return;
        }

        if from == self.finish {
            if outgoing {
                return;
            }
            for enter in self.attachments(self.finish_shard, false) {
                let weight = self.crow(enter, self.finish_origin);
                out.push(Edge::new(enter, weight));
            }
            if self.start_shard == self.finish_shard {
                let start = self.start;
                let weight = self.crow(start, self.finish_origin);
                out.push(Edge::new(start, weight));
            }
            return;
        }

        let source = self.world.source();
        if outgoing {
            // Leaving the shard costs nothing; the border edge itself was
            // paid for by the matrix weight that reached it.
            if self.is_exit(from) {
                for twin in self.world.stitch().twins(source.as_ref(), from) {
                    out.push(Edge::new(twin, RouteWeight::ZERO));
                }
            }
            if self.is_enter(from) {
                let leaps = self
                    .world
                    .stitch()
                    .leap_edges(source.as_ref(), from)
                    .unwrap_or_default();
                out.extend(leaps);
                if from.shard() == self.finish_shard
                    && !self.bans.exits.contains(&from.feature())
                {
                    let finish = self.finish;
                    let weight = self.crow(from, self.finish_origin);
                    out.push(Edge::new(finish, weight));
                }
            }
        } else {
            if self.is_enter(from) {
                for twin in self.world.stitch().twins(source.as_ref(), from) {
                    out.push(Edge::new(twin, RouteWeight::ZERO));
                }
            }
            if self.is_exit(from) {
                let Ok(connector) = self
                    .world
                    .stitch()
                    .connector(source.as_ref(), from.shard())
                else {
                    return;
                };
                let enters: Vec<Segment> = connector.enters().map(|t| t.segment).collect();
                for enter in enters {
                    if let Some(weight) = connector.enter_to_exit(enter, from) {
                        out.push(Edge::new(enter, weight));
                    }
                }
                if from.shard() == self.start_shard
                    && !self.bans.entries.contains(&from.feature())
                {
                    let start = self.start;
                    let weight = self.crow(from, self.start_origin);
                    out.push(Edge::new(start, weight));
                }
            }
        }
    }

    fn heuristic(&mut self, vertex: &Segment, to_finish: bool) -> f64 {
        let at = self.position(*vertex);
        let target = if to_finish {
            self.finish_origin
        } else {
            self.start_origin
        };
        self.world.estimator().heuristic(at, target)
    }
}
