use std::rc::Rc;

use geo::Point;
use log::warn;

use crate::graph::{RoadGeometry, Segment, TransitInfo};
use crate::model::{EdgeEstimator, Purpose, SpeedKmh, VehicleModel, VehicleType};
use crate::search::{Edge, RouteWeight};
use crate::shard::{ShardArena, ShardSource};
use crate::stitch::CrossShardGraph;
use crate::world::{GuideTracks, Mode, GUIDE_ATTACH_M};

/// The one logical graph over every shard: real-segment expansion with
/// weights, stitching across borders, pinned guide tracks, and the
/// per-search resolution mode.
pub struct WorldGraph {
    arena: ShardArena,
    stitch: CrossShardGraph,
    estimator: EdgeEstimator,
    guides: GuideTracks,
    mode: Mode,
}

impl WorldGraph {
    pub fn new(model: VehicleModel, source: Rc<dyn ShardSource>) -> Self {
        WorldGraph {
            estimator: EdgeEstimator::new(&model),
            arena: ShardArena::new(model, source),
            stitch: CrossShardGraph::new(),
            guides: GuideTracks::new(),
            mode: Mode::Joints,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn estimator(&self) -> EdgeEstimator {
        self.estimator
    }

    pub fn source(&self) -> Rc<dyn ShardSource> {
        Rc::clone(self.arena.source())
    }

    pub fn arena(&mut self) -> &mut ShardArena {
        &mut self.arena
    }

    pub fn stitch(&mut self) -> &mut CrossShardGraph {
        &mut self.stitch
    }

    pub fn guides(&self) -> &GuideTracks {
        &self.guides
    }

    pub fn set_guides(&mut self, tracks: Vec<Vec<Point<f64>>>) {
        self.guides.set(tracks);
    }

    /// Drops per-shard state without live leases and all connectors.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.stitch.purge();
    }

    /// The shaped road geometry behind a segment, if its shard loads.
    pub fn road(&mut self, segment: Segment) -> Option<Rc<RoadGeometry>> {
        let slot = self.arena.lease(segment.shard()).ok()?;
        let road = slot.graph().geometry().road(segment.feature());
        road
    }

    /// Coordinate of a segment end in its direction of travel.
    pub fn point(&mut self, segment: Segment, front: bool) -> Option<Point<f64>> {
        if self.guides.contains(segment) {
            return self.guides.point(segment, front);
        }
        let road = self.road(segment)?;
        let id = segment.point_id(front);
        (id < road.points_count()).then(|| road.point(id))
    }

    /// Full traversal cost of one real or guide segment.
    pub fn segment_weight(&mut self, segment: Segment, purpose: Purpose) -> RouteWeight {
        if self.guides.contains(segment) {
            return match self.guides.segment_len_m(segment) {
                Some(len) => RouteWeight::from_seconds(len / self.estimator.offroad_speed_mps()),
                None => {
                    warn!("weight of unresolvable guide segment {segment:?}");
                    RouteWeight::ZERO
                }
            };
        }
        match self.road(segment) {
            Some(road) if segment.idx() < road.segments_count() => {
                let len = road.segment_len(segment.idx());
                RouteWeight::from_seconds(self.estimator.segment_cost(len, road.speed(), purpose))
            }
            _ => {
                warn!("weight of unresolvable segment {segment:?}");
                RouteWeight::ZERO
            }
        }
    }

    /// Modeled speed of a segment, guide tracks included.
    pub fn segment_speed(&mut self, segment: Segment) -> Option<SpeedKmh> {
        if self.guides.contains(segment) {
            return Some(self.arena.model().offroad_speed());
        }
        Some(self.road(segment)?.speed())
    }

    pub fn pass_through_allowed(&mut self, segment: Segment) -> bool {
        self.road(segment)
            .map(|road| road.is_pass_through_allowed())
            .unwrap_or(true)
    }

    /// Transit metadata of a segment's feature. Only the transit variant
    /// of the engine resolves these; other vehicles see none.
    pub fn transit_info(&mut self, segment: Segment) -> Option<TransitInfo> {
        if self.arena.model().vehicle() != VehicleType::Transit {
            return None;
        }
        let slot = self.arena.lease(segment.shard()).ok()?;
        let info = slot.graph().transit_at(segment.feature());
        info
    }

    /// Real neighbor edges of a segment under the current mode.
    ///
    /// Outgoing edges carry the target segment's weight; ingoing edges
    /// carry the expanded segment's weight, so both waves accumulate
    /// each traversed segment exactly once. Crossing into or out of a
    /// no-pass-through road adds one pass-through change.
    pub fn edges(&mut self, segment: Segment, outgoing: bool, out: &mut Vec<Edge<Segment>>) {
        if self.guides.contains(segment) {
            self.guide_continuations(segment, outgoing, out);
            self.guide_road_transfers(segment, outgoing, out);
            return;
        }

        self.shard_edges(segment, segment, outgoing, out);

        if self.mode.stitches() {
            let source = self.source();
            if self
                .stitch
                .is_transition(source.as_ref(), segment, outgoing)
            {
                // Twins are stored relative to the forward direction of
                // the transition segment.
                for twin in self.stitch.twins(source.as_ref(), segment) {
                    let twin = if segment.is_forward() {
                        twin
                    } else {
                        twin.reversed()
                    };
                    self.shard_edges(segment, twin, outgoing, out);
                }
            }
        }

        if !self.guides.is_empty() {
            self.road_guide_transfers(segment, outgoing, out);
        }
    }

    /// Continuation along the same guide track in the direction of
    /// travel.
    fn guide_continuations(&mut self, segment: Segment, outgoing: bool, out: &mut Vec<Edge<Segment>>) {
        let own = self.segment_weight(segment, Purpose::Weight);
        for target in self.guides.neighbors(segment, outgoing) {
            let weight = if outgoing {
                self.segment_weight(target, Purpose::Weight)
            } else {
                own
            };
            out.push(Edge::new(target, weight));
        }
    }

    /// Transfer from a guide track vertex onto the nearest road segment
    /// within reach, the gap paid at offroad speed.
    fn guide_road_transfers(&mut self, segment: Segment, outgoing: bool, out: &mut Vec<Edge<Segment>>) {
        let Some(at) = self.guides.point(segment, outgoing) else {
            return;
        };
        let Some(shard) = self.source().shard_at(at) else {
            return;
        };
        let Ok(slot) = self.arena.lease(shard) else {
            return;
        };
        let index = slot.snap_index();
        let nearest = index
            .nearby(at, GUIDE_ATTACH_M)
            .map(|entry| (entry.clone(), entry.distance_m(at)))
            .filter(|(_, gap)| *gap <= GUIDE_ATTACH_M)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((entry, gap_m)) = nearest else {
            return;
        };

        let one_way = self
            .road(entry.segment)
            .map(|road| road.is_one_way())
            .unwrap_or(true);
        let mut directions = vec![entry.segment];
        if !one_way {
            directions.push(entry.segment.reversed());
        }

        let own = self.segment_weight(segment, Purpose::Weight);
        let gap_s = gap_m / self.estimator.offroad_speed_mps();
        for target in directions {
            let base = if outgoing {
                self.segment_weight(target, Purpose::Weight)
            } else {
                own
            };
            out.push(Edge::new(
                target,
                RouteWeight::from_seconds(base.seconds() + gap_s),
            ));
        }
    }

    /// Transfer from a road segment onto guide segments meeting at a
    /// track vertex within reach of its far end.
    fn road_guide_transfers(&mut self, segment: Segment, outgoing: bool, out: &mut Vec<Edge<Segment>>) {
        let Some(at) = self.point(segment, outgoing) else {
            return;
        };
        let Some((track, vertex, gap_m)) = self.guides.attach(at) else {
            return;
        };

        let own = self.segment_weight(segment, Purpose::Weight);
        let gap_s = gap_m / self.estimator.offroad_speed_mps();
        for target in self.guides.transfers_at(track, vertex, outgoing) {
            let base = if outgoing {
                self.segment_weight(target, Purpose::Weight)
            } else {
                own
            };
            out.push(Edge::new(
                target,
                RouteWeight::from_seconds(base.seconds() + gap_s),
            ));
        }
    }

    /// Neighbors of `expand` inside its own shard, weighted relative to
    /// the logical vertex `origin` (== `expand` except for twins).
    fn shard_edges(
        &mut self,
        origin: Segment,
        expand: Segment,
        outgoing: bool,
        out: &mut Vec<Edge<Segment>>,
    ) {
        let Ok(slot) = self.arena.lease(expand.shard()) else {
            return;
        };
        let neighbors = slot.graph().neighbors(expand, outgoing);
        drop(slot);

        let origin_pass = self.pass_through_allowed(origin);
        let origin_weight = self.segment_weight(origin, Purpose::Weight);

        for target in neighbors {
            let seconds = if outgoing {
                self.segment_weight(target, Purpose::Weight)
            } else {
                origin_weight
            };
            let changes = (self.pass_through_allowed(target) != origin_pass) as u32;
            out.push(Edge::new(
                target,
                RouteWeight::new(seconds.seconds(), changes),
            ));
        }
    }
}
