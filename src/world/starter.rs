use geo::{Distance, Haversine, Point};
use log::warn;

use crate::graph::Segment;
use crate::model::Purpose;
use crate::search::{AStarGraph, Edge, RouteWeight};
use crate::snap::FakeEnding;
use crate::world::{FakeGraph, FakeSegmentData, WorldGraph};

/// One subroute's view of the world: the facade plus the synthetic
/// start/finish vertices built from two fake endings.
///
/// Vertices are plain `Segment`s; synthetic ones live in the fake shard.
/// In a joints mode, expansion slides over interior points and
/// [`Starter::reconstruct`] re-expands the runs afterwards.
pub struct Starter<'a> {
    world: &'a mut WorldGraph,
    fake: FakeGraph,
    start: Segment,
    finish: Segment,
    start_origin: Point<f64>,
    finish_origin: Point<f64>,
    restricted_endings: u32,
}

impl<'a> Starter<'a> {
    pub fn new(
        world: &'a mut WorldGraph,
        start_ending: &FakeEnding,
        finish_ending: &FakeEnding,
        first_fake_id: u32,
        strict_forward: bool,
    ) -> Self {
        let mut fake = FakeGraph::new(first_fake_id);
        let start = fake.add(FakeSegmentData {
            from: start_ending.origin,
            to: start_ending.origin,
            speed: None,
            real: None,
        });
        let finish = fake.add(FakeSegmentData {
            from: finish_ending.origin,
            to: finish_ending.origin,
            speed: None,
            real: None,
        });

        let mut starter = Starter {
            world,
            fake,
            start,
            finish,
            start_origin: start_ending.origin,
            finish_origin: finish_ending.origin,
            restricted_endings: 0,
        };

        let start_links = starter.attach_start(start_ending, strict_forward);
        let finish_links = starter.attach_finish(finish_ending);
        starter.clip_shared_segments(&start_links, &finish_links);
        starter
    }

    pub fn start(&self) -> Segment {
        self.start
    }

    pub fn finish(&self) -> Segment {
        self.finish
    }

    /// Seed for the next subroute's fake numeration.
    pub fn next_fake_id(&self) -> u32 {
        self.fake.next_id()
    }

    pub fn world(&mut self) -> &mut WorldGraph {
        self.world
    }

    pub fn fake_data(&self, segment: &Segment) -> Option<&FakeSegmentData> {
        self.fake.data(segment)
    }

    /// Pass-through changes a route may accumulate: a round trip in and
    /// out, plus one per ending that itself sits on a restricted road.
    pub fn pass_through_allowance(&self) -> u32 {
        2 + self.restricted_endings
    }

    /// Directions a projection may be entered in.
    fn directions(projection_segment: Segment, one_way: bool, strict_forward: bool) -> Vec<Segment> {
        let mut dirs = vec![projection_segment];
        if !one_way && !strict_forward {
            dirs.push(projection_segment.reversed());
        }
        dirs
    }

    fn attach_start(
        &mut self,
        ending: &FakeEnding,
        strict_forward: bool,
    ) -> Vec<(Segment, Segment, Point<f64>)> {
        let mut links = Vec::new();
        let mut restricted = false;

        for projection in &ending.projections {
            let link = self.fake.add(FakeSegmentData {
                from: ending.origin,
                to: projection.on_road,
                speed: None,
                real: None,
            });
            self.fake.link(self.start, link);

            for d in Self::directions(projection.segment, projection.one_way, strict_forward) {
                let Some(front) = self.world.point(d, true) else {
                    continue;
                };
                let Some(speed) = self.world.segment_speed(d) else {
                    continue;
                };
                restricted |= !self.world.pass_through_allowed(d);
                let part = self.fake.add(FakeSegmentData {
                    from: projection.on_road,
                    to: front,
                    speed: Some(speed),
                    real: Some(d),
                });
                self.fake.link(link, part);
                self.fake.substitute_inn(d, part);
                links.push((d, link, projection.on_road));
            }
        }

        self.restricted_endings += restricted as u32;
        links
    }

    fn attach_finish(&mut self, ending: &FakeEnding) -> Vec<(Segment, Segment, Point<f64>)> {
        let mut links = Vec::new();
        let mut restricted = false;

        for projection in &ending.projections {
            let link = self.fake.add(FakeSegmentData {
                from: projection.on_road,
                to: ending.origin,
                speed: None,
                real: None,
            });
            self.fake.link(link, self.finish);

            for d in Self::directions(projection.segment, projection.one_way, false) {
                let Some(back) = self.world.point(d, false) else {
                    continue;
                };
                let Some(speed) = self.world.segment_speed(d) else {
                    continue;
                };
                restricted |= !self.world.pass_through_allowed(d);
                let part = self.fake.add(FakeSegmentData {
                    from: back,
                    to: projection.on_road,
                    speed: Some(speed),
                    real: Some(d),
                });
                self.fake.link(part, link);
                self.fake.substitute_out(d, part);
                links.push((d, link, projection.on_road));
            }
        }

        self.restricted_endings += restricted as u32;
        links
    }

    /// When both endings project onto the same directed segment with the
    /// finish ahead of the start, a direct in-segment piece joins them
    /// so the search cannot overshoot the finish.
    fn clip_shared_segments(
        &mut self,
        start_links: &[(Segment, Segment, Point<f64>)],
        finish_links: &[(Segment, Segment, Point<f64>)],
    ) {
        for &(d, start_link, start_point) in start_links {
            let Some(back) = self.world.point(d, false) else {
                continue;
            };
            for &(d2, finish_link, finish_point) in finish_links {
                if d != d2 {
                    continue;
                }
                let along_start = Haversine.distance(back, start_point);
                let along_finish = Haversine.distance(back, finish_point);
                if along_finish + 1e-9 < along_start {
                    continue;
                }
                let Some(speed) = self.world.segment_speed(d) else {
                    continue;
                };
                let piece = self.fake.add(FakeSegmentData {
                    from: start_point,
                    to: finish_point,
                    speed: Some(speed),
                    real: None,
                });
                self.fake.link(start_link, piece);
                self.fake.link(piece, finish_link);
            }
        }
    }

    /// Cost of any vertex, synthetic or real.
    pub fn weight(&mut self, segment: Segment, purpose: Purpose) -> RouteWeight {
        match self.fake.data(&segment) {
            Some(data) => {
                let len = Haversine.distance(data.from, data.to);
                let estimator = self.world.estimator();
                let seconds = match data.speed {
                    Some(speed) => estimator.segment_cost(len, speed, purpose),
                    None => len / estimator.offroad_speed_mps(),
                };
                RouteWeight::from_seconds(seconds)
            }
            None => self.world.segment_weight(segment, purpose),
        }
    }

    fn position(&mut self, segment: Segment) -> Point<f64> {
        if let Some(data) = self.fake.data(&segment) {
            return data.to;
        }
        self.world
            .point(segment, true)
            .unwrap_or(self.start_origin)
    }

    /// Real expansion plus fake substitutes, compressed in joints modes.
    /// `override_seconds` replaces the ingoing weight when the expanded
    /// vertex is a part-of-real piece rather than the full segment.
    fn real_edges(
        &mut self,
        from: Segment,
        outgoing: bool,
        override_seconds: Option<f64>,
        out: &mut Vec<Edge<Segment>>,
    ) {
        let mut raw = Vec::new();
        self.world.edges(from, outgoing, &mut raw);

        for edge in raw {
            let changes = edge.weight.pass_through_changes();
            let weight = match override_seconds {
                Some(seconds) => RouteWeight::new(seconds, changes),
                None => edge.weight,
            };

            let substitutes = if outgoing {
                self.fake.substitutes_out(&edge.target).to_vec()
            } else {
                self.fake.substitutes_inn(&edge.target).to_vec()
            };
            for fake in substitutes {
                let seconds = if outgoing {
                    self.weight(fake, Purpose::Weight).seconds()
                } else {
                    weight.seconds()
                };
                out.push(Edge::new(fake, RouteWeight::new(seconds, changes)));
            }

            out.push(self.compress(Edge::new(edge.target, weight), outgoing));
        }
    }

    /// Slides a real edge over interior points until a joint, road end,
    /// border, or fake attachment stops it.
    fn compress(&mut self, edge: Edge<Segment>, outgoing: bool) -> Edge<Segment> {
        if !self.world.mode().joints() || edge.target.is_fake() {
            return edge;
        }

        let mut edge = edge;
        loop {
            let seg = edge.target;
            if self.fake.touches(&seg) {
                return edge;
            }

            // A guide transfer leaves from this end; sliding past it
            // would hide the transfer edge.
            if !self.world.guides().is_empty() {
                if let Some(point) = self.world.point(seg, outgoing) {
                    if self.world.guides().attach(point).is_some() {
                        return edge;
                    }
                }
            }

            let far = seg.road_point(outgoing);
            let Ok(slot) = self.world.arena().lease(seg.shard()) else {
                return edge;
            };
            if slot.graph().is_joint_or_end(far) {
                return edge;
            }
            let next = {
                let neighbors = slot.graph().neighbors(seg, outgoing);
                match neighbors.as_slice() {
                    [next]
                        if next.feature() == seg.feature() && next.shard() == seg.shard() =>
                    {
                        *next
                    }
                    _ => return edge,
                }
            };
            drop(slot);

            // Sliding onto a substituted segment would hide its fakes.
            if self.fake.touches(&next) {
                return edge;
            }

            if self.world.mode().stitches() {
                let source = self.world.source();
                if self.world.stitch().is_transition(source.as_ref(), seg, outgoing) {
                    return edge;
                }
            }

            let step = if outgoing { next } else { seg };
            let add = self.world.segment_weight(step, Purpose::Weight);
            edge = Edge::new(next, edge.weight + add);
        }
    }

    /// Re-expands a joints-mode path into the full segment sequence,
    /// fakes included.
    pub fn reconstruct(&mut self, vertices: &[Segment]) -> Vec<Segment> {
        let mut out = Vec::with_capacity(vertices.len());
        let Some(&first) = vertices.first() else {
            return out;
        };
        out.push(first);

        for pair in vertices.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b.is_fake() || !self.world.mode().joints() {
                out.push(b);
                continue;
            }

            let base = match self.fake.data(&a) {
                Some(data) => match data.real {
                    Some(real) => real,
                    None => {
                        out.push(b);
                        continue;
                    }
                },
                None => a,
            };

            let mut raw = Vec::new();
            self.world.edges(base, true, &mut raw);
            if raw.iter().any(|e| e.target == b) {
                out.push(b);
                continue;
            }

            // A compressed run: enter b's feature next to |base| and
            // walk indices toward b.
            let entry = raw.iter().map(|e| e.target).find(|t| {
                t.shard() == b.shard()
                    && t.feature() == b.feature()
                    && t.is_forward() == b.is_forward()
                    && if b.is_forward() {
                        t.idx() <= b.idx()
                    } else {
                        t.idx() >= b.idx()
                    }
            });
            let Some(mut cursor) = entry else {
                warn!("cannot re-expand run {a:?} -> {b:?}");
                out.push(b);
                continue;
            };

            out.push(cursor);
            while cursor != b {
                let idx = if b.is_forward() {
                    cursor.idx() + 1
                } else {
                    cursor.idx() - 1
                };
                cursor = Segment::new(cursor.shard(), cursor.feature(), idx, b.is_forward());
                out.push(cursor);
            }
        }
        out
    }
}

impl AStarGraph for Starter<'_> {
    type Vertex = Segment;

    fn edges(&mut self, from: &Segment, outgoing: bool, out: &mut Vec<Edge<Segment>>) {
        let Some(data) = self.fake.data(from).cloned() else {
            self.real_edges(*from, outgoing, None, out);
            return;
        };

        if outgoing {
            for fake in self.fake.fake_out(from).to_vec() {
                let weight = self.weight(fake, Purpose::Weight);
                out.push(Edge::new(fake, weight));
            }
            if let Some(real) = data.real {
                self.real_edges(real, true, None, out);
            }
        } else {
            let own = self.weight(*from, Purpose::Weight);
            for fake in self.fake.fake_inn(from).to_vec() {
                out.push(Edge::new(fake, own));
            }
            if let Some(real) = data.real {
                self.real_edges(real, false, Some(own.seconds()), out);
            }
        }
    }

    fn heuristic(&mut self, vertex: &Segment, to_finish: bool) -> f64 {
        let position = self.position(*vertex);
        let target = if to_finish {
            self.finish_origin
        } else {
            self.start_origin
        };
        self.world.estimator().heuristic(position, target)
    }
}
