use std::rc::Rc;

use geo::{Distance, Haversine, Point};
use log::{debug, info};

use crate::leap::route_with_leaps;
use crate::model::{VehicleModel, VehicleType};
use crate::route::{Route, RouteSegment};
use crate::router::redress::{redress, redress_real, RedressedStep};
use crate::router::RouterError;
use crate::search::{
    adjust_route, find_path_bidirectional, Cancellable, RouteWeight, SearchError, SearchOptions,
};
use crate::shard::ShardSource;
use crate::snap::{find_ending, DeadEndCache, FakeEnding, SnapParams};
use crate::world::{Mode, Starter, WorldGraph};

/// Adjustment is only worth trying this far from the finish.
pub const ADJUST_MIN_REMAINING_M: f64 = 10_000.0;
/// Beyond this deviation the old route is abandoned outright.
pub const ADJUST_MAX_OFF_ROUTE_M: f64 = 5_000.0;
/// Legs at least this long between different shards go through the
/// coarse leap graph first.
pub const LEAP_DISTANCE_M: f64 = 100_000.0;

/// The top-level engine: snaps checkpoints, picks a resolution mode per
/// leg, runs the search and shapes the result into a [`Route`].
pub struct Router {
    world: WorldGraph,
    vehicle: VehicleType,
    dead_ends: DeadEndCache,
    last_route: Option<Route>,
}

impl Router {
    pub fn new(vehicle: VehicleType, source: Rc<dyn ShardSource>) -> Self {
        Router {
            world: WorldGraph::new(VehicleModel::new(vehicle), source),
            vehicle,
            dead_ends: DeadEndCache::new(),
            last_route: None,
        }
    }

    /// Replaces the pinned guide tracks. The previous route may follow
    /// tracks that no longer exist, so it is dropped.
    pub fn set_guides(&mut self, tracks: Vec<Vec<Point<f64>>>) {
        self.world.set_guides(tracks);
        self.last_route = None;
    }

    pub fn last_route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }

    /// Drops cached shards and connectors.
    pub fn clear(&mut self) {
        self.world.clear();
        self.dead_ends = DeadEndCache::new();
        self.last_route = None;
    }

    /// Builds a route through the checkpoints in order.
    ///
    /// `bearing` is the device heading in degrees at the first
    /// checkpoint; when set, a car start is pinned to the codirectional
    /// side of the road. With `adjust` set and a previous route stored,
    /// a cheap rejoining search is tried first and the full rebuild only
    /// runs when it does not apply.
    pub fn calculate_route(
        &mut self,
        checkpoints: &[Point<f64>],
        bearing: Option<f64>,
        adjust: bool,
        cancel: &dyn Cancellable,
    ) -> Result<Route, RouterError> {
        if checkpoints.len() < 2 {
            return Err(RouterError::InternalError(
                "a route needs at least two checkpoints".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(RouterError::Cancelled);
        }

        if adjust {
            if let Some(route) = self.try_adjust(checkpoints, cancel)? {
                self.last_route = Some(route.clone());
                return Ok(route);
            }
            debug!("adjustment not applicable, rebuilding");
        }

        let route = self.rebuild(checkpoints, bearing, cancel)?;
        self.last_route = Some(route.clone());
        Ok(route)
    }

    fn rebuild(
        &mut self,
        checkpoints: &[Point<f64>],
        bearing: Option<f64>,
        cancel: &dyn Cancellable,
    ) -> Result<Route, RouterError> {
        let mut accumulator = Accumulator::default();
        let mut fake_id = 0;
        let mut carry: Option<FakeEnding> = None;

        for leg in 0..checkpoints.len() - 1 {
            let from = checkpoints[leg];
            let to = checkpoints[leg + 1];

            let strict_forward =
                leg == 0 && bearing.is_some() && self.vehicle == VehicleType::Car;
            let start = match carry.take() {
                Some(ending) => ending,
                None => {
                    let vector = if leg == 0 { bearing_vector(bearing) } else { None };
                    self.snap(from, vector, true)?
                        .ok_or(ending_error(leg, checkpoints.len()))?
                }
            };
            let finish = self
                .snap(to, None, false)?
                .ok_or(ending_error(leg + 1, checkpoints.len()))?;

            let crow = Haversine.distance(from, to);
            let use_leaps = self.vehicle == VehicleType::Car
                && crow >= LEAP_DISTANCE_M
                && cross_shard(&start, &finish);

            let (steps, weight) = if use_leaps {
                info!("leg {leg}: {:.0} km, leaping", crow / 1000.0);
                let (segments, weight) =
                    route_with_leaps(&mut self.world, &start, &finish, cancel)
                        .map_err(RouterError::from_search)?;
                (redress_real(&mut self.world, &segments)?, weight)
            } else {
                self.world.set_mode(Mode::Joints);
                let mut starter =
                    Starter::new(&mut self.world, &start, &finish, fake_id, strict_forward);
                let (s, f) = (starter.start(), starter.finish());
                let path = find_path_bidirectional(&mut starter, s, f, SearchOptions::new(cancel))
                    .map_err(RouterError::from_search)?;
                if path.weight.pass_through_changes() > starter.pass_through_allowance() {
                    return Err(RouterError::RouteNotFound);
                }
                let expanded = starter.reconstruct(&path.vertices);
                let steps = redress(&mut starter, &expanded)?;
                fake_id = starter.next_fake_id();
                (steps, path.weight)
            };

            carry = Some(carry_ending(&finish, &steps));
            for step in &steps {
                accumulator.push(step);
            }
            accumulator.end_subroute(weight);
        }

        Ok(accumulator.into_route(checkpoints.to_vec()))
    }

    /// Ties a point into the network, or `Ok(None)` when neither a road
    /// nor a guide track is close enough.
    fn snap(
        &mut self,
        point: Point<f64>,
        bearing: Option<(f64, f64)>,
        outgoing: bool,
    ) -> Result<Option<FakeEnding>, RouterError> {
        let covered = self.world.source().shard_at(point);
        let mut projections = Vec::new();

        if let Some(shard) = covered {
            let slot = self.world.arena().lease(shard)?;
            let index = slot.snap_index();
            let mut graph = slot.graph();
            let mut params = SnapParams {
                bearing,
                outgoing,
                dead_ends: &mut self.dead_ends,
            };
            if let Some(ending) = find_ending(&index, &mut graph, point, &mut params) {
                projections.extend(ending.projections);
            }
        }

        if let Some(projection) = self.world.guides().project(point) {
            projections.push(projection);
        }

        if projections.is_empty() {
            if covered.is_none() {
                return Err(RouterError::NeedMoreMaps);
            }
            return Ok(None);
        }
        Ok(Some(FakeEnding {
            origin: point,
            projections,
        }))
    }

    /// Whether leaving the old route warrants rejoining it instead of a
    /// rebuild.
    pub(crate) fn should_adjust(remaining_m: f64, off_route_m: f64) -> bool {
        remaining_m >= ADJUST_MIN_REMAINING_M && off_route_m <= ADJUST_MAX_OFF_ROUTE_M
    }

    /// Tries to rejoin the previous route from the first checkpoint.
    /// `Ok(None)` means the caller should rebuild; only cancellation
    /// escapes as an error.
    pub(crate) fn try_adjust(
        &mut self,
        checkpoints: &[Point<f64>],
        cancel: &dyn Cancellable,
    ) -> Result<Option<Route>, RouterError> {
        let position = checkpoints[0];
        let Some(previous) = self.last_route.take() else {
            return Ok(None);
        };

        let applicable = previous.closest_to(position).filter(|&(index, off_m)| {
            Self::should_adjust(previous.remaining_distance_from(index), off_m)
        });
        if applicable.is_none() {
            self.last_route = Some(previous);
            return Ok(None);
        }

        match self.adjust_onto(&previous, position, cancel) {
            Ok(Some(route)) => Ok(Some(route)),
            Ok(None) => {
                self.last_route = Some(previous);
                Ok(None)
            }
            Err(RouterError::Cancelled) => Err(RouterError::Cancelled),
            Err(err) => {
                debug!("adjustment failed ({err}), rebuilding");
                self.last_route = Some(previous);
                Ok(None)
            }
        }
    }

    fn adjust_onto(
        &mut self,
        previous: &Route,
        position: Point<f64>,
        cancel: &dyn Cancellable,
    ) -> Result<Option<Route>, RouterError> {
        let Some(start) = self.snap(position, None, true)? else {
            return Ok(None);
        };
        let finish_point = *previous
            .checkpoints()
            .last()
            .ok_or_else(|| RouterError::InternalError("previous route has no checkpoints".into()))?;
        let Some(finish) = self.snap(finish_point, None, false)? else {
            return Ok(None);
        };

        let remaining = previous.remaining_weights();
        self.world.set_mode(Mode::NoLeaps);
        let mut starter = Starter::new(&mut self.world, &start, &finish, 0, false);
        let s = starter.start();
        let adjusted = match adjust_route(&mut starter, s, &remaining, SearchOptions::new(cancel)) {
            Ok(adjusted) => adjusted,
            Err(SearchError::Cancelled) => return Err(RouterError::Cancelled),
            Err(SearchError::NoPath) => return Ok(None),
        };

        let expanded = starter.reconstruct(&adjusted.path.vertices);
        let steps = redress(&mut starter, &expanded)?;
        drop(starter);

        let Some(at) = previous.position_of(adjusted.meeting) else {
            return Ok(None);
        };

        let mut accumulator = Accumulator::default();
        for step in &steps {
            accumulator.push(step);
        }
        let old = previous.segments();
        for (before, segment) in old[at..].iter().zip(&old[at + 1..]) {
            accumulator.push(&RedressedStep {
                segment: segment.segment,
                point: segment.point,
                distance_m: segment.distance_m - before.distance_m,
                eta_s: segment.eta_s - before.eta_s,
                weight_s: segment.weight_s - before.weight_s,
                camera_kmh: segment.camera_kmh,
            });
        }
        accumulator.end_subroute(RouteWeight::ZERO);

        info!("rejoined the previous route at {:?}", adjusted.meeting);
        Ok(Some(accumulator.into_route(vec![position, finish_point])))
    }
}

/// Cumulative totals over pushed steps, split into subroutes.
#[derive(Default)]
struct Accumulator {
    segments: Vec<RouteSegment>,
    subroute_ends: Vec<usize>,
    distance_m: f64,
    eta_s: f64,
    weight_s: f64,
    pass_through_changes: u32,
}

impl Accumulator {
    fn push(&mut self, step: &RedressedStep) {
        self.distance_m += step.distance_m;
        self.eta_s += step.eta_s;
        self.weight_s += step.weight_s;
        self.segments.push(RouteSegment {
            segment: step.segment,
            point: step.point,
            distance_m: self.distance_m,
            eta_s: self.eta_s,
            weight_s: self.weight_s,
            camera_kmh: step.camera_kmh,
        });
    }

    fn end_subroute(&mut self, weight: RouteWeight) {
        self.subroute_ends.push(self.segments.len());
        self.pass_through_changes += weight.pass_through_changes();
    }

    fn into_route(self, checkpoints: Vec<Point<f64>>) -> Route {
        let weight = RouteWeight::new(self.weight_s, self.pass_through_changes);
        Route::new(checkpoints, self.segments, self.subroute_ends, weight)
    }
}

/// Heading in degrees from north into a degree-space direction vector.
fn bearing_vector(bearing: Option<f64>) -> Option<(f64, f64)> {
    bearing.map(|degrees| {
        let radians = degrees.to_radians();
        (radians.sin(), radians.cos())
    })
}

fn cross_shard(start: &FakeEnding, finish: &FakeEnding) -> bool {
    let of = |ending: &FakeEnding| ending.projections.first().map(|p| p.segment.shard());
    match (of(start), of(finish)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

fn ending_error(checkpoint: usize, count: usize) -> RouterError {
    if checkpoint == 0 {
        RouterError::StartPointNotFound
    } else if checkpoint + 1 == count {
        RouterError::EndPointNotFound
    } else {
        RouterError::IntermediatePointNotFound
    }
}

/// The next leg restarts from the previous finish ending, narrowed to
/// the road the route actually arrived on.
fn carry_ending(finish: &FakeEnding, steps: &[RedressedStep]) -> FakeEnding {
    let last = steps
        .iter()
        .rev()
        .map(|step| step.segment)
        .find(|segment| !segment.is_fake());
    let Some(last) = last else {
        return finish.clone();
    };

    let narrowed: Vec<_> = finish
        .projections
        .iter()
        .filter(|p| p.segment.shard() == last.shard() && p.segment.feature() == last.feature())
        .cloned()
        .collect();
    if narrowed.is_empty() {
        return finish.clone();
    }
    FakeEnding {
        origin: finish.origin,
        projections: narrowed,
    }
}
