use geo::{Distance, Haversine, Point};
use rustc_hash::FxHashMap;

use crate::graph::Segment;
use crate::search::RouteWeight;

/// One traversed segment of a finished route, real or synthetic, with
/// totals accumulated from the route start.
#[derive(Clone, Debug)]
pub struct RouteSegment {
    pub segment: Segment,
    /// Position reached after traversing the segment.
    pub point: Point<f64>,
    /// Distance from the route start, meters.
    pub distance_m: f64,
    /// Travel time from the route start, seconds (user-facing speeds).
    pub eta_s: f64,
    /// Search weight from the route start, seconds.
    pub weight_s: f64,
    /// Posted camera limit at the segment's far point, if any.
    pub camera_kmh: Option<u8>,
}

/// A computed route: the segment sequence with accumulated totals, the
/// checkpoints it was built for, and subroute boundaries per checkpoint
/// leg. Retained by the orchestrator to warm-start adjustment.
#[derive(Clone, Debug)]
pub struct Route {
    segments: Vec<RouteSegment>,
    /// Exclusive end index of each checkpoint leg in `segments`.
    subroute_ends: Vec<usize>,
    checkpoints: Vec<Point<f64>>,
    weight: RouteWeight,
}

impl Route {
    pub fn new(
        checkpoints: Vec<Point<f64>>,
        segments: Vec<RouteSegment>,
        subroute_ends: Vec<usize>,
        weight: RouteWeight,
    ) -> Self {
        Route {
            segments,
            subroute_ends,
            checkpoints,
            weight,
        }
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn checkpoints(&self) -> &[Point<f64>] {
        &self.checkpoints
    }

    pub fn weight(&self) -> RouteWeight {
        self.weight
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.segments.last().map(|s| s.distance_m).unwrap_or(0.0)
    }

    pub fn total_eta_s(&self) -> f64 {
        self.segments.last().map(|s| s.eta_s).unwrap_or(0.0)
    }

    /// The checkpoint legs as slices of the segment sequence.
    pub fn subroutes(&self) -> Vec<&[RouteSegment]> {
        let mut out = Vec::with_capacity(self.subroute_ends.len());
        let mut from = 0;
        for &end in &self.subroute_ends {
            out.push(&self.segments[from..end]);
            from = end;
        }
        out
    }

    /// The traversed positions, starting at the first checkpoint.
    pub fn polyline(&self) -> Vec<Point<f64>> {
        let mut out = Vec::with_capacity(self.segments.len() + 1);
        if let Some(&first) = self.checkpoints.first() {
            out.push(first);
        }
        out.extend(self.segments.iter().map(|s| s.point));
        out
    }

    /// The route position nearest to a point: segment index plus the
    /// off-route distance in meters.
    pub fn closest_to(&self, point: Point<f64>) -> Option<(usize, f64)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| (i, Haversine.distance(point, s.point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Distance still ahead of the given segment index, meters.
    pub fn remaining_distance_from(&self, index: usize) -> f64 {
        let covered = self
            .segments
            .get(index)
            .map(|s| s.distance_m)
            .unwrap_or(0.0);
        self.total_distance_m() - covered
    }

    /// Weight still ahead of every route segment; the warm-start map for
    /// adjustment.
    pub fn remaining_weights(&self) -> FxHashMap<Segment, RouteWeight> {
        let total = self.weight.seconds();
        self.segments
            .iter()
            .map(|s| {
                (
                    s.segment,
                    RouteWeight::from_seconds((total - s.weight_s).max(0.0)),
                )
            })
            .collect()
    }

    pub fn position_of(&self, segment: Segment) -> Option<usize> {
        self.segments.iter().position(|s| s.segment == segment)
    }
}
