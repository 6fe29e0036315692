use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Line, Point};
use log::debug;

use crate::graph::IndexGraph;
use crate::snap::{DeadEndCache, FakeEnding, Projection, SegmentEntry, SnapIndex};

/// Progressive search radii; snapping stops at the first radius that
/// yields any acceptable candidate.
pub const SNAP_RADII_M: [f64; 3] = [40.0, 500.0, 2000.0];

/// Upper bound on projections per ending.
pub const MAX_CANDIDATES: usize = 12;

/// Minimum |cos| between a movement bearing and a segment for the
/// segment to count as codirectional.
pub const CODIRECTIONAL_COS: f64 = 0.97;

pub struct SnapParams<'a> {
    /// Direction of current movement in degree space, if known. When any
    /// candidate is codirectional, the closest such candidate wins
    /// alone; otherwise the bearing changes nothing.
    pub bearing: Option<(f64, f64)>,
    /// Expansion direction for the dead-end test: away from a start,
    /// into a finish.
    pub outgoing: bool,
    pub dead_ends: &'a mut DeadEndCache,
}

/// Ties a raw checkpoint into the road network.
///
/// Candidates within the smallest radius win; any radius that produces
/// nothing widens to the next. Candidates fenced off by other roads are
/// dropped, as are dead ends, but a checkpoint that only has dead ends
/// keeps them rather than failing the snap.
pub fn find_ending(
    index: &SnapIndex,
    graph: &mut IndexGraph,
    point: Point<f64>,
    params: &mut SnapParams<'_>,
) -> Option<FakeEnding> {
    for filter_dead_ends in [true, false] {
        for radius in SNAP_RADII_M {
            let projections =
                candidates_within(index, graph, point, radius, filter_dead_ends, params);
            if !projections.is_empty() {
                return Some(FakeEnding {
                    origin: point,
                    projections,
                });
            }
        }
        debug!("snap at {point:?} found only dead ends, keeping them");
    }
    None
}

fn candidates_within(
    index: &SnapIndex,
    graph: &mut IndexGraph,
    point: Point<f64>,
    radius: f64,
    filter_dead_ends: bool,
    params: &mut SnapParams<'_>,
) -> Vec<Projection> {
    let mut entries: Vec<(SegmentEntry, f64)> = index
        .nearby(point, radius)
        .map(|entry| (entry.clone(), entry.distance_m(point)))
        .filter(|(_, dist)| *dist <= radius)
        .collect();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));

    let fences: Vec<SegmentEntry> = entries.iter().map(|(e, _)| e.clone()).collect();

    let mut out: Vec<(Projection, bool)> = Vec::new();
    for (entry, _) in entries {
        if out.len() >= MAX_CANDIDATES {
            break;
        }

        let Some(road) = graph.geometry().road(entry.segment.feature()) else {
            continue;
        };
        let one_way = road.is_one_way();
        drop(road);

        let projection = entry.project(point);
        if is_fenced_off(point, projection, &entry, &fences) {
            continue;
        }

        if filter_dead_ends
            && params
                .dead_ends
                .is_dead_end(graph, entry.segment, params.outgoing)
        {
            continue;
        }

        let codirectional = params.bearing.is_some_and(|bearing| {
            let cos = entry.direction_cos(bearing);
            cos >= CODIRECTIONAL_COS || (!one_way && cos <= -CODIRECTIONAL_COS)
        });
        out.push((
            Projection {
                segment: entry.segment,
                on_road: projection,
                segment_back: entry.back,
                segment_front: entry.front,
                one_way,
            },
            codirectional,
        ));
    }

    // Candidates are distance-ordered, so the first codirectional one is
    // also the closest. A bearing matching no road keeps everything.
    if let Some((projection, _)) = out.iter().find(|(_, codirectional)| *codirectional) {
        return vec![projection.clone()];
    }
    out.into_iter().map(|(projection, _)| projection).collect()
}

/// A candidate is fenced off when the straight line from the checkpoint
/// to its projection properly crosses some other road segment; snapping
/// through a parallel road is worse than a farther direct candidate.
fn is_fenced_off(
    point: Point<f64>,
    projection: Point<f64>,
    candidate: &SegmentEntry,
    fences: &[SegmentEntry],
) -> bool {
    let approach = Line::new(point, projection);
    fences.iter().any(|fence| {
        if fence.segment == candidate.segment {
            return false;
        }
        matches!(
            line_intersection(approach, Line::new(fence.back, fence.front)),
            Some(LineIntersection::SinglePoint { is_proper: true, .. })
        )
    })
}
