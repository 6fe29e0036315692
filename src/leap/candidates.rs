use std::time::Duration;

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::Segment;
use crate::leap::{LeapBans, LeapsGraph};
use crate::model::HighwayCategory;
use crate::search::{
    find_path_bidirectional, Cancellable, Deadline, Path, SearchError, SearchOptions,
    LEAP_PROGRESS_PERIOD,
};
use crate::snap::FakeEnding;
use crate::world::WorldGraph;

/// Collection stops once this many distinct entry and exit border
/// features have produced candidates.
pub const MAX_DISTINCT_ENDPOINTS: usize = 15;

/// Wall-clock budget for candidate collection; once it expires the best
/// candidates found so far are used.
pub const CANDIDATE_TIME_BUDGET: Duration = Duration::from_secs(30);

/// At most this many candidates survive per highway-category bucket.
pub const MAX_PER_BUCKET: usize = 2;

/// The first and last real hop of a coarse path, if it has any.
fn endpoint_hops(vertices: &[Segment]) -> Option<(Segment, Segment)> {
    if vertices.len() < 3 {
        return None;
    }
    Some((vertices[1], vertices[vertices.len() - 2]))
}

/// Runs the coarse search repeatedly, banning each candidate's entry and
/// exit features, until the endpoint diversity cap or the time budget is
/// reached. The coarse heuristic misranks hop sequences, so several
/// structurally different candidates beat trusting the single optimum.
pub fn collect_candidates(
    world: &mut WorldGraph,
    start: &FakeEnding,
    finish: &FakeEnding,
    cancel: &dyn Cancellable,
) -> Result<Vec<Path<Segment>>, SearchError> {
    let start_shard = start
        .projections
        .first()
        .map(|p| p.segment.shard())
        .ok_or(SearchError::NoPath)?;
    let finish_shard = finish
        .projections
        .first()
        .map(|p| p.segment.shard())
        .ok_or(SearchError::NoPath)?;

    let deadline = Deadline::new(cancel, CANDIDATE_TIME_BUDGET);
    let mut bans = LeapBans::default();
    let mut seen: FxHashSet<(Segment, Segment)> = FxHashSet::default();
    let mut candidates = Vec::new();

    loop {
        let mut graph = LeapsGraph::new(
            world,
            start.origin,
            start_shard,
            finish.origin,
            finish_shard,
            &bans,
        );
        let (s, f) = (graph.start(), graph.finish());
        let mut options = SearchOptions::new(&deadline);
        options.progress_period = LEAP_PROGRESS_PERIOD;
        options.tolerate_bad_reduced_weight = true;

        match find_path_bidirectional(&mut graph, s, f, options) {
            Ok(path) => {
                let Some((first, last)) = endpoint_hops(&path.vertices) else {
                    // Start and finish share a shard; one direct
                    // candidate is all there is.
                    candidates.push(path);
                    break;
                };
                trace!(
                    "leap candidate {} hops, weight {}",
                    path.vertices.len() - 2,
                    path.weight
                );
                if seen.insert((first, last)) {
                    candidates.push(path);
                }
                bans.entries.insert(first.feature());
                bans.exits.insert(last.feature());
                if bans.entries.len() >= MAX_DISTINCT_ENDPOINTS
                    || bans.exits.len() >= MAX_DISTINCT_ENDPOINTS
                {
                    break;
                }
            }
            Err(SearchError::NoPath) => break,
            Err(SearchError::Cancelled) => {
                if cancel.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                // Budget ran out; keep whatever was collected.
                break;
            }
        }
    }

    if candidates.is_empty() {
        return Err(SearchError::NoPath);
    }
    debug!("collected {} leap candidates", candidates.len());
    Ok(candidates)
}

/// Keeps the cheapest candidates, at most [`MAX_PER_BUCKET`] per
/// (first hop, last hop) highway-category pair.
pub fn bucket_candidates(
    world: &mut WorldGraph,
    mut candidates: Vec<Path<Segment>>,
) -> Vec<Path<Segment>> {
    candidates.sort_by(|a, b| a.weight.cmp(&b.weight));

    let mut counts: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut kept = Vec::new();
    for path in candidates {
        let Some((first, last)) = endpoint_hops(&path.vertices) else {
            kept.push(path);
            continue;
        };
        let key = (category(world, first), category(world, last));
        let count = counts.entry(key).or_insert(0);
        if *count < MAX_PER_BUCKET {
            *count += 1;
            kept.push(path);
        }
    }
    kept
}

fn category(world: &mut WorldGraph, segment: Segment) -> usize {
    world
        .road(segment)
        .map(|road| HighwayCategory::from(road.class()).index())
        .unwrap_or(HighwayCategory::Minor.index())
}
