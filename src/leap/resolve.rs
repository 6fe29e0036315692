use log::{debug, warn};

use crate::graph::Segment;
use crate::leap::{bucket_candidates, collect_candidates};
use crate::search::{
    find_path_bidirectional, Cancellable, Path, RouteWeight, SearchError, SearchOptions,
};
use crate::snap::{FakeEnding, Projection};
use crate::world::{Mode, Starter, WorldGraph};

/// The whole leap pipeline: collect diverse coarse candidates, bucket
/// and probe them, then densely resolve the winner. Connector caches
/// are purged before dense resolution to bound memory.
pub fn route_with_leaps(
    world: &mut WorldGraph,
    start: &FakeEnding,
    finish: &FakeEnding,
    cancel: &dyn Cancellable,
) -> Result<(Vec<Segment>, RouteWeight), SearchError> {
    world.set_mode(Mode::LeapsOnly);
    let candidates = collect_candidates(world, start, finish, cancel)?;
    let candidates = bucket_candidates(world, candidates);
    let winner = pick_candidate(world, start, finish, candidates, cancel)?;

    world.stitch().purge();
    resolve_leaps(world, start, finish, &winner, cancel)
}

/// Drops immediate reverse loops: a hop followed by a hop straight back
/// over the same vertex contributes nothing but weight.
pub fn collapse_reverse_loops(vertices: &mut Vec<Segment>) {
    let mut i = 1;
    while i + 1 < vertices.len() {
        let back = vertices[i + 1] == vertices[i - 1]
            || vertices[i + 1] == vertices[i - 1].reversed();
        if back {
            vertices.drain(i..=i + 1);
            i = i.saturating_sub(1).max(1);
        } else {
            i += 1;
        }
    }
}

/// An ending pinned to one directed segment, entered only at its front
/// point. Used for hop boundaries during dense resolution.
fn transition_ending(world: &mut WorldGraph, segment: Segment) -> Option<FakeEnding> {
    let front = world.point(segment, true)?;
    let back = world.point(segment, false)?;
    Some(FakeEnding {
        origin: front,
        projections: vec![Projection {
            segment,
            on_road: front,
            segment_back: back,
            segment_front: front,
            one_way: true,
        }],
    })
}

fn resolve_piece(
    world: &mut WorldGraph,
    from: &FakeEnding,
    to: &FakeEnding,
    mode: Mode,
    cancel: &dyn Cancellable,
) -> Result<(Vec<Segment>, RouteWeight), SearchError> {
    world.set_mode(mode);
    let mut starter = Starter::new(world, from, to, 0, false);
    let (s, f) = (starter.start(), starter.finish());
    let path = find_path_bidirectional(&mut starter, s, f, SearchOptions::new(cancel))?;
    let expanded = starter.reconstruct(&path.vertices);

    // Part-of-real pieces stand in for the segment they cover; pure
    // connector fakes carry no road.
    let mut segments = Vec::with_capacity(expanded.len());
    for vertex in expanded {
        let real = match starter.fake_data(&vertex) {
            Some(data) => match data.real {
                Some(real) if data.from != data.to => real,
                _ => continue,
            },
            None => vertex,
        };
        if segments.last() != Some(&real) {
            segments.push(real);
        }
    }
    Ok((segments, path.weight))
}

/// First/last-hop probe: dense sub-routes at both ends plus the
/// connector estimate of the middle pick the best candidate without
/// fully resolving every one.
pub fn pick_candidate(
    world: &mut WorldGraph,
    start: &FakeEnding,
    finish: &FakeEnding,
    mut candidates: Vec<Path<Segment>>,
    cancel: &dyn Cancellable,
) -> Result<Path<Segment>, SearchError> {
    for path in &mut candidates {
        collapse_reverse_loops(&mut path.vertices);
    }
    if candidates.len() == 1 {
        return Ok(candidates.remove(0));
    }

    let mut best: Option<(RouteWeight, usize)> = None;
    for (i, path) in candidates.iter().enumerate() {
        match estimate_candidate(world, start, finish, path, cancel) {
            Ok(estimate) => {
                if best.is_none_or(|(b, _)| estimate < b) {
                    best = Some((estimate, i));
                }
            }
            Err(SearchError::Cancelled) => return Err(SearchError::Cancelled),
            Err(SearchError::NoPath) => continue,
        }
    }

    match best {
        Some((weight, i)) => {
            debug!("picked leap candidate {i} with estimate {weight}");
            Ok(candidates.swap_remove(i))
        }
        // No endpoint hop was densely resolvable; trust the coarse
        // ranking rather than give up before dense resolution.
        None => Ok(candidates.remove(0)),
    }
}

fn estimate_candidate(
    world: &mut WorldGraph,
    start: &FakeEnding,
    finish: &FakeEnding,
    path: &Path<Segment>,
    cancel: &dyn Cancellable,
) -> Result<RouteWeight, SearchError> {
    let hops: Vec<Segment> = path
        .vertices
        .iter()
        .copied()
        .filter(|v| !v.is_fake())
        .collect();
    let (Some(&first), Some(&last)) = (hops.first(), hops.last()) else {
        return Ok(path.weight);
    };

    let first_to = transition_ending(world, first).ok_or(SearchError::NoPath)?;
    let (_, first_weight) = resolve_hop(world, start, &first_to, cancel)?;
    let last_from = transition_ending(world, last).ok_or(SearchError::NoPath)?;
    let (_, last_weight) = resolve_hop(world, &last_from, finish, cancel)?;

    let mut middle = RouteWeight::ZERO;
    let source = world.source();
    for pair in hops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.shard() != b.shard() {
            continue;
        }
        match world.stitch().enter_to_exit(source.as_ref(), a, b) {
            Some(weight) => middle += weight,
            None => {
                // No matrix for this shard; fall back to the crow-fly
                // bound so the candidate stays comparable.
                let (Some(from), Some(to)) = (world.point(a, true), world.point(b, true))
                else {
                    return Err(SearchError::NoPath);
                };
                middle += RouteWeight::from_seconds(world.estimator().heuristic(from, to));
            }
        }
    }

    Ok(first_weight + middle + last_weight)
}

/// Resolves one hop: same-shard first, full detail on failure.
fn resolve_hop(
    world: &mut WorldGraph,
    from: &FakeEnding,
    to: &FakeEnding,
    cancel: &dyn Cancellable,
) -> Result<(Vec<Segment>, RouteWeight), SearchError> {
    match resolve_piece(world, from, to, Mode::JointSingleShard, cancel) {
        Err(SearchError::NoPath) => resolve_piece(world, from, to, Mode::Joints, cancel),
        other => other,
    }
}

/// Densely resolves the winning candidate hop by hop. Hops that fail in
/// isolation retry over a widened window, rewinding one resolved hop at
/// a time until a connected sub-route exists.
pub fn resolve_leaps(
    world: &mut WorldGraph,
    start: &FakeEnding,
    finish: &FakeEnding,
    path: &Path<Segment>,
    cancel: &dyn Cancellable,
) -> Result<(Vec<Segment>, RouteWeight), SearchError> {
    let transitions: Vec<Segment> = path
        .vertices
        .iter()
        .copied()
        .filter(|v| !v.is_fake())
        .collect();

    // Hop boundaries: the start ending, every same-shard transition
    // pair, the finish ending. Twin crossings cost nothing and need no
    // sub-route.
    let mut hops: Vec<(FakeEnding, FakeEnding)> = Vec::new();
    if transitions.is_empty() {
        hops.push((start.clone(), finish.clone()));
    } else {
        let first = transition_ending(world, transitions[0]).ok_or(SearchError::NoPath)?;
        hops.push((start.clone(), first));
        for pair in transitions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.shard() != b.shard() {
                continue;
            }
            let from = transition_ending(world, a).ok_or(SearchError::NoPath)?;
            let to = transition_ending(world, b).ok_or(SearchError::NoPath)?;
            hops.push((from, to));
        }
        let last = transition_ending(world, transitions[transitions.len() - 1])
            .ok_or(SearchError::NoPath)?;
        hops.push((last, finish.clone()));
    }

    let mut resolved: Vec<(Vec<Segment>, RouteWeight)> = Vec::with_capacity(hops.len());
    let mut i = 0;
    while i < hops.len() {
        let to = hops[i].1.clone();
        match resolve_piece(world, &hops[i].0, &to, Mode::JointSingleShard, cancel) {
            Ok(piece) => {
                resolved.push(piece);
                i += 1;
                continue;
            }
            Err(SearchError::Cancelled) => return Err(SearchError::Cancelled),
            Err(SearchError::NoPath) => {}
        }

        // Widen: redo this hop in full detail, rewinding resolved hops
        // one boundary at a time until something connects.
        let mut rewind = 0;
        loop {
            if rewind > i {
                warn!("leap hop {i} unresolvable after full rewind");
                return Err(SearchError::NoPath);
            }
            let from = hops[i - rewind].0.clone();
            match resolve_piece(world, &from, &to, Mode::Joints, cancel) {
                Ok(piece) => {
                    resolved.truncate(resolved.len() - rewind);
                    resolved.push(piece);
                    i += 1;
                    break;
                }
                Err(SearchError::Cancelled) => return Err(SearchError::Cancelled),
                Err(SearchError::NoPath) => rewind += 1,
            }
        }
    }

    let mut segments = Vec::new();
    let mut total = RouteWeight::ZERO;
    for (piece, weight) in resolved {
        total += weight;
        for segment in piece {
            if segments.last() != Some(&segment) {
                segments.push(segment);
            }
        }
    }
    Ok((segments, total))
}
