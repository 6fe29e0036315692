use geo::{Distance, Haversine, Point};

use crate::graph::Segment;
use crate::model::Purpose;
use crate::router::RouterError;
use crate::world::{Starter, WorldGraph};

/// One step of a reconstructed leg, before route-level accumulation.
pub struct RedressedStep {
    pub segment: Segment,
    pub point: Point<f64>,
    pub distance_m: f64,
    pub eta_s: f64,
    pub weight_s: f64,
    pub camera_kmh: Option<u8>,
}

/// Turns an expanded path, fakes included, into presentable steps.
/// Zero-length connector fakes vanish; part-of-real pieces report the
/// segment they cover.
pub fn redress(
    starter: &mut Starter<'_>,
    expanded: &[Segment],
) -> Result<Vec<RedressedStep>, RouterError> {
    let mut steps = Vec::with_capacity(expanded.len());
    for &vertex in expanded {
        if let Some(data) = starter.fake_data(&vertex).cloned() {
            if data.from == data.to {
                continue;
            }
            let len = Haversine.distance(data.from, data.to);
            let estimator = starter.world().estimator();
            let (eta, weight) = match data.speed {
                Some(speed) => (
                    estimator.segment_cost(len, speed, Purpose::Eta),
                    estimator.segment_cost(len, speed, Purpose::Weight),
                ),
                None => {
                    let seconds = len / estimator.offroad_speed_mps();
                    (seconds, seconds)
                }
            };
            steps.push(RedressedStep {
                segment: data.real.unwrap_or(vertex),
                point: data.to,
                distance_m: len,
                eta_s: eta,
                weight_s: weight,
                camera_kmh: None,
            });
        } else {
            steps.push(redress_segment(starter.world(), vertex)?);
        }
    }
    Ok(steps)
}

/// Like [`redress`] for a path of real segments only (leap resolution
/// output).
pub fn redress_real(
    world: &mut WorldGraph,
    segments: &[Segment],
) -> Result<Vec<RedressedStep>, RouterError> {
    segments
        .iter()
        .map(|&segment| redress_segment(world, segment))
        .collect()
}

fn redress_segment(world: &mut WorldGraph, segment: Segment) -> Result<RedressedStep, RouterError> {
    if world.guides().contains(segment) {
        let (Some(from), Some(to)) = (world.point(segment, false), world.point(segment, true))
        else {
            return Err(RouterError::RouteReconstructionError);
        };
        let len = Haversine.distance(from, to);
        let seconds = len / world.estimator().offroad_speed_mps();
        return Ok(RedressedStep {
            segment,
            point: to,
            distance_m: len,
            eta_s: seconds,
            weight_s: seconds,
            camera_kmh: None,
        });
    }

    let Some(road) = world.road(segment) else {
        return Err(RouterError::RouteReconstructionError);
    };
    if segment.idx() >= road.segments_count() {
        return Err(RouterError::RouteReconstructionError);
    }
    let len = road.segment_len(segment.idx());
    drop(road);

    let eta = world.segment_weight(segment, Purpose::Eta).seconds();
    let weight = world.segment_weight(segment, Purpose::Weight).seconds();
    let Some(point) = world.point(segment, true) else {
        return Err(RouterError::RouteReconstructionError);
    };
    let camera = world
        .arena()
        .lease(segment.shard())
        .ok()
        .and_then(|slot| slot.graph().camera_at(segment.road_point(true)));

    Ok(RedressedStep {
        segment,
        point,
        distance_m: len,
        eta_s: eta,
        weight_s: weight,
        camera_kmh: camera,
    })
}
