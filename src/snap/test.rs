use std::rc::Rc;

use geo::Point;

use crate::graph::{Geometry, IndexGraph, Segment, ShardId};
use crate::model::{VehicleModel, VehicleType};
use crate::snap::{find_ending, DeadEndCache, SnapIndex, SnapParams};
use crate::test_fixtures::{grid_point, residential, MockSource};

fn graph_from(source: MockSource, shard: ShardId) -> IndexGraph {
    let geometry = Geometry::new(shard, VehicleModel::new(VehicleType::Car), Rc::new(source));
    IndexGraph::new(shard, geometry)
}

fn snap(
    graph: &mut IndexGraph,
    point: Point<f64>,
    bearing: Option<(f64, f64)>,
) -> Option<crate::snap::FakeEnding> {
    let index = SnapIndex::build(graph);
    let mut dead_ends = DeadEndCache::new();
    let mut params = SnapParams {
        bearing,
        outgoing: true,
        dead_ends: &mut dead_ends,
    };
    find_ending(&index, graph, point, &mut params)
}

#[test]
fn points_snap_to_the_closest_segment() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    source.add_road(0, 0, residential(vec![grid_point(0.0, 0.0), grid_point(2.0, 0.0)]));
    source.add_road(0, 1, residential(vec![grid_point(0.0, 1.0), grid_point(2.0, 1.0)]));
    let mut graph = graph_from(source, 0);

    let ending = snap(&mut graph, grid_point(1.0, 0.2), None).unwrap();
    assert_eq!(ending.projections[0].segment.feature(), 0);

    // The projection lands on the road, not on the checkpoint.
    let on_road = ending.projections[0].on_road;
    assert!((on_road.y()).abs() < 1e-12);
}

#[test]
fn snapping_widens_until_a_candidate_appears() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    source.add_road(0, 0, residential(vec![grid_point(0.0, 0.0), grid_point(2.0, 0.0)]));
    let mut graph = graph_from(source, 0);

    // Roughly 100 m off the road: outside the 40 m radius, inside 500 m.
    let ending = snap(&mut graph, grid_point(1.0, 0.9), None).unwrap();
    assert_eq!(ending.projections.len(), 1);
    assert_eq!(ending.projections[0].segment.feature(), 0);
}

#[test]
fn nothing_within_any_radius_fails_the_snap() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    source.add_road(0, 0, residential(vec![grid_point(0.0, 0.0), grid_point(2.0, 0.0)]));
    let mut graph = graph_from(source, 0);

    // About 5.5 km away.
    assert!(snap(&mut graph, grid_point(1.0, 50.0), None).is_none());
}

#[test]
fn a_road_in_between_fences_off_the_farther_one() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    // Two parallel roads; the checkpoint sits above both.
    source.add_road(0, 0, residential(vec![grid_point(0.0, 0.0), grid_point(2.0, 0.0)]));
    source.add_road(0, 1, residential(vec![grid_point(0.0, 0.1), grid_point(2.0, 0.1)]));
    let mut graph = graph_from(source, 0);

    let ending = snap(&mut graph, grid_point(1.0, 0.2), None).unwrap();
    let features: Vec<_> = ending
        .projections
        .iter()
        .map(|p| p.segment.feature())
        .collect();
    assert!(features.contains(&1));
    assert!(!features.contains(&0), "feature 0 is behind feature 1");
}

#[test]
fn bearing_prefers_the_single_codirectional_road() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    source.add_road(0, 0, residential(vec![grid_point(-1.0, 0.0), grid_point(1.0, 0.0)]));
    source.add_road(0, 1, residential(vec![grid_point(0.0, -1.0), grid_point(0.0, 1.0)]));
    let mut graph = graph_from(source, 0);

    // Moving along the x axis right at the crossing: the east-west road
    // wins alone.
    let ending = snap(&mut graph, grid_point(0.05, 0.05), Some((1.0, 0.0))).unwrap();
    let features: Vec<_> = ending
        .projections
        .iter()
        .map(|p| p.segment.feature())
        .collect();
    assert_eq!(features, vec![0]);
}

#[test]
fn a_bearing_across_the_only_road_still_snaps() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    source.add_road(0, 0, residential(vec![grid_point(0.0, -1.0), grid_point(0.0, 1.0)]));
    let mut graph = graph_from(source, 0);

    // Heading east next to a north-south road: nothing is
    // codirectional, so the candidates survive unfiltered.
    let ending = snap(&mut graph, grid_point(0.05, 0.0), Some((1.0, 0.0))).unwrap();
    assert_eq!(ending.projections.len(), 1);
    assert_eq!(ending.projections[0].segment.feature(), 0);
}

#[test]
fn tiny_networks_are_dead_ends_but_still_snap() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    source.add_road(0, 0, residential(vec![grid_point(0.0, 0.0), grid_point(1.0, 0.0)]));
    let mut graph = graph_from(source, 0);

    let mut dead_ends = DeadEndCache::new();
    assert!(dead_ends.is_dead_end(&mut graph, Segment::new(0, 0, 0, true), true));

    // The fail-open pass keeps the dead-end candidate.
    let ending = snap(&mut graph, grid_point(0.5, 0.1), None).unwrap();
    assert_eq!(ending.projections.len(), 1);
}

#[test]
fn long_roads_are_not_dead_ends() {
    let mut source = MockSource::new();
    source.add_shard(0, "test");
    let points = (0..600).map(|i| grid_point(i as f64 * 0.01, 0.0)).collect();
    source.add_road(0, 0, residential(points));
    let mut graph = graph_from(source, 0);

    let mut dead_ends = DeadEndCache::new();
    assert!(!dead_ends.is_dead_end(&mut graph, Segment::new(0, 0, 0, true), true));
}
