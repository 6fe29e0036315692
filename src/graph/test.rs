use std::rc::Rc;

use geo::Point;
use rustc_hash::FxHashMap;

use crate::graph::{
    FeatureId, Geometry, GeometryProvider, IndexGraph, RoadData, RoadPoint, Segment, ShardId,
};
use crate::model::{RoadClass, VehicleModel, VehicleType};

fn pt(x: f64, y: f64) -> Point<f64> {
    Point::new(x * 0.001, y * 0.001)
}

struct Provider {
    roads: FxHashMap<FeatureId, RoadData>,
}

impl GeometryProvider for Provider {
    fn road(&self, _shard: ShardId, feature: FeatureId) -> Option<RoadData> {
        self.roads.get(&feature).cloned()
    }

    fn features(&self, _shard: ShardId) -> Vec<FeatureId> {
        let mut ids: Vec<_> = self.roads.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

fn road(points: Vec<Point<f64>>, one_way: bool) -> RoadData {
    RoadData {
        points,
        class: RoadClass::Residential,
        one_way,
        maxspeed_kmh: None,
    }
}

/// A horizontal road crossed by a vertical one at the horizontal road's
/// second point.
fn crossing(one_way_vertical: bool) -> IndexGraph {
    let mut roads = FxHashMap::default();
    roads.insert(
        0,
        road(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0), pt(3.0, 0.0)], false),
    );
    roads.insert(
        1,
        road(vec![pt(1.0, -1.0), pt(1.0, 0.0), pt(1.0, 1.0)], one_way_vertical),
    );

    let geometry = Geometry::new(
        0,
        VehicleModel::new(VehicleType::Car),
        Rc::new(Provider { roads }),
    );
    let mut graph = IndexGraph::new(0, geometry);
    graph.import_joints(vec![vec![RoadPoint::new(0, 1), RoadPoint::new(1, 1)]]);
    graph
}

#[test]
fn segment_points_follow_the_direction_of_travel() {
    let forward = Segment::new(0, 7, 3, true);
    assert_eq!(forward.point_id(true), 4);
    assert_eq!(forward.point_id(false), 3);

    let backward = forward.reversed();
    assert_eq!(backward.point_id(true), 3);
    assert_eq!(backward.point_id(false), 4);
    assert_eq!(backward.reversed(), forward);
}

#[test]
fn joints_fan_out_over_every_fused_road() {
    let mut graph = crossing(false);

    let from = Segment::new(0, 0, 0, true);
    let out = graph.neighbors(from, true);

    let expected = [
        Segment::new(0, 0, 1, true),
        Segment::new(0, 1, 1, true),
        Segment::new(0, 1, 0, false),
    ];
    assert_eq!(out.len(), expected.len());
    for segment in expected {
        assert!(out.contains(&segment), "missing {segment:?}");
    }
}

#[test]
fn interior_points_only_continue_along_the_feature() {
    let mut graph = crossing(false);

    let from = Segment::new(0, 0, 1, true);
    let out = graph.neighbors(from, true);
    assert_eq!(out.as_slice(), [Segment::new(0, 0, 2, true)]);
}

#[test]
fn road_ends_have_no_onward_segments() {
    let mut graph = crossing(false);

    // Expanding backwards from the very first segment.
    let from = Segment::new(0, 0, 0, true);
    let out = graph.neighbors(from, false);
    assert!(out.is_empty());
}

#[test]
fn one_way_roads_cannot_be_entered_against_their_direction() {
    let mut graph = crossing(true);

    let from = Segment::new(0, 0, 0, true);
    let out = graph.neighbors(from, true);

    assert!(out.contains(&Segment::new(0, 1, 1, true)));
    assert!(!out.contains(&Segment::new(0, 1, 0, false)));
}

#[test]
fn restrictions_cut_specific_feature_transitions() {
    let mut graph = crossing(false);
    graph.set_restrictions([(0u32, 1u32)]);

    let from = Segment::new(0, 0, 0, true);
    let out = graph.neighbors(from, true);
    assert_eq!(out.as_slice(), [Segment::new(0, 0, 1, true)]);
}

#[test]
fn blocked_access_removes_a_whole_feature() {
    use crate::graph::RoadAccess;

    let mut graph = crossing(false);
    graph.set_access([(1u32, RoadAccess::No)]);

    let from = Segment::new(0, 0, 0, true);
    let out = graph.neighbors(from, true);
    assert_eq!(out.as_slice(), [Segment::new(0, 0, 1, true)]);
}

#[test]
fn joint_and_end_points_are_vertices() {
    let mut graph = crossing(false);

    assert!(graph.is_joint_or_end(RoadPoint::new(0, 0)));
    assert!(graph.is_joint_or_end(RoadPoint::new(0, 1)));
    assert!(!graph.is_joint_or_end(RoadPoint::new(0, 2)));
    assert!(graph.is_joint_or_end(RoadPoint::new(0, 3)));
}

#[test]
fn impassable_classes_never_surface_as_neighbors() {
    let mut roads = FxHashMap::default();
    roads.insert(0, road(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0)], false));
    roads.insert(
        1,
        RoadData {
            points: vec![pt(1.0, 0.0), pt(1.0, 1.0)],
            class: RoadClass::Footway,
            one_way: false,
            maxspeed_kmh: None,
        },
    );

    let geometry = Geometry::new(
        0,
        VehicleModel::new(VehicleType::Car),
        Rc::new(Provider { roads }),
    );
    let mut graph = IndexGraph::new(0, geometry);
    graph.import_joints(vec![vec![RoadPoint::new(0, 1), RoadPoint::new(1, 0)]]);

    let out = graph.neighbors(Segment::new(0, 0, 0, true), true);
    assert_eq!(out.as_slice(), [Segment::new(0, 0, 1, true)]);
}
