use std::rc::Rc;

use approx::assert_relative_eq;
use geo::{Distance, Haversine, Point};

use crate::codec::{ExportRoad, GraphSerializer};
use crate::graph::RoadData;
use crate::model::{RoadClass, VehicleType};
use crate::router::{Router, RouterError};
use crate::search::NeverCancel;
use crate::shard::Section;
use crate::test_fixtures::{grid_point, residential, two_shard_corridor, MockSource};
use crate::world::GUIDE_SHARD_ID;

fn one_way(points: Vec<Point<f64>>) -> RoadData {
    RoadData {
        points,
        class: RoadClass::Residential,
        one_way: true,
        maxspeed_kmh: None,
    }
}

/// A 4x4 grid of one-way streets: rows run east, columns run north.
/// `flip_row`, if set, reverses that row to run west.
fn one_way_grid(source: &mut MockSource, flip_row: Option<u32>) {
    source.add_shard(0, "one-way-grid");

    for r in 0..4u32 {
        let mut points: Vec<_> = (0..4).map(|c| grid_point(c as f64, r as f64)).collect();
        if flip_row == Some(r) {
            points.reverse();
        }
        source.add_road(0, r, one_way(points));
    }
    for c in 0..4u32 {
        let points = (0..4).map(|r| grid_point(c as f64, r as f64)).collect();
        source.add_road(0, 4 + c, one_way(points));
    }

    let joint = |r: u32, c: u32| r * 4 + c;
    let mut roads = Vec::new();
    for r in 0..4u32 {
        let column = |c: u32| if flip_row == Some(r) { 3 - c } else { c };
        roads.push(ExportRoad {
            feature: r,
            mask: u8::MAX,
            joints: (0..4).map(|p| (p, joint(r, column(p)))).collect(),
        });
    }
    for c in 0..4u32 {
        roads.push(ExportRoad {
            feature: 4 + c,
            mask: u8::MAX,
            joints: (0..4).map(|r| (r, joint(r, c))).collect(),
        });
    }
    source.set_section(0, Section::Routing, GraphSerializer::serialize(roads));
}

/// A 200-cell corridor (feature 0, eastbound along y 0) with a branch
/// road (feature 1) dropping from (50, 18) down to the corridor.
fn long_corridor(source: &mut MockSource) {
    source.add_shard(0, "long-corridor");

    let main = (0..=200).map(|i| grid_point(i as f64, 0.0)).collect();
    source.add_road(0, 0, residential(main));
    let branch = (0..=18)
        .map(|i| grid_point(50.0, 18.0 - i as f64))
        .collect();
    source.add_road(0, 1, residential(branch));

    let roads = vec![
        ExportRoad {
            feature: 0,
            mask: u8::MAX,
            joints: vec![(50, 0)],
        },
        ExportRoad {
            feature: 1,
            mask: u8::MAX,
            joints: vec![(18, 0)],
        },
    ];
    source.set_section(0, Section::Routing, GraphSerializer::serialize(roads));
}

fn cell_m() -> f64 {
    Haversine.distance(grid_point(0.0, 0.0), grid_point(0.0, 1.0))
}

#[test]
fn one_way_grid_route_is_a_manhattan_path() {
    let mut source = MockSource::new();
    one_way_grid(&mut source, None);
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let route = router
        .calculate_route(
            &[grid_point(0.5, 0.0), grid_point(2.5, 3.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    // 2 cells east, 3 north, only permitted directions.
    assert_relative_eq!(route.total_distance_m(), 5.0 * cell_m(), epsilon = 1.0);
    assert!(route.segments().iter().all(|s| s.segment.is_forward()));
}

#[test]
fn reversing_one_row_leaves_the_other_paths_intact() {
    let mut source = MockSource::new();
    one_way_grid(&mut source, Some(1));
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let route = router
        .calculate_route(
            &[grid_point(0.5, 0.0), grid_point(2.5, 3.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    // Row 1 now runs west; the remaining rows still give a Manhattan
    // path of the same length.
    assert_relative_eq!(route.total_distance_m(), 5.0 * cell_m(), epsilon = 1.0);
    assert!(route.segments().iter().all(|s| s.segment.is_forward()));
    assert!(route
        .segments()
        .iter()
        .all(|s| s.segment.feature() != 1));
}

#[test]
fn one_way_streets_cannot_be_driven_backwards() {
    let mut source = MockSource::new();
    one_way_grid(&mut source, None);
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let result = router.calculate_route(
        &[grid_point(2.5, 0.0), grid_point(0.5, 0.0)],
        None,
        false,
        &NeverCancel,
    );
    assert!(matches!(result, Err(RouterError::RouteNotFound)));
}

#[test]
fn corridor_route_crosses_the_shard_border() {
    let mut source = MockSource::new();
    let (west, _) = two_shard_corridor(&mut source);
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let route = router
        .calculate_route(
            &[grid_point(0.5, 0.0), grid_point(7.5, 0.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    let segments: Vec<_> = route.segments().iter().map(|s| s.segment).collect();
    assert!(segments.contains(&west));
    assert!(segments.iter().any(|s| s.shard() == 1));
    // Half a cell at each end, three west cells, the border cell once,
    // and two east cells: nothing under the border may go missing.
    assert_relative_eq!(route.total_distance_m(), 7.0 * cell_m(), epsilon = 1.0);
    assert!(router.last_route().is_some());
}

#[test]
fn a_checkpoint_outside_every_shard_needs_more_maps() {
    let mut source = MockSource::new();
    two_shard_corridor(&mut source);
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let result = router.calculate_route(
        &[grid_point(0.5, 0.0), grid_point(50.0, 50.0)],
        None,
        false,
        &NeverCancel,
    );
    assert!(matches!(result, Err(RouterError::NeedMoreMaps)));
}

#[test]
fn adjustment_triggers_on_the_distance_thresholds() {
    // 2 km off with 15 km remaining rejoins; 8 km remaining rebuilds.
    assert!(Router::should_adjust(15_000.0, 2_000.0));
    assert!(!Router::should_adjust(8_000.0, 2_000.0));
    assert!(!Router::should_adjust(15_000.0, 6_000.0));
}

#[test]
fn adjustment_rejoins_the_previous_route() {
    let mut source = MockSource::new();
    long_corridor(&mut source);
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let full = router
        .calculate_route(
            &[grid_point(0.5, 0.0), grid_point(199.5, 0.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();
    let tail: Vec<_> = full
        .segments()
        .iter()
        .rev()
        .take(10)
        .map(|s| s.segment)
        .collect();

    // 2 km off route at the branch top, 16 km still ahead.
    let adjusted = router
        .calculate_route(
            &[grid_point(50.0, 18.0), grid_point(199.5, 0.0)],
            None,
            true,
            &NeverCancel,
        )
        .unwrap();

    let adjusted_tail: Vec<_> = adjusted
        .segments()
        .iter()
        .rev()
        .take(10)
        .map(|s| s.segment)
        .collect();
    assert_eq!(tail, adjusted_tail);
    assert!(adjusted
        .segments()
        .iter()
        .any(|s| s.segment.feature() == 1));
    assert!(adjusted.total_distance_m() < full.total_distance_m());
}

#[test]
fn a_short_remainder_forces_a_rebuild() {
    let mut source = MockSource::new();
    long_corridor(&mut source);
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    router
        .calculate_route(
            &[grid_point(0.5, 0.0), grid_point(199.5, 0.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    // Only ~5.5 km remains past the deviation point.
    let rejoined = router
        .try_adjust(
            &[grid_point(150.0, 18.0), grid_point(199.5, 0.0)],
            &NeverCancel,
        )
        .unwrap();
    assert!(rejoined.is_none());
    assert!(router.last_route().is_some());
}

#[test]
fn a_leg_between_guide_attachments_follows_the_track() {
    let mut router = Router::new(VehicleType::Car, Rc::new(MockSource::new()));
    router.set_guides(vec![vec![
        grid_point(0.0, 0.0),
        grid_point(1.0, 0.0),
        grid_point(2.0, 0.0),
        grid_point(3.0, 0.0),
    ]]);

    let route = router
        .calculate_route(
            &[grid_point(0.0, 0.0), grid_point(3.0, 0.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    assert_eq!(route.segments().len(), 3);
    assert!(route
        .segments()
        .iter()
        .all(|s| s.segment.shard() == GUIDE_SHARD_ID));
    assert_relative_eq!(route.total_distance_m(), 3.0 * cell_m(), epsilon = 1.0);
}

#[test]
fn a_route_transfers_from_the_road_onto_a_guide_track() {
    // A short road along y 0 ends where a guide track climbs north to
    // (2, 3), outside the shard. The route has to drive the road and
    // switch to the track at its first vertex.
    let mut source = MockSource::new();
    source.add_shard(0, "road-stub");
    let road = (0..=2).map(|i| grid_point(i as f64, 0.0)).collect();
    source.add_road(0, 0, residential(road));
    source.set_section(
        0,
        Section::Routing,
        GraphSerializer::serialize(vec![ExportRoad {
            feature: 0,
            mask: u8::MAX,
            joints: vec![],
        }]),
    );

    let mut router = Router::new(VehicleType::Car, Rc::new(source));
    router.set_guides(vec![vec![
        grid_point(2.0, 0.0),
        grid_point(2.0, 1.0),
        grid_point(2.0, 2.0),
        grid_point(2.0, 3.0),
    ]]);

    let route = router
        .calculate_route(
            &[grid_point(0.5, 0.0), grid_point(2.0, 3.0)],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    let segments: Vec<_> = route.segments().iter().map(|s| s.segment).collect();
    assert!(segments.iter().any(|s| s.shard() == 0));
    assert!(segments.iter().any(|s| s.shard() == GUIDE_SHARD_ID));
    let last = route.segments().last().unwrap();
    assert!(Haversine.distance(last.point, grid_point(2.0, 3.0)) < 1.0);
    assert_relative_eq!(route.total_distance_m(), 4.5 * cell_m(), epsilon = 1.0);
}

#[test]
fn via_checkpoints_split_the_route_into_subroutes() {
    let mut source = MockSource::new();
    crate::test_fixtures::grid_shard(&mut source, 0, "grid", (0.0, 0.0));
    let mut router = Router::new(VehicleType::Car, Rc::new(source));

    let route = router
        .calculate_route(
            &[
                grid_point(0.5, 0.0),
                grid_point(2.0, 1.5),
                grid_point(3.0, 3.0),
            ],
            None,
            false,
            &NeverCancel,
        )
        .unwrap();

    assert_eq!(route.checkpoints().len(), 3);
    assert_eq!(route.subroutes().len(), 2);
    assert!(route.subroutes().iter().all(|leg| !leg.is_empty()));
    let last = route.segments().last().unwrap();
    assert!(Haversine.distance(last.point, grid_point(3.0, 3.0)) < cell_m());
}
