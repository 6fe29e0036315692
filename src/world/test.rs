use std::rc::Rc;

use approx::assert_relative_eq;
use geo::{Distance, Haversine, Point};

use crate::codec::write_transit;
use crate::graph::{Segment, TransitInfo};
use crate::model::{VehicleModel, VehicleType};
use crate::search::{find_path_bidirectional, SearchOptions};
use crate::shard::Section;
use crate::snap::{FakeEnding, Projection};
use crate::test_fixtures::{grid_point, grid_shard, two_shard_corridor, MockSource};
use crate::world::{Mode, Starter, WorldGraph};

fn world_from(source: MockSource) -> WorldGraph {
    WorldGraph::new(VehicleModel::new(VehicleType::Car), Rc::new(source))
}

/// An ending snapped exactly onto `at`, projecting onto one segment.
fn ending_on(world: &mut WorldGraph, segment: Segment, at: Point<f64>) -> FakeEnding {
    let segment_back = world.point(segment, false).unwrap();
    let segment_front = world.point(segment, true).unwrap();
    let one_way = world.road(segment).unwrap().is_one_way();
    FakeEnding {
        origin: at,
        projections: vec![Projection {
            segment,
            on_road: at,
            segment_back,
            segment_front,
            one_way,
        }],
    }
}

fn route(
    world: &mut WorldGraph,
    mode: Mode,
    from: (Segment, Point<f64>),
    to: (Segment, Point<f64>),
    strict_forward: bool,
) -> (Vec<Segment>, f64) {
    world.set_mode(mode);
    let start = ending_on(world, from.0, from.1);
    let finish = ending_on(world, to.0, to.1);

    let mut starter = Starter::new(world, &start, &finish, 0, strict_forward);
    let (s, f) = (starter.start(), starter.finish());
    let path = find_path_bidirectional(&mut starter, s, f, SearchOptions::default())
        .expect("route should exist");
    let expanded = starter.reconstruct(&path.vertices);

    let real = expanded.into_iter().filter(|v| !v.is_fake()).collect();
    (real, path.weight.seconds())
}

#[test]
fn joints_route_expands_to_the_full_detail_route() {
    let mut source = MockSource::new();
    let (west, _) = two_shard_corridor(&mut source);
    let mut world = world_from(source);

    let from = (Segment::new(0, 0, 0, true), grid_point(0.5, 0.0));
    let to = (Segment::new(1, 0, 3, true), grid_point(7.5, 0.0));

    let (full, full_weight) = route(&mut world, Mode::NoLeaps, from, to, false);
    let (joints, joints_weight) = route(&mut world, Mode::Joints, from, to, false);

    assert_eq!(joints, full);
    assert_relative_eq!(joints_weight, full_weight, epsilon = 1e-6);
    assert!(full.contains(&west));
}

#[test]
fn corridor_route_crosses_the_registered_border() {
    let mut source = MockSource::new();
    let (west, _) = two_shard_corridor(&mut source);
    let mut world = world_from(source);

    let (real, _) = route(
        &mut world,
        Mode::NoLeaps,
        (Segment::new(0, 0, 0, true), grid_point(0.5, 0.0)),
        (Segment::new(1, 0, 3, true), grid_point(7.5, 0.0)),
        false,
    );

    // The twin aliases the border segment, so expansion steps from the
    // west side straight onto the east side's continuation.
    let at = real.iter().position(|&v| v == west).unwrap();
    assert_eq!(real[at + 1], Segment::new(1, 0, 1, true));
    assert!(real.iter().all(|v| v.is_forward()));
}

#[test]
fn grid_route_takes_the_unique_corner_turn() {
    let mut source = MockSource::new();
    grid_shard(&mut source, 0, "grid", (0.0, 0.0));
    let mut world = world_from(source);

    // Half a cell back to the corner, then up the left column.
    let (real, _) = route(
        &mut world,
        Mode::NoLeaps,
        (Segment::new(0, 0, 0, true), grid_point(0.5, 0.0)),
        (Segment::new(0, 4, 2, true), grid_point(0.0, 2.5)),
        false,
    );

    assert_eq!(
        real,
        vec![Segment::new(0, 4, 0, true), Segment::new(0, 4, 1, true)]
    );
}

#[test]
fn strict_forward_start_cannot_turn_back() {
    let mut source = MockSource::new();
    grid_shard(&mut source, 0, "grid", (0.0, 0.0));
    let mut world = world_from(source);

    let from = (Segment::new(0, 0, 0, true), grid_point(0.5, 0.0));
    let to = (Segment::new(0, 4, 0, true), grid_point(0.0, 0.5));

    let (_, free) = route(&mut world, Mode::NoLeaps, from, to, false);
    let (_, strict) = route(&mut world, Mode::NoLeaps, from, to, true);

    // Reversing on the start road is the short way; forced forward the
    // route must loop around a block.
    assert!(strict > 2.0 * free);
}

#[test]
fn endings_on_one_segment_route_along_its_fraction() {
    let mut source = MockSource::new();
    two_shard_corridor(&mut source);
    let mut world = world_from(source);
    world.set_mode(Mode::NoLeaps);

    let on = Segment::new(0, 0, 1, true);
    let start = ending_on(&mut world, on, grid_point(1.2, 0.0));
    let finish = ending_on(&mut world, on, grid_point(1.8, 0.0));
    let speed = world.road(on).unwrap().speed();

    let mut starter = Starter::new(&mut world, &start, &finish, 0, false);
    let (s, f) = (starter.start(), starter.finish());
    let path = find_path_bidirectional(&mut starter, s, f, SearchOptions::default())
        .expect("in-segment route");

    assert!(path.vertices.iter().all(|v| v.is_fake()));
    let len = Haversine.distance(grid_point(1.2, 0.0), grid_point(1.8, 0.0));
    assert_relative_eq!(
        path.weight.seconds(),
        len / (speed.weight / 3.6),
        epsilon = 1e-6
    );
}

#[test]
fn fake_ids_carry_over_between_subroutes() {
    let mut source = MockSource::new();
    grid_shard(&mut source, 0, "grid", (0.0, 0.0));
    let mut world = world_from(source);

    let a = ending_on(&mut world, Segment::new(0, 0, 0, true), grid_point(0.5, 0.0));
    let b = ending_on(&mut world, Segment::new(0, 3, 0, true), grid_point(0.5, 3.0));

    let first = Starter::new(&mut world, &a, &b, 0, false);
    let next_id = first.next_fake_id();
    assert_eq!(first.start().idx(), 0);
    // Two endings, each one link plus a part per direction.
    assert_eq!(next_id, 8);
    drop(first);

    let second = Starter::new(&mut world, &b, &a, next_id, false);
    assert_eq!(second.start().idx(), next_id);
}

#[test]
fn transit_metadata_resolves_for_the_transit_vehicle_only() {
    let build = || {
        let mut source = MockSource::new();
        grid_shard(&mut source, 0, "grid", (0.0, 0.0));
        source.set_section(
            0,
            Section::Transit,
            write_transit(&[(
                0,
                TransitInfo {
                    line: 12,
                    headway_s: 600,
                },
            )]),
        );
        source
    };
    let on_line = Segment::new(0, 0, 0, true);

    let mut world = WorldGraph::new(VehicleModel::new(VehicleType::Transit), Rc::new(build()));
    assert_eq!(
        world.transit_info(on_line),
        Some(TransitInfo {
            line: 12,
            headway_s: 600
        })
    );
    assert_eq!(world.transit_info(Segment::new(0, 1, 0, true)), None);

    let mut car = world_from(build());
    assert_eq!(car.transit_info(on_line), None);
}

#[test]
fn residential_endings_allow_two_pass_through_changes() {
    let mut source = MockSource::new();
    grid_shard(&mut source, 0, "grid", (0.0, 0.0));
    let mut world = world_from(source);

    let a = ending_on(&mut world, Segment::new(0, 0, 0, true), grid_point(0.5, 0.0));
    let b = ending_on(&mut world, Segment::new(0, 3, 0, true), grid_point(0.5, 3.0));
    let starter = Starter::new(&mut world, &a, &b, 0, false);

    assert_eq!(starter.pass_through_allowance(), 2);
}
