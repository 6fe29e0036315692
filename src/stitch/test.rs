use std::rc::Rc;

use crate::graph::Segment;
use crate::search::RouteWeight;
use crate::shard::ShardSource;
use crate::stitch::{
    read_connector, write_connector, Connector, CrossShardGraph, StitchError, Transition,
};
use crate::test_fixtures::{two_shard_corridor, MockSource};

fn sample_connector() -> Connector {
    let mut connector = Connector::new(
        3,
        vec![
            Transition {
                segment: Segment::new(3, 10, 0, true),
                twins: vec![Segment::new(4, 77, 5, false)],
                enter: true,
                exit: false,
            },
            Transition {
                segment: Segment::new(3, 12, 4, true),
                twins: vec![Segment::new(4, 80, 0, true), Segment::new(5, 2, 1, true)],
                enter: true,
                exit: true,
            },
            Transition {
                segment: Segment::new(3, 20, 1, true),
                twins: vec![Segment::new(5, 9, 3, true)],
                enter: false,
                exit: true,
            },
        ],
    );
    // 2 enters x 2 exits; one pair unroutable.
    connector.set_weights(vec![
        Some(RouteWeight::from_seconds(120.0)),
        None,
        Some(RouteWeight::from_seconds(45.0)),
        Some(RouteWeight::from_seconds(300.0)),
    ]);
    connector
}

#[test]
fn connectors_survive_serialization() {
    let original = sample_connector();
    let restored = read_connector(3, &write_connector(&original)).unwrap();

    assert_eq!(restored.transitions(), original.transitions());
    assert!(restored.has_weights());

    let enter = Segment::new(3, 10, 0, true);
    let exit = Segment::new(3, 12, 4, true);
    assert_eq!(
        restored.enter_to_exit(enter, exit),
        Some(RouteWeight::from_seconds(120.0))
    );
    assert_eq!(restored.enter_to_exit(enter, Segment::new(3, 20, 1, true)), None);
}

#[test]
fn transition_queries_see_both_directions() {
    let connector = sample_connector();
    let border = Segment::new(3, 12, 4, true);

    assert!(connector.is_transition(border, true));
    assert!(connector.is_transition(border.reversed(), true));
    assert!(!connector.is_transition(Segment::new(3, 99, 0, true), true));

    // Enter-only transitions are not exits.
    assert!(!connector.is_transition(Segment::new(3, 10, 0, true), true));
    assert!(connector.is_transition(Segment::new(3, 10, 0, true), false));
}

#[test]
fn twins_are_their_own_inverse() {
    let mut source = MockSource::new();
    let (west, east) = two_shard_corridor(&mut source);
    let source: Rc<dyn ShardSource> = Rc::new(source);

    let mut stitch = CrossShardGraph::new();
    let twins = stitch.twins(source.as_ref(), west);
    assert_eq!(twins, vec![east]);

    let back = stitch.twins(source.as_ref(), east);
    assert!(back.contains(&west));
}

#[test]
fn missing_sections_degrade_instead_of_failing() {
    let mut source = MockSource::new();
    source.add_shard(7, "landlocked");
    let source: Rc<dyn ShardSource> = Rc::new(source);

    let mut stitch = CrossShardGraph::new();
    assert_eq!(
        stitch.connector(source.as_ref(), 7).err(),
        Some(StitchError::NoSection(7))
    );
    assert!(!stitch.is_transition(source.as_ref(), Segment::new(7, 0, 0, true), true));
    assert!(stitch.twins(source.as_ref(), Segment::new(7, 0, 0, true)).is_empty());
}

#[test]
fn leap_edges_enumerate_reachable_exits() {
    let mut source = MockSource::new();
    let (west, _) = two_shard_corridor(&mut source);
    let source: Rc<dyn ShardSource> = Rc::new(source);

    let mut stitch = CrossShardGraph::new();
    // The corridor has one transition acting as both enter and exit, so
    // entering over it leaves no other exit.
    let edges = stitch.leap_edges(source.as_ref(), west).unwrap();
    assert!(edges.is_empty());
}

#[test]
fn purging_forgets_cached_connectors() {
    let mut source = MockSource::new();
    let (west, _) = two_shard_corridor(&mut source);
    let source: Rc<dyn ShardSource> = Rc::new(source);

    let mut stitch = CrossShardGraph::new();
    let _ = stitch.twins(source.as_ref(), west);
    assert_eq!(stitch.loaded(), 1);

    stitch.purge();
    assert_eq!(stitch.loaded(), 0);
}
