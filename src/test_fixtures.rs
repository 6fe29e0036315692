//! Shared in-memory shard source for tests.

use geo::Point;
use rustc_hash::FxHashMap;

use crate::codec::{ExportRoad, GraphSerializer};
use crate::graph::{FeatureId, GeometryProvider, RoadData, Segment, ShardId};
use crate::model::RoadClass;
use crate::search::RouteWeight;
use crate::shard::{Section, ShardSource};
use crate::stitch::{write_connector, Connector, Transition};

/// Degrees per grid cell; roughly 111 m of latitude.
pub const CELL: f64 = 0.001;

pub fn grid_point(x: f64, y: f64) -> Point<f64> {
    Point::new(x * CELL, y * CELL)
}

#[derive(Default)]
struct MockShard {
    name: String,
    roads: FxHashMap<FeatureId, RoadData>,
    sections: FxHashMap<Section, Vec<u8>>,
    neighbors: Vec<ShardId>,
}

impl MockShard {
    fn bounds(&self) -> Option<(Point<f64>, Point<f64>)> {
        let mut points = self.roads.values().flat_map(|road| road.points.iter());
        let first = *points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x().min(p.x()), min.y().min(p.y())),
                Point::new(max.x().max(p.x()), max.y().max(p.y())),
            )
        });
        Some((min, max))
    }
}

/// A handful of hand-built shards held in memory.
#[derive(Default)]
pub struct MockSource {
    shards: FxHashMap<ShardId, MockShard>,
}

impl MockSource {
    pub fn new() -> Self {
        MockSource::default()
    }

    pub fn add_shard(&mut self, shard: ShardId, name: &str) {
        self.shards.insert(
            shard,
            MockShard {
                name: name.to_owned(),
                ..MockShard::default()
            },
        );
    }

    pub fn add_road(&mut self, shard: ShardId, feature: FeatureId, road: RoadData) {
        self.shards
            .get_mut(&shard)
            .expect("unknown shard")
            .roads
            .insert(feature, road);
    }

    pub fn set_section(&mut self, shard: ShardId, section: Section, data: Vec<u8>) {
        self.shards
            .get_mut(&shard)
            .expect("unknown shard")
            .sections
            .insert(section, data);
    }

    pub fn drop_section(&mut self, shard: ShardId, section: Section) {
        self.shards
            .get_mut(&shard)
            .expect("unknown shard")
            .sections
            .remove(&section);
    }

    pub fn set_neighbors(&mut self, shard: ShardId, neighbors: Vec<ShardId>) {
        self.shards.get_mut(&shard).expect("unknown shard").neighbors = neighbors;
    }
}

impl GeometryProvider for MockSource {
    fn road(&self, shard: ShardId, feature: FeatureId) -> Option<RoadData> {
        self.shards.get(&shard)?.roads.get(&feature).cloned()
    }

    fn features(&self, shard: ShardId) -> Vec<FeatureId> {
        let Some(shard) = self.shards.get(&shard) else {
            return Vec::new();
        };
        let mut ids: Vec<_> = shard.roads.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl ShardSource for MockSource {
    fn contains(&self, shard: ShardId) -> bool {
        self.shards.contains_key(&shard)
    }

    fn shard_at(&self, point: Point<f64>) -> Option<ShardId> {
        let mut ids: Vec<_> = self.shards.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().find(|id| {
            self.shards[id].bounds().is_some_and(|(min, max)| {
                (min.x()..=max.x()).contains(&point.x())
                    && (min.y()..=max.y()).contains(&point.y())
            })
        })
    }

    fn shard_name(&self, shard: ShardId) -> String {
        self.shards
            .get(&shard)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("shard-{shard}"))
    }

    fn neighbors(&self, shard: ShardId) -> Vec<ShardId> {
        self.shards
            .get(&shard)
            .map(|s| s.neighbors.clone())
            .unwrap_or_default()
    }

    fn read_section(&self, shard: ShardId, section: Section) -> Option<Vec<u8>> {
        self.shards.get(&shard)?.sections.get(&section).cloned()
    }
}

pub fn residential(points: Vec<Point<f64>>) -> RoadData {
    RoadData {
        points,
        class: RoadClass::Residential,
        one_way: false,
        maxspeed_kmh: None,
    }
}

/// A 4x4 street grid in one shard, all masks, with its routing section
/// serialized for real.
///
/// Rows are features 0..4 (point index = column), columns are features
/// 4..8 (point index = row). `origin` offsets the grid in cells.
pub fn grid_shard(source: &mut MockSource, shard: ShardId, name: &str, origin: (f64, f64)) {
    source.add_shard(shard, name);

    for r in 0..4u32 {
        let points = (0..4)
            .map(|c| grid_point(origin.0 + c as f64, origin.1 + r as f64))
            .collect();
        source.add_road(shard, r, residential(points));
    }
    for c in 0..4u32 {
        let points = (0..4)
            .map(|r| grid_point(origin.0 + c as f64, origin.1 + r as f64))
            .collect();
        source.add_road(shard, 4 + c, residential(points));
    }

    let joint = |r: u32, c: u32| r * 4 + c;
    let mut roads = Vec::new();
    for r in 0..4u32 {
        roads.push(ExportRoad {
            feature: r,
            mask: u8::MAX,
            joints: (0..4).map(|c| (c, joint(r, c))).collect(),
        });
    }
    for c in 0..4u32 {
        roads.push(ExportRoad {
            feature: 4 + c,
            mask: u8::MAX,
            joints: (0..4).map(|r| (r, joint(r, c))).collect(),
        });
    }

    source.set_section(shard, Section::Routing, GraphSerializer::serialize(roads));
}

/// Two shards joined by one border-crossing feature.
///
/// Shard 0 holds a west corridor (feature 0, x 0..5 at y 0) with a
/// crossing street at x 2; shard 1 continues it east (x 4..8, crossing
/// at x 6). The border cell x 4..5 appears in both shards with
/// identical geometry; those two copies are the twin pair, registered
/// in both cross-shard sections with a 1x1 weight matrix.
pub fn two_shard_corridor(source: &mut MockSource) -> (Segment, Segment) {
    let west = Segment::new(0, 0, 4, true);
    let east = Segment::new(1, 0, 0, true);

    for (shard, name, x0, points) in [
        (0, "corridor-west", 0.0, 6),
        (1, "corridor-east", 4.0, 5),
    ] {
        source.add_shard(shard, name);
        let corridor = (0..points).map(|i| grid_point(x0 + i as f64, 0.0)).collect();
        source.add_road(shard, 0, residential(corridor));
        let cross_x = x0 + 2.0;
        source.add_road(
            shard,
            1,
            residential(vec![
                grid_point(cross_x, -1.0),
                grid_point(cross_x, 0.0),
                grid_point(cross_x, 1.0),
            ]),
        );

        let roads = vec![
            ExportRoad {
                feature: 0,
                mask: u8::MAX,
                joints: vec![(2, 0)],
            },
            ExportRoad {
                feature: 1,
                mask: u8::MAX,
                joints: vec![(1, 0)],
            },
        ];
        source.set_section(shard, Section::Routing, GraphSerializer::serialize(roads));
    }
    source.set_neighbors(0, vec![1]);
    source.set_neighbors(1, vec![0]);

    for (shard, own, twin) in [(0u16, west, east), (1u16, east, west)] {
        let mut connector = Connector::new(
            shard,
            vec![Transition {
                segment: own,
                twins: vec![twin],
                enter: true,
                exit: true,
            }],
        );
        connector.set_weights(vec![Some(RouteWeight::from_seconds(30.0))]);
        source.set_section(shard, Section::CrossShard, write_connector(&connector));
    }

    (west, east)
}
