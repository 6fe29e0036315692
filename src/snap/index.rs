use geo::{Distance, Haversine, Point};
use rstar::{RTree, RTreeObject, AABB};

use crate::graph::{IndexGraph, Segment, ShardId};

/// Rough meters per degree of latitude; good enough to widen a search
/// radius into a degree-space envelope.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// One road segment with its endpoint coordinates, as stored in the
/// spatial index.
#[derive(Clone, Debug)]
pub struct SegmentEntry {
    pub segment: Segment,
    pub front: Point<f64>,
    pub back: Point<f64>,
}

impl SegmentEntry {
    /// The closest point of the segment to `point`, by linear
    /// interpolation in degree space.
    pub fn project(&self, point: Point<f64>) -> Point<f64> {
        let dx = self.front.x() - self.back.x();
        let dy = self.front.y() - self.back.y();
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return self.back;
        }
        let t = ((point.x() - self.back.x()) * dx + (point.y() - self.back.y()) * dy) / len2;
        let t = t.clamp(0.0, 1.0);
        Point::new(self.back.x() + t * dx, self.back.y() + t * dy)
    }

    /// Cosine of the angle between the segment direction and a bearing
    /// vector.
    pub fn direction_cos(&self, bearing: (f64, f64)) -> f64 {
        let dx = self.front.x() - self.back.x();
        let dy = self.front.y() - self.back.y();
        let len = (dx * dx + dy * dy).sqrt();
        let blen = (bearing.0 * bearing.0 + bearing.1 * bearing.1).sqrt();
        if len == 0.0 || blen == 0.0 {
            return 1.0;
        }
        (dx * bearing.0 + dy * bearing.1) / (len * blen)
    }

    pub fn distance_m(&self, point: Point<f64>) -> f64 {
        Haversine.distance(point, self.project(point))
    }
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.front, self.back)
    }
}

/// Spatial index over every directed forward segment of one shard.
pub struct SnapIndex {
    shard: ShardId,
    tree: RTree<SegmentEntry>,
}

impl SnapIndex {
    /// Indexes every passable segment of the shard, forward direction
    /// only; snapping decides direction later.
    pub fn build(graph: &mut IndexGraph) -> Self {
        let shard = graph.shard();
        let features = graph.geometry().features();

        let mut entries = Vec::new();
        for feature in features {
            let Some(road) = graph.geometry().road(feature) else {
                continue;
            };
            if !road.is_passable() {
                continue;
            }
            for idx in 0..road.segments_count() {
                entries.push(SegmentEntry {
                    segment: Segment::new(shard, feature, idx, true),
                    back: road.point(idx),
                    front: road.point(idx + 1),
                });
            }
        }

        SnapIndex {
            shard,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }

    /// Entries whose envelope is within `radius_m` of the point. The
    /// caller refines with exact projections.
    pub fn nearby(&self, point: Point<f64>, radius_m: f64) -> impl Iterator<Item = &SegmentEntry> {
        let slack = radius_m / METERS_PER_DEGREE;
        let envelope = AABB::from_corners(
            Point::new(point.x() - slack, point.y() - slack),
            Point::new(point.x() + slack, point.y() + slack),
        );
        self.tree.locate_in_envelope_intersecting(&envelope)
    }
}
