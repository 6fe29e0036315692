use geo::Point;

use crate::graph::Segment;

/// One accepted projection of a checkpoint onto a road segment.
#[derive(Clone, Debug)]
pub struct Projection {
    /// The forward direction of the projected-onto segment.
    pub segment: Segment,
    /// Closest point of the segment to the checkpoint.
    pub on_road: Point<f64>,
    pub segment_back: Point<f64>,
    pub segment_front: Point<f64>,
    /// A one-way road only accepts the forward direction.
    pub one_way: bool,
}

/// A checkpoint tied into the road network: the raw point plus every
/// segment it may enter or leave the network through. Consumed by the
/// fake-vertex layer.
#[derive(Clone, Debug)]
pub struct FakeEnding {
    pub origin: Point<f64>,
    pub projections: Vec<Projection>,
}

impl FakeEnding {
    /// Whether both endings project onto a shared segment; such pairs
    /// are routed directly along the segment fraction between them.
    pub fn shares_segment_with(&self, other: &FakeEnding) -> Option<Segment> {
        self.projections.iter().find_map(|mine| {
            other
                .projections
                .iter()
                .any(|theirs| theirs.segment == mine.segment)
                .then_some(mine.segment)
        })
    }
}
