use std::fmt::{Debug, Formatter};

/// Dense identifier of one loaded shard ("tile") of the road network.
pub type ShardId = u16;

/// Identifier of one road feature inside a shard.
pub type FeatureId = u32;

/// Marker shard for synthetic (fake) segments injected by snapping.
pub const FAKE_SHARD_ID: ShardId = ShardId::MAX;

/// Feature id shared by every synthetic segment.
pub const FAKE_FEATURE_ID: FeatureId = FeatureId::MAX;

/// One point of a road feature, addressed by its index in the feature's
/// point sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RoadPoint {
    pub feature: FeatureId,
    pub point: u32,
}

impl RoadPoint {
    pub fn new(feature: FeatureId, point: u32) -> Self {
        RoadPoint { feature, point }
    }
}

impl Debug for RoadPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoadPoint({}, {})", self.feature, self.point)
    }
}

/// A directed reference to the geometry edge between points `idx` and
/// `idx + 1` of a feature. Never owns data; real segments must resolve
/// against a live shard lease before dereferencing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Segment {
    shard: ShardId,
    feature: FeatureId,
    idx: u32,
    forward: bool,
}

impl Segment {
    pub fn new(shard: ShardId, feature: FeatureId, idx: u32, forward: bool) -> Self {
        Segment {
            shard,
            feature,
            idx,
            forward,
        }
    }

    /// A synthetic segment with the given numeration id. All fake
    /// segments share one fake shard and feature; `id` disambiguates.
    pub fn fake(id: u32) -> Self {
        Segment::new(FAKE_SHARD_ID, FAKE_FEATURE_ID, id, true)
    }

    #[inline]
    pub fn shard(&self) -> ShardId {
        self.shard
    }

    #[inline]
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    #[inline]
    pub fn idx(&self) -> u32 {
        self.idx
    }

    #[inline]
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    #[inline]
    pub fn is_fake(&self) -> bool {
        self.shard == FAKE_SHARD_ID
    }

    /// Same geometry edge, opposite direction of travel.
    #[inline]
    pub fn reversed(&self) -> Self {
        Segment {
            forward: !self.forward,
            ..*self
        }
    }

    /// Point index of the segment's front (direction of travel) or back
    /// end.
    #[inline]
    pub fn point_id(&self, front: bool) -> u32 {
        if self.forward == front {
            self.idx + 1
        } else {
            self.idx
        }
    }

    #[inline]
    pub fn road_point(&self, front: bool) -> RoadPoint {
        RoadPoint::new(self.feature, self.point_id(front))
    }
}

impl Debug for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Segment({}, {}, {}, {})",
            self.shard,
            self.feature,
            self.idx,
            if self.forward { "fwd" } else { "bwd" }
        )
    }
}
