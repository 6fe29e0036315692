use smallvec::SmallVec;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{FeatureId, Geometry, RoadPoint, Segment, ShardId};

/// Identifier of an intersection: ≥2 road points fused into one vertex.
pub type JointId = u32;

pub const INVALID_JOINT: JointId = JointId::MAX;

/// Per-feature access restriction from the road-access section.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RoadAccess {
    #[default]
    Yes,
    Private,
    Destination,
    No,
}

impl RoadAccess {
    pub fn is_passable(&self) -> bool {
        !matches!(self, RoadAccess::No)
    }
}

/// Transit metadata of one feature from the transit section.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TransitInfo {
    /// Identifier of the transit line serving the feature.
    pub line: u32,
    /// Scheduled headway along the line, in seconds.
    pub headway_s: u32,
}

type NeighborList = SmallVec<[Segment; 8]>;

/// Joint ids per point of one road, `INVALID_JOINT` where a point is not
/// an intersection.
#[derive(Clone, Debug, Default)]
pub struct RoadJointIds {
    ids: Vec<JointId>,
}

impl RoadJointIds {
    pub fn joint_id(&self, point: u32) -> JointId {
        self.ids
            .get(point as usize)
            .copied()
            .unwrap_or(INVALID_JOINT)
    }

    pub fn set_joint(&mut self, point: u32, joint: JointId) {
        let idx = point as usize;
        if self.ids.len() <= idx {
            self.ids.resize(idx + 1, INVALID_JOINT);
        }
        self.ids[idx] = joint;
    }

    pub fn joints(&self) -> impl Iterator<Item = (u32, JointId)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .filter(|(_, &j)| j != INVALID_JOINT)
            .map(|(i, &j)| (i as u32, j))
    }
}

/// Per-shard road network: joint adjacency over the shard's features,
/// turn restrictions, road access and speed-camera positions.
///
/// Owned by the shard arena; destroyed when the shard is evicted.
pub struct IndexGraph {
    shard: ShardId,
    geometry: Geometry,
    road_index: FxHashMap<FeatureId, RoadJointIds>,
    joint_index: Vec<SmallVec<[RoadPoint; 4]>>,
    restrictions: FxHashSet<(FeatureId, FeatureId)>,
    access: FxHashMap<FeatureId, RoadAccess>,
    cameras: FxHashMap<RoadPoint, u8>,
    transit: FxHashMap<FeatureId, TransitInfo>,
}

impl IndexGraph {
    pub fn new(shard: ShardId, geometry: Geometry) -> Self {
        IndexGraph {
            shard,
            geometry,
            road_index: FxHashMap::default(),
            joint_index: Vec::new(),
            restrictions: FxHashSet::default(),
            access: FxHashMap::default(),
            cameras: FxHashMap::default(),
            transit: FxHashMap::default(),
        }
    }

    /// Direct joint import: each entry lists the road points fused into
    /// one intersection. Used by tests and by the graph builder.
    pub fn import_joints(&mut self, joints: Vec<Vec<RoadPoint>>) {
        for (id, points) in joints.into_iter().enumerate() {
            for rp in &points {
                self.road_index
                    .entry(rp.feature)
                    .or_default()
                    .set_joint(rp.point, id as JointId);
            }
            self.joint_index.push(points.into_iter().collect());
        }
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }

    pub fn geometry(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    pub fn roads_count(&self) -> usize {
        self.road_index.len()
    }

    pub fn joints_count(&self) -> usize {
        self.joint_index.len()
    }

    pub fn joint_id(&self, rp: RoadPoint) -> Option<JointId> {
        self.road_index.get(&rp.feature).and_then(|road| {
            let id = road.joint_id(rp.point);
            (id != INVALID_JOINT).then_some(id)
        })
    }

    pub fn joint_points(&self, joint: JointId) -> &[RoadPoint] {
        &self.joint_index[joint as usize]
    }

    pub fn road_joints(&self, feature: FeatureId) -> Option<&RoadJointIds> {
        self.road_index.get(&feature)
    }

    /// The (feature, point) → joint mapping for every indexed road point.
    pub fn joint_mapping(&self) -> Vec<(RoadPoint, JointId)> {
        let mut mapping: Vec<_> = self
            .road_index
            .iter()
            .flat_map(|(&feature, road)| {
                road.joints()
                    .map(move |(point, joint)| (RoadPoint::new(feature, point), joint))
            })
            .collect();
        mapping.sort_unstable();
        mapping
    }

    pub fn set_restrictions(&mut self, forbidden: impl IntoIterator<Item = (FeatureId, FeatureId)>) {
        self.restrictions = forbidden.into_iter().collect();
    }

    pub fn set_access(&mut self, access: impl IntoIterator<Item = (FeatureId, RoadAccess)>) {
        self.access = access.into_iter().collect();
    }

    pub fn set_cameras(&mut self, cameras: impl IntoIterator<Item = (RoadPoint, u8)>) {
        self.cameras = cameras.into_iter().collect();
    }

    pub fn camera_at(&self, rp: RoadPoint) -> Option<u8> {
        self.cameras.get(&rp).copied()
    }

    pub fn set_transit(&mut self, transit: impl IntoIterator<Item = (FeatureId, TransitInfo)>) {
        self.transit = transit.into_iter().collect();
    }

    pub fn transit_at(&self, feature: FeatureId) -> Option<TransitInfo> {
        self.transit.get(&feature).copied()
    }

    pub fn access(&self, feature: FeatureId) -> RoadAccess {
        self.access.get(&feature).copied().unwrap_or_default()
    }

    fn is_restricted(&self, from: FeatureId, to: FeatureId) -> bool {
        from != to && self.restrictions.contains(&(from, to))
    }

    /// Whether travelling a feature against its point order is allowed.
    fn direction_allowed(&mut self, feature: FeatureId, forward: bool) -> bool {
        match self.geometry.road(feature) {
            Some(road) => road.is_passable() && (forward || !road.is_one_way()),
            None => false,
        }
    }

    /// Segments adjacent to `segment` within this shard.
    ///
    /// With `outgoing` the expansion happens at the segment's front point,
    /// otherwise at its back point. Interior points (no joint) continue
    /// along the same feature; joints fan out over every fused road.
    pub fn neighbors(&mut self, segment: Segment, outgoing: bool) -> NeighborList {
        let mut out = NeighborList::new();
        let rp = segment.road_point(outgoing);

        match self.joint_id(rp) {
            Some(joint) => {
                // The joint index borrows &self while geometry loading
                // needs &mut; collect the fused points first.
                let points: SmallVec<[RoadPoint; 4]> =
                    SmallVec::from_slice(self.joint_points(joint));
                for other in points {
                    self.push_point_segments(segment, other, outgoing, &mut out);
                }
            }
            None => self.push_point_segments(segment, rp, outgoing, &mut out),
        }

        out
    }

    /// All segments of `rp`'s feature that leave (or arrive at) the point
    /// in the requested direction.
    fn push_point_segments(
        &mut self,
        from: Segment,
        rp: RoadPoint,
        outgoing: bool,
        out: &mut NeighborList,
    ) {
        let Some(road) = self.geometry.road(rp.feature) else {
            return;
        };
        if !road.is_passable() || !self.access(rp.feature).is_passable() {
            return;
        }
        let segments = road.segments_count();
        drop(road);

        // Candidate pairs: (segment idx, direction). For an outgoing
        // expansion the candidate's back point must equal |rp|; for an
        // ingoing one its front point must.
        let candidates = if outgoing {
            [(rp.point, true), (rp.point.wrapping_sub(1), false)]
        } else {
            [(rp.point.wrapping_sub(1), true), (rp.point, false)]
        };

        for (idx, forward) in candidates {
            if idx >= segments {
                continue;
            }
            if !self.direction_allowed(rp.feature, forward) {
                continue;
            }

            let to = Segment::new(self.shard, rp.feature, idx, forward);
            if to == from || to == from.reversed() {
                continue;
            }

            let (a, b) = if outgoing {
                (from.feature(), to.feature())
            } else {
                (to.feature(), from.feature())
            };
            if self.is_restricted(a, b) {
                continue;
            }

            out.push(to);
        }
    }

    /// True when the point is shared by several roads or terminates its
    /// own road; these are the vertices of the joint-compressed view.
    pub fn is_joint_or_end(&mut self, rp: RoadPoint) -> bool {
        if self.joint_id(rp).is_some() {
            return true;
        }
        match self.geometry.road(rp.feature) {
            Some(road) => rp.point == 0 || rp.point + 1 == road.points_count(),
            None => true,
        }
    }
}
