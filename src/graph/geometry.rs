use std::rc::Rc;

use geo::{Distance, Haversine, Point};
use rustc_hash::FxHashMap;

use crate::graph::{FeatureId, ShardId};
use crate::model::{RoadClass, SpeedKmh, VehicleModel};

/// Raw per-feature data as delivered by the external geometry provider.
#[derive(Clone, Debug)]
pub struct RoadData {
    pub points: Vec<Point<f64>>,
    pub class: RoadClass,
    pub one_way: bool,
    pub maxspeed_kmh: Option<f64>,
}

/// Point sequences and per-feature metadata, resolved by shard + feature
/// id.
pub trait GeometryProvider {
    fn road(&self, shard: ShardId, feature: FeatureId) -> Option<RoadData>;

    /// Every feature of a shard; used to build snapping indices.
    fn features(&self, shard: ShardId) -> Vec<FeatureId>;
}

/// One feature's geometry shaped by the engine's vehicle model.
#[derive(Clone, Debug)]
pub struct RoadGeometry {
    points: Vec<Point<f64>>,
    class: RoadClass,
    one_way: bool,
    passable: bool,
    pass_through_allowed: bool,
    speed: SpeedKmh,
}

impl RoadGeometry {
    pub fn new(data: RoadData, model: &VehicleModel) -> Self {
        let speed = model.speed(data.class, data.maxspeed_kmh);
        RoadGeometry {
            one_way: data.one_way && model.obeys_one_way(),
            passable: speed.is_some() && data.points.len() >= 2,
            pass_through_allowed: model.is_pass_through_allowed(data.class),
            speed: speed.unwrap_or(SpeedKmh::uniform(1.0)),
            class: data.class,
            points: data.points,
        }
    }

    #[inline]
    pub fn point(&self, idx: u32) -> Point<f64> {
        self.points[idx as usize]
    }

    #[inline]
    pub fn points_count(&self) -> u32 {
        self.points.len() as u32
    }

    /// Number of segments, one less than points.
    #[inline]
    pub fn segments_count(&self) -> u32 {
        self.points_count().saturating_sub(1)
    }

    #[inline]
    pub fn is_one_way(&self) -> bool {
        self.one_way
    }

    #[inline]
    pub fn is_passable(&self) -> bool {
        self.passable
    }

    #[inline]
    pub fn is_pass_through_allowed(&self) -> bool {
        self.pass_through_allowed
    }

    #[inline]
    pub fn speed(&self) -> SpeedKmh {
        self.speed
    }

    #[inline]
    pub fn class(&self) -> RoadClass {
        self.class
    }

    /// Length in meters of the segment starting at point `idx`.
    pub fn segment_len(&self, idx: u32) -> f64 {
        Haversine.distance(self.point(idx), self.point(idx + 1))
    }
}

/// Lazily built per-shard geometry cache. Invalidated wholesale when the
/// owning shard is evicted.
pub struct Geometry {
    shard: ShardId,
    model: VehicleModel,
    provider: Rc<dyn GeometryProvider>,
    cache: FxHashMap<FeatureId, Rc<RoadGeometry>>,
}

impl Geometry {
    pub fn new(shard: ShardId, model: VehicleModel, provider: Rc<dyn GeometryProvider>) -> Self {
        Geometry {
            shard,
            model,
            provider,
            cache: FxHashMap::default(),
        }
    }

    pub fn shard(&self) -> ShardId {
        self.shard
    }

    /// The shaped geometry of a feature, building and caching it on
    /// first use.
    pub fn road(&mut self, feature: FeatureId) -> Option<Rc<RoadGeometry>> {
        if let Some(road) = self.cache.get(&feature) {
            return Some(Rc::clone(road));
        }

        let data = self.provider.road(self.shard, feature)?;
        let road = Rc::new(RoadGeometry::new(data, &self.model));
        self.cache.insert(feature, Rc::clone(&road));
        Some(road)
    }

    /// Every feature id of this shard, straight from the provider.
    pub fn features(&self) -> Vec<FeatureId> {
        self.provider.features(self.shard)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
