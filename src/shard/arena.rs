use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::codec::{
    read_cameras, read_restrictions, read_road_access, read_transit, DeserializedGraph,
};
use crate::graph::{FeatureId, Geometry, GeometryProvider, IndexGraph, RoadData, ShardId};
use crate::model::VehicleModel;
use crate::shard::{Section, ShardError, ShardSource};
use crate::snap::SnapIndex;

/// One materialised shard: its decoded routing graph behind interior
/// mutability so several leases can expand it in turn.
pub struct ShardSlot {
    shard: ShardId,
    name: String,
    graph: RefCell<IndexGraph>,
    snap: RefCell<Option<Rc<SnapIndex>>>,
}

impl ShardSlot {
    pub fn shard(&self) -> ShardId {
        self.shard
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> RefMut<'_, IndexGraph> {
        self.graph.borrow_mut()
    }

    /// The shard's spatial snap index, built on first use and shared by
    /// every later snap against this slot.
    pub fn snap_index(&self) -> Rc<SnapIndex> {
        let mut cached = self.snap.borrow_mut();
        if let Some(index) = cached.as_ref() {
            return Rc::clone(index);
        }
        let index = Rc::new(SnapIndex::build(&mut self.graph.borrow_mut()));
        *cached = Some(Rc::clone(&index));
        index
    }
}

/// A reference-counted lease on a materialised shard. The arena never
/// evicts a slot while a lease on it is live.
pub type ShardLease = Rc<ShardSlot>;

/// Delegates raw geometry lookups of a slot to the engine's source.
struct SourceGeometry(Rc<dyn ShardSource>);

impl GeometryProvider for SourceGeometry {
    fn road(&self, shard: ShardId, feature: FeatureId) -> Option<RoadData> {
        self.0.road(shard, feature)
    }

    fn features(&self, shard: ShardId) -> Vec<FeatureId> {
        self.0.features(shard)
    }
}

/// Owner of every materialised shard. Shards are decoded on first lease
/// and kept until `clear` finds them unleased.
pub struct ShardArena {
    source: Rc<dyn ShardSource>,
    model: VehicleModel,
    slots: FxHashMap<ShardId, ShardLease>,
}

impl ShardArena {
    pub fn new(model: VehicleModel, source: Rc<dyn ShardSource>) -> Self {
        ShardArena {
            source,
            model,
            slots: FxHashMap::default(),
        }
    }

    pub fn source(&self) -> &Rc<dyn ShardSource> {
        &self.source
    }

    pub fn model(&self) -> &VehicleModel {
        &self.model
    }

    pub fn loaded(&self) -> usize {
        self.slots.len()
    }

    /// A lease on the shard, decoding its sections on first use.
    pub fn lease(&mut self, shard: ShardId) -> Result<ShardLease, ShardError> {
        if let Some(slot) = self.slots.get(&shard) {
            return Ok(Rc::clone(slot));
        }

        if !self.source.contains(shard) {
            return Err(ShardError::MissingShard(shard));
        }
        let slot = Rc::new(self.load(shard)?);
        self.slots.insert(shard, Rc::clone(&slot));
        Ok(slot)
    }

    fn load(&self, shard: ShardId) -> Result<ShardSlot, ShardError> {
        let name = self.source.shard_name(shard);
        debug!("materialising shard {shard} ({name})");

        let routing = self
            .source
            .read_section(shard, Section::Routing)
            .ok_or(ShardError::MissingSection(shard, Section::Routing))?;
        let decoded = DeserializedGraph::read(&routing, self.model.vehicle().mask())
            .map_err(|err| ShardError::Corrupt(shard, err))?;
        trace!(
            "shard {shard}: {} roads, {} joints",
            decoded.roads.len(),
            decoded.joints_count
        );

        let provider = Rc::new(SourceGeometry(Rc::clone(&self.source)));
        let geometry = Geometry::new(shard, self.model, provider);
        let mut graph = IndexGraph::new(shard, geometry);
        graph.import_joints(decoded.joints());

        if let Some(data) = self.source.read_section(shard, Section::RoadAccess) {
            let access = read_road_access(&data).map_err(|err| ShardError::Corrupt(shard, err))?;
            graph.set_access(access);
        }
        if let Some(data) = self.source.read_section(shard, Section::Restrictions) {
            let pairs = read_restrictions(&data).map_err(|err| ShardError::Corrupt(shard, err))?;
            graph.set_restrictions(pairs);
        }
        if let Some(data) = self.source.read_section(shard, Section::Cameras) {
            let cameras = read_cameras(&data).map_err(|err| ShardError::Corrupt(shard, err))?;
            graph.set_cameras(cameras);
        }
        if let Some(data) = self.source.read_section(shard, Section::Transit) {
            let transit = read_transit(&data).map_err(|err| ShardError::Corrupt(shard, err))?;
            graph.set_transit(transit);
        }

        Ok(ShardSlot {
            shard,
            name,
            graph: RefCell::new(graph),
            snap: RefCell::new(None),
        })
    }

    /// Evicts every slot that no outside lease still holds.
    pub fn clear(&mut self) {
        let before = self.slots.len();
        self.slots.retain(|_, slot| Rc::strong_count(slot) > 1);
        if self.slots.len() < before {
            debug!("evicted {} shards", before - self.slots.len());
        }
    }
}
