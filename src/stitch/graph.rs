use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;

use crate::graph::{Segment, ShardId};
use crate::search::{Edge, RouteWeight};
use crate::shard::{Section, ShardSource};
use crate::stitch::{read_connector, Connector, StitchError};

/// Lazily loaded connectors over every shard the search touches.
///
/// Connectors with their weight matrices dominate the memory of a long
/// leap search; `purge` drops them all before dense resolution begins.
pub struct CrossShardGraph {
    connectors: FxHashMap<ShardId, Rc<Connector>>,
}

impl Default for CrossShardGraph {
    fn default() -> Self {
        CrossShardGraph::new()
    }
}

impl CrossShardGraph {
    pub fn new() -> Self {
        CrossShardGraph {
            connectors: FxHashMap::default(),
        }
    }

    pub fn connector(
        &mut self,
        source: &dyn ShardSource,
        shard: ShardId,
    ) -> Result<Rc<Connector>, StitchError> {
        if let Some(connector) = self.connectors.get(&shard) {
            return Ok(Rc::clone(connector));
        }

        let data = source
            .read_section(shard, Section::CrossShard)
            .ok_or(StitchError::NoSection(shard))?;
        let connector = read_connector(shard, &data)
            .map_err(|err| StitchError::Corrupt(shard, err))?;
        debug!(
            "loaded connector for shard {shard}: {} transitions",
            connector.transitions().len()
        );

        let connector = Rc::new(connector);
        self.connectors.insert(shard, Rc::clone(&connector));
        Ok(connector)
    }

    /// Whether travelling `outgoing` over this segment crosses a border.
    /// Unknown shards or missing sections read as "not a transition".
    pub fn is_transition(
        &mut self,
        source: &dyn ShardSource,
        segment: Segment,
        outgoing: bool,
    ) -> bool {
        self.connector(source, segment.shard())
            .map(|c| c.is_transition(segment, outgoing))
            .unwrap_or(false)
    }

    pub fn twins(&mut self, source: &dyn ShardSource, segment: Segment) -> Vec<Segment> {
        self.connector(source, segment.shard())
            .map(|c| c.twins(segment).to_vec())
            .unwrap_or_default()
    }

    /// Leap edges of an enter transition: every reachable exit of the
    /// same shard with its precomputed weight.
    pub fn leap_edges(
        &mut self,
        source: &dyn ShardSource,
        enter: Segment,
    ) -> Result<Vec<Edge<Segment>>, StitchError> {
        let connector = self.connector(source, enter.shard())?;
        let mut out = Vec::new();
        for exit in connector.exits() {
            if exit.segment == enter {
                continue;
            }
            if let Some(weight) = connector.enter_to_exit(enter, exit.segment) {
                out.push(Edge::new(exit.segment, weight));
            }
        }
        Ok(out)
    }

    /// In-shard weight between two transitions, if the matrix knows one.
    pub fn enter_to_exit(
        &mut self,
        source: &dyn ShardSource,
        enter: Segment,
        exit: Segment,
    ) -> Option<RouteWeight> {
        self.connector(source, enter.shard())
            .ok()
            .and_then(|c| c.enter_to_exit(enter, exit))
    }

    pub fn loaded(&self) -> usize {
        self.connectors.len()
    }

    /// Drops every cached connector.
    pub fn purge(&mut self) {
        if !self.connectors.is_empty() {
            debug!("purging {} connectors", self.connectors.len());
            self.connectors.clear();
        }
    }
}
