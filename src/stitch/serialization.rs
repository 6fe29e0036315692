use itertools::Itertools;

use crate::codec::{BitReader, BitWriter, CodecError};
use crate::graph::{Segment, ShardId};
use crate::search::RouteWeight;
use crate::stitch::{Connector, Transition};

/// Writes a shard's border transitions and, when available, its
/// enter-by-exit weight matrix. Weights are rounded to whole seconds.
pub fn write_connector(connector: &Connector) -> Vec<u8> {
    let mut bits = BitWriter::new();

    let transitions: Vec<&Transition> = connector
        .transitions()
        .iter()
        .sorted_unstable_by_key(|t| (t.segment.feature(), t.segment.idx()))
        .collect();

    bits.write_gamma(transitions.len() as u32 + 1);
    let mut prev_feature = 0;
    for t in &transitions {
        bits.write_gamma(t.segment.feature() - prev_feature + 1);
        prev_feature = t.segment.feature();
        bits.write_gamma(t.segment.idx() + 1);
        bits.write_bit(t.enter);
        bits.write_bit(t.exit);

        bits.write_gamma(t.twins.len() as u32 + 1);
        for twin in &t.twins {
            bits.write_bits(twin.shard() as u32, 16);
            bits.write_gamma(twin.feature() + 1);
            bits.write_gamma(twin.idx() + 1);
            bits.write_bit(twin.is_forward());
        }
    }

    bits.write_bit(connector.has_weights());
    if connector.has_weights() {
        // Matrix order must match the transition order the reader
        // rebuilds, which is the sorted one.
        let enters: Vec<Segment> = transitions
            .iter()
            .filter(|t| t.enter)
            .map(|t| t.segment)
            .collect();
        let exits: Vec<Segment> = transitions
            .iter()
            .filter(|t| t.exit)
            .map(|t| t.segment)
            .collect();
        for &enter in &enters {
            for &exit in &exits {
                match connector.enter_to_exit(enter, exit) {
                    None => bits.write_gamma(1),
                    Some(weight) => {
                        bits.write_gamma(weight.seconds().round().max(0.0) as u32 + 2)
                    }
                }
            }
        }
    }

    bits.into_bytes()
}

pub fn read_connector(shard: ShardId, data: &[u8]) -> Result<Connector, CodecError> {
    let mut bits = BitReader::new(data);

    let count = bits.read_gamma()? - 1;
    let mut transitions = Vec::with_capacity(count as usize);
    let mut prev_feature = 0;
    for _ in 0..count {
        let feature = prev_feature + bits.read_gamma()? - 1;
        prev_feature = feature;
        let idx = bits.read_gamma()? - 1;
        let enter = bits.read_bit()?;
        let exit = bits.read_bit()?;

        let twin_count = bits.read_gamma()? - 1;
        let mut twins = Vec::with_capacity(twin_count as usize);
        for _ in 0..twin_count {
            let twin_shard = bits.read_bits(16)? as ShardId;
            let twin_feature = bits.read_gamma()? - 1;
            let twin_idx = bits.read_gamma()? - 1;
            let forward = bits.read_bit()?;
            twins.push(Segment::new(twin_shard, twin_feature, twin_idx, forward));
        }

        transitions.push(Transition {
            segment: Segment::new(shard, feature, idx, true),
            twins,
            enter,
            exit,
        });
    }

    let mut connector = Connector::new(shard, transitions);

    if bits.read_bit()? {
        let rows = connector.enters().count();
        let cols = connector.exits().count();
        let mut weights = Vec::with_capacity(rows * cols);
        for _ in 0..rows * cols {
            weights.push(match bits.read_gamma()? {
                1 => None,
                encoded => Some(RouteWeight::from_seconds((encoded - 2) as f64)),
            });
        }
        connector.set_weights(weights);
    }

    Ok(connector)
}
