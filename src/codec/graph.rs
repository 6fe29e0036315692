use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::codec::{BitReader, BitWriter, CodecError};
use crate::graph::{FeatureId, JointId, RoadPoint};
use crate::model::VehicleType;

/// Current layout version. Bumped whenever the section layout changes;
/// readers refuse anything newer.
pub const VERSION: u8 = 1;

/// One road prepared for serialization: its vehicle mask and the points
/// that participate in a joint, ascending by point index.
#[derive(Clone, Debug)]
pub struct ExportRoad {
    pub feature: FeatureId,
    pub mask: u8,
    pub joints: Vec<(u32, JointId)>,
}

/// Writes the routing section: roads grouped into per-mask blocks, each
/// skippable by its stored byte length.
///
/// Joint ids are re-issued in first-appearance order so that a repeat
/// reference is always a small backwards delta. Blocks whose mask
/// includes cars come first, letting a car-only reader stop early.
pub struct GraphSerializer;

impl GraphSerializer {
    pub fn serialize(roads: Vec<ExportRoad>) -> Vec<u8> {
        let mut sections: Vec<(u8, Vec<ExportRoad>)> = roads
            .into_iter()
            .sorted_by_key(|road| (road.mask, road.feature))
            .chunk_by(|road| road.mask)
            .into_iter()
            .map(|(mask, group)| (mask, group.collect()))
            .collect();

        let car = VehicleType::Car.mask();
        sections.sort_by_key(|&(mask, _)| (mask & car == 0, mask));

        let joints_total = sections
            .iter()
            .flat_map(|(_, roads)| roads.iter())
            .flat_map(|road| road.joints.iter().map(|&(_, joint)| joint))
            .unique()
            .count() as u32;

        let mut out = Vec::new();
        out.push(VERSION);
        let roads_total: u32 = sections.iter().map(|(_, roads)| roads.len() as u32).sum();
        out.extend_from_slice(&roads_total.to_le_bytes());
        out.extend_from_slice(&joints_total.to_le_bytes());
        out.extend_from_slice(&(sections.len() as u16).to_le_bytes());

        // Emitted-id remap shared across sections, in write order.
        let mut emitted: FxHashMap<JointId, u32> = FxHashMap::default();

        for (mask, roads) in sections {
            let introduced_before = emitted.len() as u32;
            let mut bits = BitWriter::new();
            bits.write_gamma(roads.len() as u32);

            let mut prev_feature = 0u32;
            for road in &roads {
                bits.write_gamma(road.feature - prev_feature + 1);
                prev_feature = road.feature;

                // Two joints per road is the common case; swap the two
                // shortest codes.
                let count = road.joints.len() as u32;
                bits.write_gamma(match count {
                    1 => 2,
                    2 => 1,
                    n => n,
                });

                let mut prev_point = 0u32;
                for &(point, joint) in &road.joints {
                    bits.write_gamma(point - prev_point + 1);
                    prev_point = point + 1;

                    match emitted.get(&joint) {
                        None => {
                            let id = emitted.len() as u32;
                            emitted.insert(joint, id);
                            bits.write_bit(true);
                        }
                        Some(&id) => {
                            bits.write_bit(false);
                            bits.write_gamma(emitted.len() as u32 - id);
                        }
                    }
                }
            }

            let payload = bits.into_bytes();
            out.push(mask);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            let introduced = emitted.len() as u32 - introduced_before;
            out.extend_from_slice(&introduced.to_le_bytes());
            out.extend_from_slice(&payload);
        }

        out
    }
}

/// The routing section narrowed to one vehicle mask.
#[derive(Clone, Debug, PartialEq)]
pub struct DeserializedGraph {
    /// Retained roads with their surviving joint entries, ascending by
    /// point.
    pub roads: Vec<(FeatureId, Vec<(u32, JointId)>)>,
    pub joints_count: u32,
}

impl DeserializedGraph {
    /// Reads every section whose mask intersects `mask`, skipping the
    /// rest by their byte length while still advancing the joint id
    /// counter.
    pub fn read(data: &[u8], mask: u8) -> Result<Self, CodecError> {
        let mut pos = 0usize;
        let version = read_u8(data, &mut pos)?;
        if version > VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: version,
                supported: VERSION,
            });
        }
        let _roads_total = read_u32(data, &mut pos)?;
        let joints_total = read_u32(data, &mut pos)?;
        let sections = read_u16(data, &mut pos)?;

        let mut counter = 0u32;
        let mut roads: Vec<(FeatureId, Vec<(u32, JointId)>)> = Vec::new();

        for _ in 0..sections {
            let section_mask = read_u8(data, &mut pos)?;
            let byte_len = read_u32(data, &mut pos)? as usize;
            let introduced = read_u32(data, &mut pos)?;
            let payload = data
                .get(pos..pos + byte_len)
                .ok_or(CodecError::UnexpectedEof { at_byte: data.len() })?;
            pos += byte_len;

            if section_mask & mask == 0 {
                counter += introduced;
                continue;
            }

            let mut bits = BitReader::new(payload);
            let section_roads = bits.read_gamma()?;

            let mut prev_feature = 0u32;
            for _ in 0..section_roads {
                let feature = prev_feature + bits.read_gamma()? - 1;
                prev_feature = feature;

                let count = match bits.read_gamma()? {
                    1 => 2,
                    2 => 1,
                    n => n,
                };

                let mut joints = Vec::with_capacity(count as usize);
                let mut prev_point = 0u32;
                for _ in 0..count {
                    let point = prev_point + bits.read_gamma()? - 1;
                    prev_point = point + 1;

                    let joint = if bits.read_bit()? {
                        let id = counter;
                        counter += 1;
                        id
                    } else {
                        let delta = bits.read_gamma()?;
                        if delta > counter {
                            return Err(CodecError::BadJointDelta {
                                delta,
                                emitted: counter,
                            });
                        }
                        counter - delta
                    };
                    if joint >= joints_total {
                        return Err(CodecError::JointOutOfRange {
                            value: joint,
                            bound: joints_total,
                        });
                    }
                    joints.push((point, joint));
                }
                roads.push((feature, joints));
            }

            if bits.byte_pos() != byte_len {
                return Err(CodecError::SectionEndMismatch {
                    expected: byte_len,
                    actual: bits.byte_pos(),
                });
            }
        }

        Ok(Self::renumber(roads))
    }

    /// Drops joints with a single surviving reference and renumbers the
    /// rest densely; a joint touching one road point is not an
    /// intersection in the narrowed graph.
    fn renumber(roads: Vec<(FeatureId, Vec<(u32, JointId)>)>) -> Self {
        let mut references: FxHashMap<JointId, u32> = FxHashMap::default();
        for (_, joints) in &roads {
            for &(_, joint) in joints {
                *references.entry(joint).or_default() += 1;
            }
        }

        let remap: FxHashMap<JointId, JointId> = references
            .iter()
            .filter(|&(_, &uses)| uses >= 2)
            .map(|(&joint, _)| joint)
            .sorted_unstable()
            .enumerate()
            .map(|(dense, joint)| (joint, dense as JointId))
            .collect();

        let roads = roads
            .into_iter()
            .map(|(feature, joints)| {
                let joints = joints
                    .into_iter()
                    .filter_map(|(point, joint)| {
                        remap.get(&joint).map(|&dense| (point, dense))
                    })
                    .collect();
                (feature, joints)
            })
            .collect();

        DeserializedGraph {
            roads,
            joints_count: remap.len() as u32,
        }
    }

    /// Joint membership lists in dense id order, ready for
    /// `IndexGraph::import_joints`.
    pub fn joints(&self) -> Vec<Vec<RoadPoint>> {
        let mut out = vec![Vec::new(); self.joints_count as usize];
        for (feature, joints) in &self.roads {
            for &(point, joint) in joints {
                out[joint as usize].push(RoadPoint::new(*feature, point));
            }
        }
        out
    }
}

fn read_u8(data: &[u8], pos: &mut usize) -> Result<u8, CodecError> {
    let b = *data
        .get(*pos)
        .ok_or(CodecError::UnexpectedEof { at_byte: *pos })?;
    *pos += 1;
    Ok(b)
}

fn read_u16(data: &[u8], pos: &mut usize) -> Result<u16, CodecError> {
    let bytes = data
        .get(*pos..*pos + 2)
        .ok_or(CodecError::UnexpectedEof { at_byte: *pos })?;
    *pos += 2;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32, CodecError> {
    let bytes = data
        .get(*pos..*pos + 4)
        .ok_or(CodecError::UnexpectedEof { at_byte: *pos })?;
    *pos += 4;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
