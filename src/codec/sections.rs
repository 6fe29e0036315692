//! Auxiliary per-shard sections sharing the bit codec of the routing
//! section: road access, turn restrictions and speed cameras.

use itertools::Itertools;

use crate::codec::{BitReader, BitWriter, CodecError};
use crate::graph::{FeatureId, RoadAccess, RoadPoint, TransitInfo};

fn access_tag(access: RoadAccess) -> u32 {
    match access {
        RoadAccess::Yes => 0,
        RoadAccess::Private => 1,
        RoadAccess::Destination => 2,
        RoadAccess::No => 3,
    }
}

fn access_from_tag(tag: u32) -> RoadAccess {
    match tag {
        1 => RoadAccess::Private,
        2 => RoadAccess::Destination,
        3 => RoadAccess::No,
        _ => RoadAccess::Yes,
    }
}

/// Only non-default entries are stored; an absent feature reads as
/// `RoadAccess::Yes`.
pub fn write_road_access(entries: &[(FeatureId, RoadAccess)]) -> Vec<u8> {
    let mut bits = BitWriter::new();
    let entries: Vec<_> = entries
        .iter()
        .filter(|(_, access)| *access != RoadAccess::Yes)
        .sorted_unstable_by_key(|(feature, _)| *feature)
        .collect();

    bits.write_gamma(entries.len() as u32 + 1);
    let mut prev = 0u32;
    for &(feature, access) in entries {
        bits.write_gamma(feature - prev + 1);
        prev = feature;
        bits.write_bits(access_tag(access), 2);
    }
    bits.into_bytes()
}

pub fn read_road_access(data: &[u8]) -> Result<Vec<(FeatureId, RoadAccess)>, CodecError> {
    let mut bits = BitReader::new(data);
    let count = bits.read_gamma()? - 1;

    let mut out = Vec::with_capacity(count as usize);
    let mut prev = 0u32;
    for _ in 0..count {
        let feature = prev + bits.read_gamma()? - 1;
        prev = feature;
        let access = access_from_tag(bits.read_bits(2)?);
        out.push((feature, access));
    }
    Ok(out)
}

/// Forbidden (from, to) feature transitions, sorted by source feature.
pub fn write_restrictions(pairs: &[(FeatureId, FeatureId)]) -> Vec<u8> {
    let mut bits = BitWriter::new();
    let pairs: Vec<_> = pairs.iter().sorted_unstable().collect();

    bits.write_gamma(pairs.len() as u32 + 1);
    let mut prev = 0u32;
    for &&(from, to) in &pairs {
        bits.write_gamma(from - prev + 1);
        prev = from;
        bits.write_gamma(to + 1);
    }
    bits.into_bytes()
}

pub fn read_restrictions(data: &[u8]) -> Result<Vec<(FeatureId, FeatureId)>, CodecError> {
    let mut bits = BitReader::new(data);
    let count = bits.read_gamma()? - 1;

    let mut out = Vec::with_capacity(count as usize);
    let mut prev = 0u32;
    for _ in 0..count {
        let from = prev + bits.read_gamma()? - 1;
        prev = from;
        let to = bits.read_gamma()? - 1;
        out.push((from, to));
    }
    Ok(out)
}

/// Camera positions with their enforced limit in km/h; zero means an
/// unknown limit.
pub fn write_cameras(cameras: &[(RoadPoint, u8)]) -> Vec<u8> {
    let mut bits = BitWriter::new();
    let cameras: Vec<_> = cameras.iter().sorted_unstable_by_key(|(rp, _)| *rp).collect();

    bits.write_gamma(cameras.len() as u32 + 1);
    let mut prev = 0u32;
    for &&(rp, limit) in &cameras {
        bits.write_gamma(rp.feature - prev + 1);
        prev = rp.feature;
        bits.write_gamma(rp.point + 1);
        bits.write_bits(limit as u32, 8);
    }
    bits.into_bytes()
}

pub fn read_cameras(data: &[u8]) -> Result<Vec<(RoadPoint, u8)>, CodecError> {
    let mut bits = BitReader::new(data);
    let count = bits.read_gamma()? - 1;

    let mut out = Vec::with_capacity(count as usize);
    let mut prev = 0u32;
    for _ in 0..count {
        let feature = prev + bits.read_gamma()? - 1;
        prev = feature;
        let point = bits.read_gamma()? - 1;
        let limit = bits.read_bits(8)? as u8;
        out.push((RoadPoint::new(feature, point), limit));
    }
    Ok(out)
}

/// Transit metadata per feature: the serving line and its headway,
/// sorted by feature.
pub fn write_transit(entries: &[(FeatureId, TransitInfo)]) -> Vec<u8> {
    let mut bits = BitWriter::new();
    let entries: Vec<_> = entries.iter().sorted_unstable_by_key(|(feature, _)| *feature).collect();

    bits.write_gamma(entries.len() as u32 + 1);
    let mut prev = 0u32;
    for &&(feature, info) in &entries {
        bits.write_gamma(feature - prev + 1);
        prev = feature;
        bits.write_gamma(info.line + 1);
        bits.write_gamma(info.headway_s + 1);
    }
    bits.into_bytes()
}

pub fn read_transit(data: &[u8]) -> Result<Vec<(FeatureId, TransitInfo)>, CodecError> {
    let mut bits = BitReader::new(data);
    let count = bits.read_gamma()? - 1;

    let mut out = Vec::with_capacity(count as usize);
    let mut prev = 0u32;
    for _ in 0..count {
        let feature = prev + bits.read_gamma()? - 1;
        prev = feature;
        let line = bits.read_gamma()? - 1;
        let headway_s = bits.read_gamma()? - 1;
        out.push((feature, TransitInfo { line, headway_s }));
    }
    Ok(out)
}
