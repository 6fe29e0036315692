use geo::{Distance, Haversine, Point};
use smallvec::SmallVec;

use crate::graph::{Segment, ShardId};
use crate::snap::Projection;

/// Shard id reserved for guide-track segments.
pub const GUIDE_SHARD_ID: ShardId = ShardId::MAX - 1;

/// Largest gap bridged between a guide track vertex and a checkpoint or
/// the road network.
pub const GUIDE_ATTACH_M: f64 = 200.0;

/// Externally pinned tracks routed like road segments: their segments
/// snap, expand and redress through the world facade, with transfers to
/// the road network at track vertices.
///
/// A guide segment carries the guide shard id, the track index as its
/// feature, and the vertex index; a forward segment travels from vertex
/// `v` to `v + 1`.
#[derive(Default)]
pub struct GuideTracks {
    tracks: Vec<Vec<Point<f64>>>,
}

impl GuideTracks {
    pub fn new() -> Self {
        GuideTracks::default()
    }

    pub fn set(&mut self, tracks: Vec<Vec<Point<f64>>>) {
        self.tracks = tracks
            .into_iter()
            .filter(|track| track.len() >= 2)
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, segment: Segment) -> bool {
        segment.shard() == GUIDE_SHARD_ID
    }

    fn track(&self, segment: Segment) -> Option<&[Point<f64>]> {
        self.tracks
            .get(segment.feature() as usize)
            .map(|track| track.as_slice())
    }

    /// Endpoint of a guide segment in its direction of travel.
    pub fn point(&self, segment: Segment, front: bool) -> Option<Point<f64>> {
        let points = self.track(segment)?;
        let idx = segment.idx() as usize;
        if idx + 1 >= points.len() {
            return None;
        }
        let at = if front == segment.is_forward() { idx + 1 } else { idx };
        Some(points[at])
    }

    pub fn segment_len_m(&self, segment: Segment) -> Option<f64> {
        let points = self.track(segment)?;
        let idx = segment.idx() as usize;
        (idx + 1 < points.len()).then(|| Haversine.distance(points[idx], points[idx + 1]))
    }

    /// Nearest attachable track vertex: (track, vertex, distance).
    pub fn attach(&self, point: Point<f64>) -> Option<(usize, usize, f64)> {
        self.tracks
            .iter()
            .enumerate()
            .flat_map(|(t, track)| {
                track
                    .iter()
                    .enumerate()
                    .map(move |(v, &p)| (t, v, Haversine.distance(point, p)))
            })
            .filter(|&(_, _, d)| d <= GUIDE_ATTACH_M)
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// Continuation along the same track in the direction of travel.
    pub fn neighbors(&self, segment: Segment, outgoing: bool) -> SmallVec<[Segment; 2]> {
        let mut out = SmallVec::new();
        let Some(points) = self.track(segment) else {
            return out;
        };
        let count = (points.len() - 1) as i64;
        let idx = segment.idx() as i64;
        let next = if segment.is_forward() == outgoing { idx + 1 } else { idx - 1 };
        if (0..count).contains(&next) {
            out.push(Segment::new(
                GUIDE_SHARD_ID,
                segment.feature(),
                next as u32,
                segment.is_forward(),
            ));
        }
        out
    }

    /// Guide segments leaving (with `outgoing`) or arriving at one track
    /// vertex, in both travel directions.
    pub fn transfers_at(&self, track: usize, vertex: usize, outgoing: bool) -> SmallVec<[Segment; 4]> {
        let mut out = SmallVec::new();
        let Some(points) = self.tracks.get(track) else {
            return out;
        };
        let count = points.len() - 1;
        let (t, v) = (track as u32, vertex as u32);
        if outgoing {
            if vertex < count {
                out.push(Segment::new(GUIDE_SHARD_ID, t, v, true));
            }
            if vertex > 0 {
                out.push(Segment::new(GUIDE_SHARD_ID, t, v - 1, false));
            }
        } else {
            if vertex > 0 {
                out.push(Segment::new(GUIDE_SHARD_ID, t, v - 1, true));
            }
            if vertex < count {
                out.push(Segment::new(GUIDE_SHARD_ID, t, v, false));
            }
        }
        out
    }

    /// Ties a checkpoint to the nearest guide vertex as a snapping
    /// candidate, when one is within reach.
    pub fn project(&self, point: Point<f64>) -> Option<Projection> {
        let (track, vertex, _) = self.attach(point)?;
        let points = &self.tracks[track];
        let idx = vertex.min(points.len() - 2);
        Some(Projection {
            segment: Segment::new(GUIDE_SHARD_ID, track as u32, idx as u32, true),
            on_road: points[vertex],
            segment_back: points[idx],
            segment_front: points[idx + 1],
            one_way: false,
        })
    }
}
