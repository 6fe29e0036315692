use geo::Point;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::graph::Segment;
use crate::model::SpeedKmh;

/// Geometry and cost model of one synthetic segment.
#[derive(Clone, Debug)]
pub struct FakeSegmentData {
    pub from: Point<f64>,
    pub to: Point<f64>,
    /// `None` travels off-road.
    pub speed: Option<SpeedKmh>,
    /// Set for part-of-real pieces: the substituted real segment, in the
    /// direction of travel. Expansion continues onto its neighbors.
    pub real: Option<Segment>,
}

type Links = SmallVec<[Segment; 4]>;

/// Synthetic vertices layered over the real network for one subroute:
/// checkpoint links and part-of-real substitutes.
///
/// Ids keep counting from `first_id` so consecutive subroutes of one
/// trip never collide.
pub struct FakeGraph {
    next_id: u32,
    data: FxHashMap<Segment, FakeSegmentData>,
    out: FxHashMap<Segment, Links>,
    inn: FxHashMap<Segment, Links>,
    /// Real segment -> finish-side substitutes, offered wherever a real
    /// edge targets that segment.
    real_out: FxHashMap<Segment, Links>,
    /// Real segment -> start-side substitutes, offered as predecessors
    /// wherever that segment is one.
    real_inn: FxHashMap<Segment, Links>,
}

impl FakeGraph {
    pub fn new(first_id: u32) -> Self {
        FakeGraph {
            next_id: first_id,
            data: FxHashMap::default(),
            out: FxHashMap::default(),
            inn: FxHashMap::default(),
            real_out: FxHashMap::default(),
            real_inn: FxHashMap::default(),
        }
    }

    /// First id not handed out; seed for the next subroute's fakes.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn add(&mut self, data: FakeSegmentData) -> Segment {
        let segment = Segment::fake(self.next_id);
        self.next_id += 1;
        self.data.insert(segment, data);
        segment
    }

    pub fn link(&mut self, from: Segment, to: Segment) {
        self.out.entry(from).or_default().push(to);
        self.inn.entry(to).or_default().push(from);
    }

    /// Registers a finish-side substitute for a real segment.
    pub fn substitute_out(&mut self, real: Segment, fake: Segment) {
        self.real_out.entry(real).or_default().push(fake);
    }

    /// Registers a start-side substitute for a real segment.
    pub fn substitute_inn(&mut self, real: Segment, fake: Segment) {
        self.real_inn.entry(real).or_default().push(fake);
    }

    pub fn data(&self, segment: &Segment) -> Option<&FakeSegmentData> {
        self.data.get(segment)
    }

    pub fn contains(&self, segment: &Segment) -> bool {
        self.data.contains_key(segment)
    }

    pub fn fake_out(&self, segment: &Segment) -> &[Segment] {
        self.out.get(segment).map(|l| l.as_slice()).unwrap_or(&[])
    }

    pub fn fake_inn(&self, segment: &Segment) -> &[Segment] {
        self.inn.get(segment).map(|l| l.as_slice()).unwrap_or(&[])
    }

    pub fn substitutes_out(&self, real: &Segment) -> &[Segment] {
        self.real_out
            .get(real)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    pub fn substitutes_inn(&self, real: &Segment) -> &[Segment] {
        self.real_inn
            .get(real)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any substitute is attached to the real segment; joint
    /// compression must not slide past these.
    pub fn touches(&self, real: &Segment) -> bool {
        self.real_out.contains_key(real)
            || self.real_inn.contains_key(real)
            || self.real_out.contains_key(&real.reversed())
            || self.real_inn.contains_key(&real.reversed())
    }
}
