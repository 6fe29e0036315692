use strum::Display;

/// Resolution the facade presents to a search. Switching modes is cheap;
/// per-shard caches survive the switch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum Mode {
    /// Current shard only, no stitching. Dead-end probes.
    SingleShard,
    /// Full detail with real cross-shard edges. Short trips and final
    /// reconstruction.
    NoLeaps,
    /// Expansion jumps between intersections; interior points are
    /// re-expanded on reconstruction. Default for short-range search.
    Joints,
    /// Shard entry/exit vertices only. Continental scale.
    LeapsOnly,
    /// Joints restricted to one shard; verifies a single leap hop.
    JointSingleShard,
}

impl Mode {
    /// Whether expansion may follow twins across shard borders.
    pub fn stitches(&self) -> bool {
        matches!(self, Mode::NoLeaps | Mode::Joints | Mode::LeapsOnly)
    }

    /// Whether expansion compresses straight runs between joints.
    pub fn joints(&self) -> bool {
        matches!(self, Mode::Joints | Mode::JointSingleShard)
    }
}
