use std::fmt::{Display, Formatter};

/// Structured corruption conditions raised while reading persisted
/// sections. Always propagated, never silently patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The layout version is newer than this reader understands.
    UnsupportedVersion { found: u8, supported: u8 },
    /// A joint id fell outside the header's declared joint count.
    JointOutOfRange { value: u32, bound: u32 },
    /// A joint repeat-delta pointed before the first emitted id.
    BadJointDelta { delta: u32, emitted: u32 },
    /// The byte position after a section did not match its stored
    /// length.
    SectionEndMismatch { expected: usize, actual: usize },
    /// The stream ended inside a value.
    UnexpectedEof { at_byte: usize },
    /// A gamma code exceeded the width of its target type.
    GammaOverflow { bits: u32 },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::UnsupportedVersion { found, supported } => {
                write!(f, "unsupported section version {found}, reader supports {supported}")
            }
            CodecError::JointOutOfRange { value, bound } => {
                write!(f, "joint id {value} out of range, expected < {bound}")
            }
            CodecError::BadJointDelta { delta, emitted } => {
                write!(f, "joint repeat delta {delta} with only {emitted} ids emitted")
            }
            CodecError::SectionEndMismatch { expected, actual } => {
                write!(f, "section ended at byte {actual}, expected {expected}")
            }
            CodecError::UnexpectedEof { at_byte } => {
                write!(f, "unexpected end of section at byte {at_byte}")
            }
            CodecError::GammaOverflow { bits } => {
                write!(f, "gamma code of {bits} bits does not fit the target")
            }
        }
    }
}

impl std::error::Error for CodecError {}
