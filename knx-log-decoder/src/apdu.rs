//! APDU command classification
//!
//! The first two APDU bytes carry the TPCI and the APCI. For group
//! communication only three commands exist, encoded in the top two bits of
//! the second byte:
//!
//! ```text
//! Byte 0: TTTT TTAA   A = APCI bits 9-8 (must be 0 for group services)
//! Byte 1: AADD DDDD   A = APCI bits 7-6, D = 6-bit inline value
//! ```

use std::fmt;

/// Mask of the command bits in the second APDU byte
const COMMAND_MASK: u8 = 0xC0;

/// Group command encoded in an APDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApduKind {
    /// `A_GroupValue_Read` - no value
    Read,
    /// `A_GroupValue_Response`
    Response,
    /// `A_GroupValue_Write`
    Write,
    /// Malformed or not a group value service
    Unknown,
}

impl ApduKind {
    /// Classify an APDU from its first two bytes
    ///
    /// Payloads shorter than two bytes cannot carry a command and are
    /// reported as `Unknown`; callers reject them before decoding.
    pub fn classify(payload: &[u8]) -> Self {
        let (tpci, apci) = match payload {
            [tpci, apci, ..] => (*tpci, *apci),
            _ => return ApduKind::Unknown,
        };

        if tpci & 0x03 != 0 {
            return ApduKind::Unknown;
        }

        match apci & COMMAND_MASK {
            0x00 => ApduKind::Read,
            0x40 => ApduKind::Response,
            0x80 => ApduKind::Write,
            _ => ApduKind::Unknown,
        }
    }

    /// True if telegrams of this kind carry a value
    pub fn carries_value(&self) -> bool {
        matches!(self, ApduKind::Response | ApduKind::Write)
    }
}

impl fmt::Display for ApduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApduKind::Read => write!(f, "Read"),
            ApduKind::Response => write!(f, "Response"),
            ApduKind::Write => write!(f, "Write"),
            ApduKind::Unknown => write!(f, "Unknown APDU"),
        }
    }
}
