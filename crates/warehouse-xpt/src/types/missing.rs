//! SAS numeric missing value codes.

use std::fmt;

/// One of the 28 SAS missing value codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingValue {
    /// Standard missing (`.`).
    #[default]
    Standard,
    /// Underscore missing (`._`).
    Underscore,
    /// Special missing `.A` through `.Z`.
    Special(char),
}

impl MissingValue {
    /// Decode the marker byte of a missing numeric field.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'.' => Some(Self::Standard),
            b'_' => Some(Self::Underscore),
            b'A'..=b'Z' => Some(Self::Special(byte as char)),
            _ => None,
        }
    }

    /// Marker byte written as the first byte of the field.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Standard => b'.',
            Self::Underscore => b'_',
            Self::Special(ch) if ch.is_ascii_uppercase() => ch as u8,
            Self::Special(_) => b'.',
        }
    }
}

impl fmt::Display for MissingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "."),
            Self::Underscore => write!(f, "._"),
            Self::Special(ch) => write!(f, ".{ch}"),
        }
    }
}
