//! Variable (column) definitions.

/// SAS variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XptType {
    Num,
    Char,
}

impl XptType {
    /// Decode the NAMESTR `ntype` field (1 = numeric, 2 = character).
    #[must_use]
    pub fn from_ntype(ntype: i16) -> Option<Self> {
        match ntype {
            1 => Some(Self::Num),
            2 => Some(Self::Char),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_ntype(self) -> i16 {
        match self {
            Self::Num => 1,
            Self::Char => 2,
        }
    }
}

/// A variable definition parsed from (or written to) a NAMESTR record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XptColumn {
    pub name: String,
    pub label: Option<String>,
    pub data_type: XptType,
    /// Byte width inside an observation.
    pub length: u16,
}

impl XptColumn {
    /// Numeric variable with the standard 8-byte width.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type: XptType::Num,
            length: 8,
        }
    }

    pub fn character(name: impl Into<String>, length: u16) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type: XptType::Char,
            length,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
