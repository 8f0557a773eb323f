use serde::Serialize;
use std::fmt;

/// width used when a register declaration has no `.WIDTH` suffix
pub const DEFAULT_WIDTH: &str = "L";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RegisterId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldSetId(pub usize);

impl fmt::Display for FieldSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fs{}", self.0)
    }
}

/// a named bit range within a register, `start <= stop`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Field {
    pub name: String,
    pub start: u32,
    pub stop: u32,
}

impl Field {
    pub fn is_single_bit(&self) -> bool {
        self.start == self.stop
    }

    /// bit range as written in a devregs file: `N` or `START-STOP`
    pub fn bits(&self) -> String {
        if self.is_single_bit() {
            self.start.to_string()
        } else {
            format!("{}-{}", self.start, self.stop)
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}:{}", self.name, self.bits())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    /// canonical upper-case address token
    pub address: String,
    pub width: String,
    pub field_set: Option<FieldSetId>,
}

impl Register {
    /// width for display, `None` for the default width
    pub fn display_width(&self) -> Option<&str> {
        if self.width == DEFAULT_WIDTH {
            None
        } else {
            Some(&self.width)
        }
    }
}

/// fields declared for one register, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    pub fields: Vec<FieldId>,
    /// order-independent content hash, used for bucketing only
    pub hash: u64,
    /// number of registers whose fields resolved to this set
    pub usage: usize,
}
