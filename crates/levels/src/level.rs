//! Log levels and dense level ids
//!
//! A `LevelId` is a small dense index into the activation mask. Predefined
//! levels occupy a fixed contiguous range in severity order; aspect levels
//! are appended after them by the registry.

use std::fmt;

/// Sentinel level name enabling every level
pub const LEVEL_ALL: &str = "All";

/// Sentinel level name disabling every level
pub const LEVEL_NONE: &str = "None";

/// Dense level identifier used for mask indexing
///
/// Lower id = more severe. Ids are stable for the process lifetime once
/// assigned and two names never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(u8);

impl LevelId {
    /// Create a level id from a raw index
    #[inline]
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw index
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Get the index as usize (for array indexing)
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level:{}", self.0)
    }
}

/// A named log level with its dense id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLevel {
    /// Dense id (mask bit position)
    pub id: LevelId,

    /// Level name as used in configuration
    pub name: String,
}

impl LogLevel {
    /// Create a level
    pub fn new(id: LevelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id.as_u8())
    }
}

/// The predefined severity ladder
///
/// Ids 0..=12, severity-ordered. Aspect levels registered at runtime receive
/// ids starting at [`COUNT`](predefined::COUNT).
pub mod predefined {
    use super::LevelId;

    pub const FAILURE: LevelId = LevelId::new(0);
    pub const CRITICAL: LevelId = LevelId::new(1);
    pub const EXCEPTION: LevelId = LevelId::new(2);
    pub const ERROR: LevelId = LevelId::new(3);
    pub const WARNING: LevelId = LevelId::new(4);
    pub const NOTICE: LevelId = LevelId::new(5);
    pub const INFO: LevelId = LevelId::new(6);
    pub const TRACE: LevelId = LevelId::new(7);
    pub const DEBUG: LevelId = LevelId::new(8);
    pub const VERBOSE: LevelId = LevelId::new(9);
    pub const TRACE_ENTER: LevelId = LevelId::new(10);
    pub const TRACE_EXIT: LevelId = LevelId::new(11);
    pub const TRACE_DATA: LevelId = LevelId::new(12);

    /// Number of predefined levels
    pub const COUNT: usize = NAMES.len();

    /// Predefined level names, indexed by id
    pub const NAMES: [&str; 13] = [
        "Failure",
        "Critical",
        "Exception",
        "Error",
        "Warning",
        "Notice",
        "Info",
        "Trace",
        "Debug",
        "Verbose",
        "TraceEnter",
        "TraceExit",
        "TraceData",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_ids_are_dense() {
        for (i, name) in predefined::NAMES.iter().enumerate() {
            assert!(!name.is_empty());
            assert_eq!(LevelId::new(i as u8).as_usize(), i);
        }
        assert_eq!(predefined::ERROR.as_u8(), 3);
        assert_eq!(predefined::NOTICE.as_u8(), 5);
        assert_eq!(predefined::DEBUG.as_u8(), 8);
    }

    #[test]
    fn test_level_display() {
        let level = LogLevel::new(predefined::ERROR, "Error");
        assert_eq!(level.to_string(), "Error(3)");
        assert_eq!(predefined::ERROR.to_string(), "level:3");
    }
}
