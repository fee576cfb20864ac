//! Log message payload

use chrono::{DateTime, Utc};
use scribe_levels::{predefined, LevelId};

/// One log message
///
/// Fields are written while the message is exclusively owned by the
/// acquiring call; once published as a [`PooledMessage`](crate::PooledMessage)
/// the message is shared read-only.
#[derive(Debug, Clone)]
pub struct LogMessage {
    /// Wall-clock timestamp
    pub timestamp: DateTime<Utc>,

    /// High-precision monotonic stamp (nanoseconds since an arbitrary epoch)
    pub nanos: u64,

    /// Name of the writer that emitted the message
    pub writer: String,

    /// Level id (mask bit position)
    pub level: LevelId,

    /// Level name, resolved at write time for formatters
    pub level_name: String,

    /// Writer tags, in registration order
    pub tags: Vec<String>,

    /// Application name
    pub application: String,

    /// Process name
    pub process_name: String,

    /// Process id
    pub process_id: u32,

    /// Message text
    pub text: String,
}

impl Default for LogMessage {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::MIN_UTC,
            nanos: 0,
            writer: String::new(),
            level: predefined::INFO,
            level_name: String::new(),
            tags: Vec::new(),
            application: String::new(),
            process_name: String::new(),
            process_id: 0,
            text: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let msg = LogMessage::default();
        assert_eq!(msg.level, predefined::INFO);
        assert!(msg.writer.is_empty());
        assert!(msg.text.is_empty());
    }
}
