use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for one live connection.
///
/// Partner references are stored as `ParticipantId`s looked up through the
/// registry, so neither side of a pairing owns the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(uuid::Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// First eight hex digits, used to keep log lines short.
    pub fn short(&self) -> String {
        let bytes = self.0.as_bytes();
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_v4_uuid() {
        let id = ParticipantId::new();
        let parsed = uuid::Uuid::parse_str(&id.to_string()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn new_id_is_unique() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn short_is_eight_hex_chars() {
        let short = ParticipantId::new().short();
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn short_is_prefix_of_display() {
        let id = ParticipantId::new();
        assert!(id.to_string().starts_with(&id.short()));
    }

    #[test]
    fn id_serialization() {
        let id = ParticipantId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let id = ParticipantId::new();
        set.insert(id);
        set.insert(id);
        assert_eq!(set.len(), 1);
    }
}
