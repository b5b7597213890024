//! Event definitions - the catalog of swimmable events.

use serde::{Deserialize, Serialize};

use crate::types::{EventDefId, Stroke};

/// Definition of an event (e.g. "100 Free", "200 Medley Relay").
///
/// Immutable once referenced by a result: results hold the ID, and edits to
/// the catalog must create new definitions rather than mutate old ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDef {
    /// Unique identifier.
    pub id: EventDefId,

    /// Race distance in yards. Relay distance is the full relay, not a leg.
    pub distance_yards: u32,

    /// The stroke swum (IM for medley events).
    pub stroke: Stroke,

    /// Whether this is a relay event.
    pub is_relay: bool,

    /// Display label shown in result listings.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_def_serde_roundtrip() {
        let event = EventDef {
            id: EventDefId::new("event-200-medley-relay").unwrap(),
            distance_yards: 200,
            stroke: Stroke::Im,
            is_relay: true,
            label: "200 Medley Relay".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"distanceYards\":200"));
        assert!(json.contains("\"isRelay\":true"));
        assert!(json.contains("\"stroke\":\"IM\""));

        let parsed: EventDef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
