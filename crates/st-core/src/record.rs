//! Team records - best all-time marks per event.
//!
//! Records are maintained by explicit user action. Nothing in the core
//! derives or overwrites them from incoming results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{EventDefId, MeetId, RecordId, SwimmerId, TimeMs};

/// The team's best all-time mark for one event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub id: RecordId,
    pub event_def_id: EventDefId,
    pub is_relay: bool,

    /// Holder(s): one swimmer for individual events, four for relays.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holder_swimmer_ids: Vec<SwimmerId>,

    pub time_ms: TimeMs,

    /// Meet where the record was set, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_id: Option<MeetId>,

    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serde_roundtrip() {
        let record = TeamRecord {
            id: RecordId::new("r1").unwrap(),
            event_def_id: EventDefId::new("event-100-fly").unwrap(),
            is_relay: false,
            holder_swimmer_ids: vec![SwimmerId::new("s1").unwrap()],
            time_ms: TimeMs::new(52_310).unwrap(),
            meet_id: None,
            date: "2025-11-08".parse().unwrap(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: TeamRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
