//! Recorded swims - individual and relay results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    EventDefId, MeetId, RelayId, ResultId, ResultStatus, SwimmerId, TimeMs, ValidationError,
    now_ms,
};

/// Position of a leg within a relay.
///
/// Exactly one leg per order value; the closed enum makes out-of-range
/// orders unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LegOrder {
    Lead = 1,
    Second = 2,
    Third = 3,
    Anchor = 4,
}

impl LegOrder {
    /// All leg orders, lead-off first.
    pub const ALL: [Self; 4] = [Self::Lead, Self::Second, Self::Third, Self::Anchor];

    /// The 1-based leg number.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<LegOrder> for u8 {
    fn from(order: LegOrder) -> Self {
        order.as_u8()
    }
}

impl TryFrom<u8> for LegOrder {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Lead),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Anchor),
            _ => Err(ValidationError::InvalidLegOrder { value }),
        }
    }
}

/// One swimmer's leg of a relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayLeg {
    pub order: LegOrder,
    pub swimmer_id: SwimmerId,
    pub split_ms: TimeMs,
}

/// A single swimmer's recorded swim in one event at one meet.
///
/// Identity is immutable once created; updates mutate fields, never the ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndividualResult {
    pub id: ResultId,
    pub swimmer_id: SwimmerId,
    pub meet_id: MeetId,
    pub event_def_id: EventDefId,

    /// Heat number, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat: Option<u32>,

    /// Lane number, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<u32>,

    /// Final time.
    pub time_ms: TimeMs,

    /// Ordered intermediate splits; empty when none were recorded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splits_ms: Vec<TimeMs>,

    pub status: ResultStatus,

    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IndividualResult {
    /// Creates a new result with a fresh ID and current timestamps.
    #[must_use]
    pub fn new(
        swimmer_id: SwimmerId,
        meet_id: MeetId,
        event_def_id: EventDefId,
        time_ms: TimeMs,
        status: ResultStatus,
    ) -> Self {
        let now = now_ms();
        Self {
            id: new_id(),
            swimmer_id,
            meet_id,
            event_def_id,
            heat: None,
            lane: None,
            time_ms,
            splits_ms: Vec::new(),
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A relay team's recorded swim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayResult {
    pub id: RelayId,
    pub meet_id: MeetId,
    pub event_def_id: EventDefId,

    /// Short team label such as "A" or "B".
    pub team_label: String,

    /// Final relay time.
    pub time_ms: TimeMs,

    pub status: ResultStatus,

    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// The four legs, one per [`LegOrder`].
    pub legs: Vec<RelayLeg>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RelayResult {
    /// Creates a new relay result with a fresh ID and current timestamps.
    #[must_use]
    pub fn new(
        meet_id: MeetId,
        event_def_id: EventDefId,
        team_label: impl Into<String>,
        time_ms: TimeMs,
        status: ResultStatus,
        legs: Vec<RelayLeg>,
    ) -> Self {
        let now = now_ms();
        Self {
            id: new_relay_id(),
            meet_id,
            event_def_id,
            team_label: team_label.into(),
            time_ms,
            status,
            notes: None,
            legs,
            created_at: now,
            updated_at: now,
        }
    }
}

// UUIDs are never empty, so ID validation cannot fail here.

fn new_id() -> ResultId {
    ResultId::new(Uuid::new_v4().to_string()).unwrap_or_else(|_| unreachable!())
}

fn new_relay_id() -> RelayId {
    RelayId::new(Uuid::new_v4().to_string()).unwrap_or_else(|_| unreachable!())
}
