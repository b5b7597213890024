//! Audit log entries for result mutations.
//!
//! Every create or update of a result is paired with exactly one entry
//! carrying a full JSON snapshot of the entity at the time of the action.
//! The log is append-only; nothing in the core mutates or deletes entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AuditId, ValidationError, now_ms};

/// Which kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    IndividualResult,
    RelayResult,
}

impl EntityType {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IndividualResult => "individualResult",
            Self::RelayResult => "relayResult",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individualResult" => Ok(Self::IndividualResult),
            "relayResult" => Ok(Self::RelayResult),
            _ => Err(ValidationError::InvalidEntityType {
                value: s.to_string(),
            }),
        }
    }
}

/// The mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
}

impl AuditAction {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: AuditId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,

    /// Snapshot of the entity at the time of the action.
    pub payload: serde_json::Value,
}

impl AuditEntry {
    /// Builds an entry for a mutation, snapshotting `entity` as JSON.
    ///
    /// Serialization of the domain models is infallible, so this cannot
    /// fail for entities the crate defines.
    #[must_use]
    pub fn for_entity<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        action: AuditAction,
        entity: &T,
    ) -> Self {
        let payload = serde_json::to_value(entity).unwrap_or(serde_json::Value::Null);
        Self {
            id: AuditId::new(Uuid::new_v4().to_string()).unwrap_or_else(|_| unreachable!()),
            entity_type,
            entity_id: entity_id.into(),
            timestamp: now_ms(),
            action,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::IndividualResult;
    use crate::types::{EventDefId, MeetId, ResultStatus, SwimmerId, TimeMs};

    #[test]
    fn entity_type_storage_spelling_matches_payloads() {
        assert_eq!(EntityType::IndividualResult.as_str(), "individualResult");
        assert_eq!(EntityType::RelayResult.as_str(), "relayResult");
        assert_eq!(
            "relayResult".parse::<EntityType>().unwrap(),
            EntityType::RelayResult
        );
        assert!("swimmer".parse::<EntityType>().is_err());
    }

    #[test]
    fn snapshot_payload_deserializes_back_to_entity() {
        let result = IndividualResult::new(
            SwimmerId::new("s1").unwrap(),
            MeetId::new("m1").unwrap(),
            EventDefId::new("e1").unwrap(),
            TimeMs::new(61_000).unwrap(),
            ResultStatus::Ok,
        );
        let entry = AuditEntry::for_entity(
            EntityType::IndividualResult,
            result.id.as_str(),
            AuditAction::Create,
            &result,
        );

        assert_eq!(entry.entity_id, result.id.as_str());
        assert_eq!(entry.action, AuditAction::Create);
        let roundtrip: IndividualResult = serde_json::from_value(entry.payload).unwrap();
        assert_eq!(roundtrip, result);
    }
}
