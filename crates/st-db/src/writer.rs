//! Audited, transactional result writes.
//!
//! Every create or update of a result is paired with exactly one audit log
//! entry inside a single SQLite transaction: both rows commit or neither
//! does. For relay creation with lead-off derivation, the relay and its
//! audit entry commit even when derivation fails; the failure surfaces as a
//! warning on the outcome, never as a transaction abort.

use rusqlite::{Transaction, params};

use st_core::audit::{AuditAction, AuditEntry, EntityType};
use st_core::event_def::EventDef;
use st_core::relay::{LeadOffError, build_lead_off_result};
use st_core::result::{IndividualResult, RelayResult};
use st_core::types::{RelayId, ResultId};

use crate::live::Table;
use crate::{Database, DbError, format_timestamp};

/// Whether a relay write should also record the lead-off leg as an
/// individual result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOffPolicy {
    Skip,
    Derive,
}

/// What happened to the lead-off leg during a relay write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOffOutcome {
    /// Derivation was not requested.
    NotRequested,
    /// The derived individual result was written.
    Recorded(ResultId),
    /// Derivation failed; the relay itself still committed.
    Failed(LeadOffError),
}

/// Outcome of a relay create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayWriteOutcome {
    pub relay_id: RelayId,
    pub lead_off: LeadOffOutcome,
}

impl RelayWriteOutcome {
    /// User-facing warning when the lead-off leg was not recorded.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match &self.lead_off {
            LeadOffOutcome::Failed(error) => {
                Some(format!("Relay saved, but lead-off not recorded: {error}"))
            }
            _ => None,
        }
    }
}

impl Database {
    /// Creates an individual result and its audit entry atomically.
    pub fn create_individual_result(&mut self, result: &IndividualResult) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        insert_individual(&tx, result)?;
        insert_audit(
            &tx,
            &AuditEntry::for_entity(
                EntityType::IndividualResult,
                result.id.as_str(),
                AuditAction::Create,
                result,
            ),
        )?;
        tx.commit()?;
        tracing::debug!(result = %result.id, "individual result created");
        self.notifier()
            .publish_all(&[Table::IndividualResults, Table::AuditLog]);
        Ok(())
    }

    /// Updates an individual result's fields and appends an audit entry,
    /// atomically.
    ///
    /// Identity is immutable: the row for `result.id` must already exist.
    /// `updated_at` is bumped to now; `created_at` is left as stored.
    pub fn update_individual_result(&mut self, result: &IndividualResult) -> Result<(), DbError> {
        let mut updated = result.clone();
        updated.updated_at = st_core::types::now_ms();

        let tx = self.conn.transaction()?;
        let affected = tx.execute(
            "
            UPDATE individual_results
            SET swimmer_id = ?, meet_id = ?, event_def_id = ?, heat = ?, lane = ?,
                time_ms = ?, splits_ms = ?, status = ?, notes = ?, updated_at = ?
            WHERE id = ?
            ",
            params![
                updated.swimmer_id.as_str(),
                updated.meet_id.as_str(),
                updated.event_def_id.as_str(),
                updated.heat,
                updated.lane,
                updated.time_ms.millis(),
                splits_json(&updated)?,
                updated.status.as_str(),
                updated.notes,
                format_timestamp(updated.updated_at),
                updated.id.as_str(),
            ],
        )?;
        if affected == 0 {
            return Err(DbError::invalid(
                updated.id.as_str(),
                "cannot update a result that was never created",
            ));
        }
        insert_audit(
            &tx,
            &AuditEntry::for_entity(
                EntityType::IndividualResult,
                updated.id.as_str(),
                AuditAction::Update,
                &updated,
            ),
        )?;
        tx.commit()?;
        tracing::debug!(result = %updated.id, "individual result updated");
        self.notifier()
            .publish_all(&[Table::IndividualResults, Table::AuditLog]);
        Ok(())
    }

    /// Creates a relay result and its audit entry atomically, optionally
    /// deriving the lead-off leg as an individual result in the same
    /// transaction.
    ///
    /// Derivation failure is downgraded to [`LeadOffOutcome::Failed`]; the
    /// relay and its audit entry still commit. Only a database error aborts
    /// the transaction.
    pub fn create_relay_result(
        &mut self,
        relay: &RelayResult,
        event: &EventDef,
        lead_off: LeadOffPolicy,
    ) -> Result<RelayWriteOutcome, DbError> {
        let tx = self.conn.transaction()?;
        insert_relay(&tx, relay)?;
        insert_audit(
            &tx,
            &AuditEntry::for_entity(
                EntityType::RelayResult,
                relay.id.as_str(),
                AuditAction::Create,
                relay,
            ),
        )?;

        let mut touched = vec![Table::RelayResults, Table::AuditLog];
        let lead_off = match lead_off {
            LeadOffPolicy::Skip => LeadOffOutcome::NotRequested,
            LeadOffPolicy::Derive => {
                match derive_lead_off(&tx, relay, event)? {
                    Ok(result_id) => {
                        touched.push(Table::IndividualResults);
                        LeadOffOutcome::Recorded(result_id)
                    }
                    Err(error) => {
                        tracing::warn!(relay = %relay.id, %error, "lead-off derivation failed");
                        LeadOffOutcome::Failed(error)
                    }
                }
            }
        };

        tx.commit()?;
        tracing::debug!(relay = %relay.id, "relay result created");
        self.notifier().publish_all(&touched);
        Ok(RelayWriteOutcome {
            relay_id: relay.id.clone(),
            lead_off,
        })
    }
}

/// Attempts lead-off derivation inside the relay transaction.
///
/// The outer `Result` is a database failure (aborts the transaction); the
/// inner one is the domain outcome.
fn derive_lead_off(
    tx: &Transaction<'_>,
    relay: &RelayResult,
    event: &EventDef,
) -> Result<Result<ResultId, LeadOffError>, DbError> {
    // Resolve against the catalog as of this transaction.
    let candidates = individual_event_defs(tx)?;
    let derived = build_lead_off_result(relay, event, &relay.meet_id, relay.status, |dist, stroke| {
        candidates
            .iter()
            .find(|def| def.distance_yards == dist && def.stroke == stroke)
            .map(|def| def.id.clone())
    });

    match derived {
        Ok(result) => {
            insert_individual(tx, &result)?;
            insert_audit(
                tx,
                &AuditEntry::for_entity(
                    EntityType::IndividualResult,
                    result.id.as_str(),
                    AuditAction::Create,
                    &result,
                ),
            )?;
            Ok(Ok(result.id))
        }
        Err(error) => Ok(Err(error)),
    }
}

fn individual_event_defs(tx: &Transaction<'_>) -> Result<Vec<EventDef>, DbError> {
    let mut stmt = tx.prepare(
        "SELECT id, distance_yards, stroke, is_relay, label FROM event_defs WHERE is_relay = 0",
    )?;
    let rows = stmt.query_map([], crate::map_event_def_row)?;
    let mut events = Vec::new();
    for row in rows {
        events.push(crate::convert_event_def(row?)?);
    }
    Ok(events)
}

fn insert_individual(tx: &Transaction<'_>, result: &IndividualResult) -> Result<(), DbError> {
    tx.execute(
        "
        INSERT INTO individual_results
        (id, swimmer_id, meet_id, event_def_id, heat, lane, time_ms, splits_ms,
         status, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            result.id.as_str(),
            result.swimmer_id.as_str(),
            result.meet_id.as_str(),
            result.event_def_id.as_str(),
            result.heat,
            result.lane,
            result.time_ms.millis(),
            splits_json(result)?,
            result.status.as_str(),
            result.notes,
            format_timestamp(result.created_at),
            format_timestamp(result.updated_at),
        ],
    )?;
    Ok(())
}

fn insert_relay(tx: &Transaction<'_>, relay: &RelayResult) -> Result<(), DbError> {
    let legs = serde_json::to_string(&relay.legs).map_err(|source| DbError::Payload {
        entity_id: relay.id.to_string(),
        source,
    })?;
    tx.execute(
        "
        INSERT INTO relay_results
        (id, meet_id, event_def_id, team_label, time_ms, status, notes, legs,
         created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            relay.id.as_str(),
            relay.meet_id.as_str(),
            relay.event_def_id.as_str(),
            relay.team_label,
            relay.time_ms.millis(),
            relay.status.as_str(),
            relay.notes,
            legs,
            format_timestamp(relay.created_at),
            format_timestamp(relay.updated_at),
        ],
    )?;
    Ok(())
}

fn insert_audit(tx: &Transaction<'_>, entry: &AuditEntry) -> Result<(), DbError> {
    tx.execute(
        "
        INSERT INTO audit_log (id, entity_type, entity_id, timestamp, action, payload)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
        params![
            entry.id.as_str(),
            entry.entity_type.as_str(),
            entry.entity_id,
            format_timestamp(entry.timestamp),
            entry.action.as_str(),
            entry.payload.to_string(),
        ],
    )?;
    Ok(())
}

fn splits_json(result: &IndividualResult) -> Result<String, DbError> {
    serde_json::to_string(&result.splits_ms).map_err(|source| DbError::Payload {
        entity_id: result.id.to_string(),
        source,
    })
}
