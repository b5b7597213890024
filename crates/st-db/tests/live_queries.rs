//! Integration tests for reactive read subscriptions.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use st_core::event_def::EventDef;
use st_core::result::IndividualResult;
use st_core::types::{EventDefId, MeetId, ResultStatus, Stroke, SwimmerId, TimeMs};
use st_db::{Database, Table, spawn_live_query};

fn ms(value: i64) -> TimeMs {
    TimeMs::new(value).unwrap()
}

fn seeded_db() -> Result<Arc<Mutex<Database>>> {
    let mut db = Database::open_in_memory()?;
    db.put_event_def(&EventDef {
        id: EventDefId::new("event-100-free").unwrap(),
        distance_yards: 100,
        stroke: Stroke::Free,
        is_relay: false,
        label: "100 Free".to_string(),
    })?;
    Ok(Arc::new(Mutex::new(db)))
}

fn individual(time: i64) -> IndividualResult {
    IndividualResult::new(
        SwimmerId::new("s1").unwrap(),
        MeetId::new("m1").unwrap(),
        EventDefId::new("event-100-free").unwrap(),
        ms(time),
        ResultStatus::Ok,
    )
}

/// The personal-best live query under test.
fn pb_query(db: &Database) -> std::result::Result<Option<TimeMs>, st_db::DbError> {
    let results = db.list_individual_results()?;
    let event = EventDefId::new("event-100-free").unwrap();
    Ok(st_core::personal_best(&results, &event))
}

#[tokio::test]
async fn live_query_recomputes_after_committed_write() -> Result<()> {
    let db = seeded_db()?;
    let mut handle = spawn_live_query(&db, vec![Table::IndividualResults], pb_query)?;
    assert_eq!(handle.current(), None);

    db.lock().unwrap().create_individual_result(&individual(61_000))?;
    assert_eq!(handle.changed().await, Some(Some(ms(61_000))));

    // A faster swim moves the minimum.
    db.lock().unwrap().create_individual_result(&individual(59_500))?;
    assert_eq!(handle.changed().await, Some(Some(ms(59_500))));
    Ok(())
}

#[tokio::test]
async fn live_query_ignores_unrelated_tables() -> Result<()> {
    let db = seeded_db()?;
    let mut handle = spawn_live_query(&db, vec![Table::IndividualResults], pb_query)?;

    // A settings write must not wake the query; the next delivery comes
    // from the result write that follows it.
    db.lock()
        .unwrap()
        .put_setting(&st_core::Setting::CourseConversions(false))?;
    db.lock().unwrap().create_individual_result(&individual(60_250))?;

    assert_eq!(handle.changed().await, Some(Some(ms(60_250))));
    Ok(())
}

#[tokio::test]
async fn unsubscribe_stops_deliveries() -> Result<()> {
    let db = seeded_db()?;
    let handle = spawn_live_query(&db, vec![Table::IndividualResults], pb_query)?;
    handle.unsubscribe();

    // Writes after unsubscribe no longer have a subscriber; this must not
    // error or block.
    db.lock().unwrap().create_individual_result(&individual(61_000))?;
    Ok(())
}

#[tokio::test]
async fn change_stream_reports_committed_tables() -> Result<()> {
    let db = seeded_db()?;
    let mut stream = db.lock().unwrap().subscribe();

    db.lock().unwrap().create_individual_result(&individual(61_000))?;

    let first = stream.next().await.unwrap();
    let second = stream.next().await.unwrap();
    assert_eq!(first.table, Table::IndividualResults);
    assert_eq!(second.table, Table::AuditLog);
    Ok(())
}
