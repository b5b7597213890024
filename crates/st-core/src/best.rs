//! Personal-best and season-best aggregation.
//!
//! Both functions are pure O(n) scans over the supplied result set,
//! recomputed fresh on every call. There is no cache here; the storage
//! layer's live queries decide when a recompute is worth running.

use std::collections::HashMap;

use crate::result::IndividualResult;
use crate::settings::AppConfig;
use crate::types::{EventDefId, MeetId, ResultStatus, SeasonId, TimeMs};

/// Fastest `OK`-status time for an event across all results.
///
/// Returns `None` when no `OK` result matches the event. DQ, DNS, and
/// exhibition swims never count. Ties break arbitrarily; only the minimum
/// value is significant.
#[must_use]
pub fn personal_best(results: &[IndividualResult], event_def_id: &EventDefId) -> Option<TimeMs> {
    results
        .iter()
        .filter(|result| result.status == ResultStatus::Ok)
        .filter(|result| &result.event_def_id == event_def_id)
        .map(|result| result.time_ms)
        .min()
}

/// Fastest `OK`-status time for an event within one season.
///
/// A result counts only when its meet maps to `season_id` through the
/// supplied lookup; results whose meet is absent from the lookup are
/// ignored.
#[must_use]
pub fn season_best(
    results: &[IndividualResult],
    event_def_id: &EventDefId,
    season_id: &SeasonId,
    meet_season_lookup: &HashMap<MeetId, SeasonId>,
) -> Option<TimeMs> {
    results
        .iter()
        .filter(|result| result.status == ResultStatus::Ok)
        .filter(|result| &result.event_def_id == event_def_id)
        .filter(|result| meet_season_lookup.get(&result.meet_id) == Some(season_id))
        .map(|result| result.time_ms)
        .min()
}

/// Season best against the configured active season.
///
/// The configuration is an explicit snapshot, not ambient state; callers
/// capture it once per render and pass it in. Returns `None` when no
/// season is active.
#[must_use]
pub fn season_best_active(
    results: &[IndividualResult],
    event_def_id: &EventDefId,
    config: &AppConfig,
    meet_season_lookup: &HashMap<MeetId, SeasonId>,
) -> Option<TimeMs> {
    let season_id = config.active_season_id.as_ref()?;
    season_best(results, event_def_id, season_id, meet_season_lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SwimmerId;

    fn result(meet: &str, event: &str, time: i64, status: ResultStatus) -> IndividualResult {
        IndividualResult::new(
            SwimmerId::new("s1").unwrap(),
            MeetId::new(meet).unwrap(),
            EventDefId::new(event).unwrap(),
            TimeMs::new(time).unwrap(),
            status,
        )
    }

    #[test]
    fn personal_best_excludes_non_ok_statuses() {
        let results = vec![
            result("m1", "e1", 61_000, ResultStatus::Ok),
            result("m1", "e1", 60_000, ResultStatus::Ok),
            result("m2", "e1", 60_500, ResultStatus::Dq),
        ];
        let event = EventDefId::new("e1").unwrap();
        assert_eq!(
            personal_best(&results, &event),
            Some(TimeMs::new(60_000).unwrap())
        );
    }

    #[test]
    fn personal_best_ignores_other_events() {
        let results = vec![
            result("m1", "e1", 61_000, ResultStatus::Ok),
            result("m1", "e2", 30_000, ResultStatus::Ok),
        ];
        let event = EventDefId::new("e1").unwrap();
        assert_eq!(
            personal_best(&results, &event),
            Some(TimeMs::new(61_000).unwrap())
        );
    }

    #[test]
    fn personal_best_is_none_for_empty_filter() {
        let results = vec![result("m1", "e1", 61_000, ResultStatus::Dns)];
        let event = EventDefId::new("e1").unwrap();
        assert_eq!(personal_best(&results, &event), None);
        assert_eq!(personal_best(&[], &event), None);
    }

    #[test]
    fn season_best_is_scoped_by_meet_season_lookup() {
        let results = vec![
            // Faster time, but from last season's meet.
            result("m-old", "e1", 58_000, ResultStatus::Ok),
            result("m-new", "e1", 60_000, ResultStatus::Ok),
            result("m-new", "e1", 59_500, ResultStatus::Ok),
        ];
        let event = EventDefId::new("e1").unwrap();
        let this_season = SeasonId::new("season-2026").unwrap();
        let lookup: HashMap<MeetId, SeasonId> = [
            (
                MeetId::new("m-old").unwrap(),
                SeasonId::new("season-2025").unwrap(),
            ),
            (MeetId::new("m-new").unwrap(), this_season.clone()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            season_best(&results, &event, &this_season, &lookup),
            Some(TimeMs::new(59_500).unwrap())
        );
    }

    #[test]
    fn season_best_skips_meets_missing_from_lookup() {
        let results = vec![result("m-unknown", "e1", 55_000, ResultStatus::Ok)];
        let event = EventDefId::new("e1").unwrap();
        let season = SeasonId::new("season-2026").unwrap();
        assert_eq!(season_best(&results, &event, &season, &HashMap::new()), None);
    }

    #[test]
    fn active_season_best_requires_an_active_season() {
        let results = vec![result("m1", "e1", 60_000, ResultStatus::Ok)];
        let event = EventDefId::new("e1").unwrap();
        let season = SeasonId::new("season-2026").unwrap();
        let lookup: HashMap<MeetId, SeasonId> =
            [(MeetId::new("m1").unwrap(), season.clone())].into_iter().collect();

        let mut config = AppConfig::default();
        assert_eq!(season_best_active(&results, &event, &config, &lookup), None);

        config.active_season_id = Some(season);
        assert_eq!(
            season_best_active(&results, &event, &config, &lookup),
            Some(TimeMs::new(60_000).unwrap())
        );
    }
}
