//! Relay validation and lead-off leg derivation.

use std::collections::HashSet;

use thiserror::Error;

use crate::event_def::EventDef;
use crate::result::{IndividualResult, LegOrder, RelayLeg, RelayResult};
use crate::types::{EventDefId, MeetId, ResultStatus, Stroke};

/// A structural problem with a relay entry.
///
/// Returned as a value, never panicked; the caller decides whether to block
/// submission. Checks run in a fixed order and stop at the first failure,
/// so exactly one violation surfaces even when several apply. That ordering
/// is part of the contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayViolation {
    #[error("Selected event is not a relay")]
    NotARelay,

    #[error("Relay must have 4 legs")]
    WrongLegCount,

    #[error("Each relay leg must have a unique swimmer")]
    DuplicateSwimmer,

    #[error("Invalid medley relay order")]
    InvalidMedleyOrder,
}

/// Why a lead-off leg could not be recorded as an individual result.
///
/// Raised by [`build_lead_off_result`] and downgraded to a warning by the
/// write orchestration; it never aborts the enclosing transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeadOffError {
    #[error("Relay missing lead-off leg")]
    MissingLeadOffLeg,

    #[error("No matching individual event for lead-off leg")]
    NoMatchingEvent,
}

/// The stroke swum at a given leg of a medley relay: Back, Breast, Fly, Free.
#[must_use]
pub const fn medley_stroke_for_order(order: LegOrder) -> Stroke {
    match order {
        LegOrder::Lead => Stroke::Back,
        LegOrder::Second => Stroke::Breast,
        LegOrder::Third => Stroke::Fly,
        LegOrder::Anchor => Stroke::Free,
    }
}

/// Validates the structure of a relay entry.
///
/// Checks, in order: the event is a relay, there are exactly 4 legs, the
/// swimmers are pairwise distinct, and (for IM events) every leg order maps
/// to a canonical medley stroke. Short-circuits on the first failure.
pub fn validate_relay(event: &EventDef, legs: &[RelayLeg]) -> Result<(), RelayViolation> {
    if !event.is_relay {
        return Err(RelayViolation::NotARelay);
    }

    if legs.len() != 4 {
        return Err(RelayViolation::WrongLegCount);
    }

    let swimmers: HashSet<_> = legs.iter().map(|leg| &leg.swimmer_id).collect();
    if swimmers.len() != 4 {
        return Err(RelayViolation::DuplicateSwimmer);
    }

    if event.stroke == Stroke::Im {
        // LegOrder is closed over 1..=4, so a single order always maps to a
        // medley stroke. What can still go wrong is a repeated order, which
        // would leave one medley stroke unswum.
        let orders: HashSet<_> = legs.iter().map(|leg| leg.order).collect();
        if orders.len() != 4 {
            return Err(RelayViolation::InvalidMedleyOrder);
        }
    }

    Ok(())
}

/// Derives an equivalent individual result from a relay's lead-off leg.
///
/// The implied distance is a quarter of the relay distance; the implied
/// stroke is Back for IM relays (medley lead-off), otherwise the event
/// stroke. `resolve_individual_event` supplies the matching non-relay event
/// definition ID. Pure: persistence of the derived result is the caller's
/// responsibility.
pub fn build_lead_off_result(
    relay: &RelayResult,
    event: &EventDef,
    meet_id: &MeetId,
    status: ResultStatus,
    resolve_individual_event: impl Fn(u32, Stroke) -> Option<EventDefId>,
) -> Result<IndividualResult, LeadOffError> {
    let lead = relay
        .legs
        .iter()
        .find(|leg| leg.order == LegOrder::Lead)
        .ok_or(LeadOffError::MissingLeadOffLeg)?;

    let leg_distance = event.distance_yards / 4;
    let leg_stroke = if event.stroke == Stroke::Im {
        medley_stroke_for_order(LegOrder::Lead)
    } else {
        event.stroke
    };
    let event_def_id =
        resolve_individual_event(leg_distance, leg_stroke).ok_or(LeadOffError::NoMatchingEvent)?;

    let mut result = IndividualResult::new(
        lead.swimmer_id.clone(),
        meet_id.clone(),
        event_def_id,
        lead.split_ms,
        status,
    );
    result.splits_ms = vec![lead.split_ms];
    result.notes = Some(format!("Lead-off from {}", event.label));
    tracing::debug!(
        relay = %relay.id,
        event = %result.event_def_id,
        swimmer = %result.swimmer_id,
        "derived lead-off result"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SwimmerId, TimeMs};

    fn ms(value: i64) -> TimeMs {
        TimeMs::new(value).unwrap()
    }

    fn leg(order: LegOrder, swimmer: &str, split: i64) -> RelayLeg {
        RelayLeg {
            order,
            swimmer_id: SwimmerId::new(swimmer).unwrap(),
            split_ms: ms(split),
        }
    }

    fn relay_event(stroke: Stroke) -> EventDef {
        EventDef {
            id: EventDefId::new("event-200-relay").unwrap(),
            distance_yards: 200,
            stroke,
            is_relay: true,
            label: match stroke {
                Stroke::Im => "200 Medley Relay".to_string(),
                _ => "200 Free Relay".to_string(),
            },
        }
    }

    fn four_legs() -> Vec<RelayLeg> {
        vec![
            leg(LegOrder::Lead, "s1", 25_000),
            leg(LegOrder::Second, "s2", 26_000),
            leg(LegOrder::Third, "s3", 26_500),
            leg(LegOrder::Anchor, "s4", 24_800),
        ]
    }

    #[test]
    fn accepts_four_distinct_non_im_legs() {
        assert_eq!(validate_relay(&relay_event(Stroke::Free), &four_legs()), Ok(()));
    }

    #[test]
    fn rejects_non_relay_event_first() {
        let mut event = relay_event(Stroke::Free);
        event.is_relay = false;
        // Also give it a wrong leg count: the "not a relay" check wins.
        assert_eq!(
            validate_relay(&event, &four_legs()[..2]),
            Err(RelayViolation::NotARelay)
        );
    }

    #[test]
    fn rejects_wrong_leg_count() {
        let legs = &four_legs()[..3];
        assert_eq!(
            validate_relay(&relay_event(Stroke::Free), legs),
            Err(RelayViolation::WrongLegCount)
        );
    }

    #[test]
    fn rejects_duplicate_swimmer() {
        let mut legs = four_legs();
        legs[3].swimmer_id = legs[0].swimmer_id.clone();
        assert_eq!(
            validate_relay(&relay_event(Stroke::Free), &legs),
            Err(RelayViolation::DuplicateSwimmer)
        );
    }

    #[test]
    fn duplicate_check_precedes_medley_check() {
        let mut legs = four_legs();
        legs[1].swimmer_id = legs[0].swimmer_id.clone();
        assert_eq!(
            validate_relay(&relay_event(Stroke::Im), &legs),
            Err(RelayViolation::DuplicateSwimmer)
        );
    }

    #[test]
    fn rejects_repeated_medley_order() {
        let mut legs = four_legs();
        legs[2] = leg(LegOrder::Second, "s3", 26_500);
        assert_eq!(
            validate_relay(&relay_event(Stroke::Im), &legs),
            Err(RelayViolation::InvalidMedleyOrder)
        );
    }

    #[test]
    fn accepts_valid_medley_relay() {
        assert_eq!(validate_relay(&relay_event(Stroke::Im), &four_legs()), Ok(()));
    }

    #[test]
    fn medley_order_is_back_breast_fly_free() {
        assert_eq!(medley_stroke_for_order(LegOrder::Lead), Stroke::Back);
        assert_eq!(medley_stroke_for_order(LegOrder::Second), Stroke::Breast);
        assert_eq!(medley_stroke_for_order(LegOrder::Third), Stroke::Fly);
        assert_eq!(medley_stroke_for_order(LegOrder::Anchor), Stroke::Free);
    }

    fn free_relay_result(legs: Vec<RelayLeg>) -> RelayResult {
        RelayResult::new(
            MeetId::new("m1").unwrap(),
            EventDefId::new("event-200-relay").unwrap(),
            "A",
            ms(102_300),
            ResultStatus::Ok,
            legs,
        )
    }

    #[test]
    fn derives_lead_off_from_free_relay() {
        let relay = free_relay_result(four_legs());
        let event = relay_event(Stroke::Free);
        let meet = MeetId::new("m1").unwrap();

        let result = build_lead_off_result(&relay, &event, &meet, ResultStatus::Ok, |dist, stroke| {
            (dist == 50 && stroke == Stroke::Free)
                .then(|| EventDefId::new("event-50-free").unwrap())
        })
        .unwrap();

        assert_eq!(result.time_ms, ms(25_000));
        assert_eq!(result.splits_ms, vec![ms(25_000)]);
        assert_eq!(result.event_def_id.as_str(), "event-50-free");
        assert_eq!(result.swimmer_id.as_str(), "s1");
        assert_eq!(result.notes.as_deref(), Some("Lead-off from 200 Free Relay"));
    }

    #[test]
    fn medley_lead_off_resolves_backstroke() {
        let relay = free_relay_result(four_legs());
        let event = relay_event(Stroke::Im);
        let meet = MeetId::new("m1").unwrap();

        let asked = std::cell::RefCell::new(Vec::new());
        let result = build_lead_off_result(&relay, &event, &meet, ResultStatus::Ok, |dist, stroke| {
            asked.borrow_mut().push((dist, stroke));
            Some(EventDefId::new("event-50-back").unwrap())
        });
        assert!(result.is_ok());
        assert_eq!(asked.into_inner(), vec![(50, Stroke::Back)]);
    }

    #[test]
    fn fails_without_lead_off_leg() {
        let legs = vec![
            leg(LegOrder::Second, "s2", 26_000),
            leg(LegOrder::Third, "s3", 26_500),
            leg(LegOrder::Anchor, "s4", 24_800),
        ];
        let relay = free_relay_result(legs);
        let event = relay_event(Stroke::Free);
        let meet = MeetId::new("m1").unwrap();

        let result = build_lead_off_result(&relay, &event, &meet, ResultStatus::Ok, |_, _| {
            Some(EventDefId::new("event-50-free").unwrap())
        });
        assert_eq!(result, Err(LeadOffError::MissingLeadOffLeg));
    }

    #[test]
    fn fails_when_no_individual_event_matches() {
        let relay = free_relay_result(four_legs());
        let event = relay_event(Stroke::Free);
        let meet = MeetId::new("m1").unwrap();

        let result = build_lead_off_result(&relay, &event, &meet, ResultStatus::Ok, |_, _| None);
        assert_eq!(result, Err(LeadOffError::NoMatchingEvent));
    }
}
