//! Cross-course time conversion.
//!
//! Factors are empirically tuned team data, not a physics model. The table
//! is deliberately asymmetric (off-diagonal entries are not exact inverses),
//! so a round trip such as SCY→LCM→SCY does not reproduce the input.

use crate::event_def::EventDef;
use crate::settings::AppConfig;
use crate::types::{Course, TimeMs};

/// A converted time plus a display note describing what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub time: TimeMs,
    pub note: String,
}

/// Empirical conversion factor from one course to another.
///
/// Diagonal entries are 1.0. Treat the off-diagonal values as opaque domain
/// data; do not normalize or invert them.
#[must_use]
pub fn conversion_factor(from: Course, to: Course) -> f64 {
    match (from, to) {
        (Course::Scy, Course::Scm) => 1.11,
        (Course::Scy, Course::Lcm) => 1.11 * 1.02,
        (Course::Scm, Course::Scy) => 0.9,
        (Course::Scm, Course::Lcm) => 1.02,
        (Course::Lcm, Course::Scy) => 0.88,
        (Course::Lcm, Course::Scm) => 0.98,
        _ => 1.0,
    }
}

/// Converts a time between courses, rounding to the nearest millisecond.
///
/// Identity conversions return the input unchanged with a "no conversion"
/// note; otherwise the note records the event label, direction, and factor.
#[must_use]
pub fn convert_time_ms(time: TimeMs, from: Course, to: Course, event: &EventDef) -> Conversion {
    if from == to {
        return Conversion {
            time,
            note: "No conversion needed".to_string(),
        };
    }

    let factor = conversion_factor(from, to);
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        reason = "swim times are far below 2^52 ms, round-trip through f64 is exact enough"
    )]
    let converted = (time.millis() as f64 * factor).round() as i64;
    // Factors are positive, so the product of a valid time stays valid.
    let time = TimeMs::new(converted).unwrap_or(TimeMs::ZERO);
    Conversion {
        time,
        note: format!("{} converted {from}→{to} x{factor:.3}", event.label),
    }
}

/// Conversion for display, honoring the conversions toggle.
///
/// Returns `None` when conversions are disabled in the supplied
/// configuration snapshot; identity conversions are always allowed.
#[must_use]
pub fn convert_for_display(
    time: TimeMs,
    from: Course,
    to: Course,
    event: &EventDef,
    config: &AppConfig,
) -> Option<Conversion> {
    if from != to && !config.conversions_enabled {
        return None;
    }
    Some(convert_time_ms(time, from, to, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventDefId, Stroke};

    fn free_100() -> EventDef {
        EventDef {
            id: EventDefId::new("event-100-free").unwrap(),
            distance_yards: 100,
            stroke: Stroke::Free,
            is_relay: false,
            label: "100 Free".to_string(),
        }
    }

    fn ms(value: i64) -> TimeMs {
        TimeMs::new(value).unwrap()
    }

    #[test]
    fn identity_conversion_returns_input() {
        let event = free_100();
        for course in Course::ALL {
            let conversion = convert_time_ms(ms(60_000), course, course, &event);
            assert_eq!(conversion.time, ms(60_000));
            assert_eq!(conversion.note, "No conversion needed");
        }
    }

    #[test]
    fn scy_to_scm_applies_factor() {
        let conversion = convert_time_ms(ms(60_000), Course::Scy, Course::Scm, &free_100());
        assert_eq!(conversion.time, ms(66_600));
        assert_eq!(conversion.note, "100 Free converted SCY→SCM x1.110");
    }

    #[test]
    fn scy_to_lcm_uses_compound_factor() {
        let conversion = convert_time_ms(ms(60_000), Course::Scy, Course::Lcm, &free_100());
        // 1.11 * 1.02 = 1.1322
        assert_eq!(conversion.time, ms(67_932));
        assert_eq!(conversion.note, "100 Free converted SCY→LCM x1.132");
    }

    #[test]
    fn rounds_to_nearest_millisecond() {
        // 1001 * 0.9 = 900.9 rounds to 901.
        let conversion = convert_time_ms(ms(1_001), Course::Scm, Course::Scy, &free_100());
        assert_eq!(conversion.time, ms(901));
    }

    #[test]
    fn display_conversion_honors_toggle() {
        let event = free_100();
        let mut config = AppConfig::default();
        assert!(convert_for_display(ms(60_000), Course::Scy, Course::Scm, &event, &config).is_some());

        config.conversions_enabled = false;
        assert!(convert_for_display(ms(60_000), Course::Scy, Course::Scm, &event, &config).is_none());
        // Identity display is unaffected by the toggle.
        assert!(convert_for_display(ms(60_000), Course::Scy, Course::Scy, &event, &config).is_some());
    }

    #[test]
    fn round_trip_is_not_identity() {
        let event = free_100();
        let out = convert_time_ms(ms(60_000), Course::Scy, Course::Lcm, &event);
        let back = convert_time_ms(out.time, Course::Lcm, Course::Scy, &event);
        assert_ne!(back.time, ms(60_000));
    }
}
