//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A time value was negative.
    #[error("time must be non-negative milliseconds, got {value}")]
    NegativeTime { value: i64 },

    /// Invalid course value.
    #[error("invalid course: {value}")]
    InvalidCourse { value: String },

    /// Invalid stroke value.
    #[error("invalid stroke: {value}")]
    InvalidStroke { value: String },

    /// Invalid result status value.
    #[error("invalid result status: {value}")]
    InvalidStatus { value: String },

    /// Relay leg order outside 1..=4.
    #[error("relay leg order must be 1 through 4, got {value}")]
    InvalidLegOrder { value: u8 },

    /// Invalid audit entity type value.
    #[error("invalid audit entity type: {value}")]
    InvalidEntityType { value: String },
}

/// A non-negative duration in integer milliseconds.
///
/// The canonical unit for every swim time in the system. Times are never
/// represented as floating-point seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMs(i64);

impl TimeMs {
    /// Zero milliseconds.
    pub const ZERO: Self = Self(0);

    /// Creates a time value after validation.
    ///
    /// Returns an error if `value` is negative.
    pub const fn new(value: i64) -> Result<Self, ValidationError> {
        if value < 0 {
            return Err(ValidationError::NegativeTime { value });
        }
        Ok(Self(value))
    }

    /// Returns the inner millisecond count.
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TimeMs {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeMs> for i64 {
    fn from(time: TimeMs) -> Self {
        time.0
    }
}

impl Serialize for TimeMs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeMs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Pool configuration a meet is swum in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Course {
    /// Short course yards (25 yd pool).
    Scy,
    /// Short course meters (25 m pool).
    Scm,
    /// Long course meters (50 m pool).
    Lcm,
}

impl Course {
    /// All courses, in display order.
    pub const ALL: [Self; 3] = [Self::Scy, Self::Scm, Self::Lcm];

    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scy => "SCY",
            Self::Scm => "SCM",
            Self::Lcm => "LCM",
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Course {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCY" => Ok(Self::Scy),
            "SCM" => Ok(Self::Scm),
            "LCM" => Ok(Self::Lcm),
            _ => Err(ValidationError::InvalidCourse {
                value: s.to_string(),
            }),
        }
    }
}

/// Swim stroke, including individual medley as its own event stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stroke {
    Free,
    Back,
    Breast,
    Fly,
    #[serde(rename = "IM")]
    Im,
}

impl Stroke {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Back => "Back",
            Self::Breast => "Breast",
            Self::Fly => "Fly",
            Self::Im => "IM",
        }
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stroke {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Free" => Ok(Self::Free),
            "Back" => Ok(Self::Back),
            "Breast" => Ok(Self::Breast),
            "Fly" => Ok(Self::Fly),
            "IM" => Ok(Self::Im),
            _ => Err(ValidationError::InvalidStroke {
                value: s.to_string(),
            }),
        }
    }
}

/// Outcome classification of a swim.
///
/// Only `Ok` results count toward personal and season bests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "DQ")]
    Dq,
    #[serde(rename = "DNS")]
    Dns,
    Exhibition,
}

impl ResultStatus {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Dq => "DQ",
            Self::Dns => "DNS",
            Self::Exhibition => "Exhibition",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResultStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Self::Ok),
            "DQ" => Ok(Self::Dq),
            "DNS" => Ok(Self::Dns),
            "Exhibition" => Ok(Self::Exhibition),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// The current time truncated to millisecond precision.
///
/// Entity timestamps are stored at millisecond precision, so they are
/// created at that precision too; a value read back compares equal to the
/// value written.
#[must_use]
pub fn now_ms() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated swimmer identifier.
    SwimmerId, "swimmer ID"
);

define_string_id!(
    /// A validated season identifier.
    SeasonId, "season ID"
);

define_string_id!(
    /// A validated meet identifier.
    MeetId, "meet ID"
);

define_string_id!(
    /// A validated event definition identifier.
    ///
    /// Event definitions are immutable once referenced by a result, so an
    /// `EventDefId` held by a result stays resolvable for its lifetime.
    EventDefId, "event definition ID"
);

define_string_id!(
    /// A validated individual result identifier.
    ResultId, "result ID"
);

define_string_id!(
    /// A validated relay result identifier.
    RelayId, "relay ID"
);

define_string_id!(
    /// A validated team record identifier.
    RecordId, "record ID"
);

define_string_id!(
    /// A validated audit log entry identifier.
    AuditId, "audit entry ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_ms_rejects_negative() {
        assert!(TimeMs::new(-1).is_err());
        assert_eq!(TimeMs::new(0).unwrap(), TimeMs::ZERO);
        assert_eq!(TimeMs::new(59_830).unwrap().millis(), 59_830);
    }

    #[test]
    fn time_ms_orders_by_millis() {
        let fast = TimeMs::new(60_000).unwrap();
        let slow = TimeMs::new(61_000).unwrap();
        assert!(fast < slow);
    }

    #[test]
    fn time_ms_serde_roundtrip() {
        let time = TimeMs::new(62_123).unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "62123");
        let parsed: TimeMs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, time);
    }

    #[test]
    fn time_ms_serde_rejects_negative() {
        let result: Result<TimeMs, _> = serde_json::from_str("-5");
        assert!(result.is_err());
    }

    #[test]
    fn swimmer_id_rejects_empty() {
        assert!(SwimmerId::new("").is_err());
        assert!(SwimmerId::new("swimmer-1").is_ok());
    }

    #[test]
    fn event_def_id_serde_roundtrip() {
        let id = EventDefId::new("event-50-free").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"event-50-free\"");
        let parsed: EventDefId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn course_from_str() {
        assert_eq!("SCY".parse::<Course>().unwrap(), Course::Scy);
        assert_eq!("LCM".parse::<Course>().unwrap(), Course::Lcm);
        assert!("scy".parse::<Course>().is_err());
    }

    #[test]
    fn course_serde_uses_storage_spelling() {
        let json = serde_json::to_string(&Course::Scm).unwrap();
        assert_eq!(json, "\"SCM\"");
        let parsed: Course = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Course::Scm);
    }

    #[test]
    fn stroke_round_trips_through_str() {
        for stroke in [
            Stroke::Free,
            Stroke::Back,
            Stroke::Breast,
            Stroke::Fly,
            Stroke::Im,
        ] {
            assert_eq!(stroke.as_str().parse::<Stroke>().unwrap(), stroke);
        }
        assert!("Medley".parse::<Stroke>().is_err());
    }

    #[test]
    fn status_serde_uses_storage_spelling() {
        assert_eq!(serde_json::to_string(&ResultStatus::Ok).unwrap(), "\"OK\"");
        assert_eq!(
            serde_json::to_string(&ResultStatus::Exhibition).unwrap(),
            "\"Exhibition\""
        );
        let parsed: ResultStatus = serde_json::from_str("\"DQ\"").unwrap();
        assert_eq!(parsed, ResultStatus::Dq);
    }
}
