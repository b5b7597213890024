//! Seasons, swimmers, and meets - the roster entities results refer to.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Course, MeetId, SeasonId, SwimmerId};

/// A competition season.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: SeasonId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Whether this is the currently active season.
    pub active: bool,
}

/// A swimmer on the team roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Swimmer {
    pub id: SwimmerId,
    pub first_name: String,
    pub last_name: String,

    /// Graduation year, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad_year: Option<u16>,

    /// Training group label such as "Varsity" or "JV".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    pub active: bool,
}

impl Swimmer {
    /// "Last, First" display name.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// A meet within a season, swum in one course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meet {
    pub id: MeetId,
    pub name: String,
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub course: Course,
    pub season_id: SeasonId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swimmer_display_name() {
        let swimmer = Swimmer {
            id: SwimmerId::new("s1").unwrap(),
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            grad_year: Some(2027),
            group: Some("Varsity".to_string()),
            active: true,
        };
        assert_eq!(swimmer.display_name(), "Reyes, Dana");
    }

    #[test]
    fn meet_serde_roundtrip() {
        let meet = Meet {
            id: MeetId::new("m1").unwrap(),
            name: "Conference Championships".to_string(),
            date: "2026-02-14T00:00:00Z".parse().unwrap(),
            location: Some("Aquatic Center".to_string()),
            course: Course::Scy,
            season_id: SeasonId::new("season-2026").unwrap(),
        };
        let json = serde_json::to_string(&meet).unwrap();
        assert!(json.contains("\"course\":\"SCY\""));
        let parsed: Meet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meet);
    }
}
