//! Typed application settings.
//!
//! Each known setting name is a closed enum variant with its own value
//! type, and the resolved values travel as an explicit [`AppConfig`]
//! snapshot instead of ambient global state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SeasonId;

/// The closed set of known setting names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    TeamName,
    CourseConversions,
    ActiveSeasonId,
}

impl SettingKey {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TeamName => "teamName",
            Self::CourseConversions => "courseConversions",
            Self::ActiveSeasonId => "activeSeasonId",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SettingKey {
    type Err = UnknownSettingKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teamName" => Ok(Self::TeamName),
            "courseConversions" => Ok(Self::CourseConversions),
            "activeSeasonId" => Ok(Self::ActiveSeasonId),
            _ => Err(UnknownSettingKey {
                key: s.to_string(),
            }),
        }
    }
}

/// A setting key that is not part of the closed set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown setting key: {key}")]
pub struct UnknownSettingKey {
    pub key: String,
}

/// A typed setting value, tagged by its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum Setting {
    TeamName(String),
    CourseConversions(bool),
    ActiveSeasonId(SeasonId),
}

impl Setting {
    /// The key this setting stores under.
    #[must_use]
    pub const fn key(&self) -> SettingKey {
        match self {
            Self::TeamName(_) => SettingKey::TeamName,
            Self::CourseConversions(_) => SettingKey::CourseConversions,
            Self::ActiveSeasonId(_) => SettingKey::ActiveSeasonId,
        }
    }

    /// Reconstructs a setting from a stored key and JSON value.
    pub fn from_stored(
        key: SettingKey,
        value: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        match key {
            SettingKey::TeamName => {
                serde_json::from_value(value.clone()).map(Self::TeamName)
            }
            SettingKey::CourseConversions => {
                serde_json::from_value(value.clone()).map(Self::CourseConversions)
            }
            SettingKey::ActiveSeasonId => {
                serde_json::from_value(value.clone()).map(Self::ActiveSeasonId)
            }
        }
    }

    /// The JSON value stored for this setting.
    ///
    /// Domain values serialize infallibly.
    #[must_use]
    pub fn to_stored(&self) -> serde_json::Value {
        match self {
            Self::TeamName(name) => serde_json::Value::String(name.clone()),
            Self::CourseConversions(enabled) => serde_json::Value::Bool(*enabled),
            Self::ActiveSeasonId(season) => serde_json::Value::String(season.to_string()),
        }
    }
}

/// A point-in-time snapshot of resolved settings.
///
/// Threaded explicitly into aggregation and conversion call sites; nothing
/// in the core reads settings ambiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Display name for the team.
    pub team_name: Option<String>,

    /// Whether cross-course conversion is offered in displays.
    pub conversions_enabled: bool,

    /// The season that season bests are computed against.
    pub active_season_id: Option<SeasonId>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            team_name: None,
            // Conversions are offered unless explicitly disabled.
            conversions_enabled: true,
            active_season_id: None,
        }
    }
}

impl AppConfig {
    /// Folds a list of settings into a snapshot.
    ///
    /// Later entries win if a key repeats.
    #[must_use]
    pub fn from_settings(settings: &[Setting]) -> Self {
        let mut config = Self::default();
        for setting in settings {
            match setting {
                Setting::TeamName(name) => config.team_name = Some(name.clone()),
                Setting::CourseConversions(enabled) => config.conversions_enabled = *enabled,
                Setting::ActiveSeasonId(season) => {
                    config.active_season_id = Some(season.clone());
                }
            }
        }
        config
    }
}
