//! Core domain logic for the swim results tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Time codec: parsing entered times and formatting milliseconds
//! - Course conversion: empirical SCY/SCM/LCM factor table
//! - Best times: personal-best and season-best aggregation
//! - Relays: structural validation and lead-off leg derivation
//!
//! Everything here is pure and synchronous; persistence and the audited
//! write orchestration live in `st-db`.

pub mod audit;
pub mod best;
pub mod convert;
pub mod event_def;
pub mod record;
pub mod relay;
pub mod result;
pub mod roster;
pub mod settings;
pub mod timecode;
pub mod types;

pub use audit::{AuditAction, AuditEntry, EntityType};
pub use best::{personal_best, season_best, season_best_active};
pub use convert::{Conversion, convert_for_display, convert_time_ms};
pub use event_def::EventDef;
pub use record::TeamRecord;
pub use relay::{
    LeadOffError, RelayViolation, build_lead_off_result, medley_stroke_for_order, validate_relay,
};
pub use result::{IndividualResult, LegOrder, RelayLeg, RelayResult};
pub use roster::{Meet, Season, Swimmer};
pub use settings::{AppConfig, Setting, SettingKey};
pub use timecode::{ParseTimeError, format_ms, parse_time_str};
pub use types::{
    AuditId, Course, EventDefId, MeetId, RecordId, RelayId, ResultId, ResultStatus, SeasonId,
    Stroke, SwimmerId, TimeMs, ValidationError, now_ms,
};
