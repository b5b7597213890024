//! Parsing and formatting of swim times.
//!
//! All times are integer milliseconds ([`TimeMs`]). Text entry accepts four
//! grammars, tried in precedence order:
//!
//! 1. `minutes:seconds.fraction` (seconds exactly 2 digits, fraction 1-3)
//! 2. `minutes:seconds` (seconds exactly 2 digits)
//! 3. `seconds.fraction` (seconds 1-2 digits, fraction 1-3)
//! 4. plain integer seconds
//!
//! The fraction field is right-padded with zeros to 3 digits before being
//! read as milliseconds, so 2 digits are hundredths and 3 digits are
//! milliseconds as written. Nothing else matches; there is no fuzzy
//! recovery.

use thiserror::Error;

use crate::types::TimeMs;

const MS_PER_SECOND: i64 = 1000;

/// Tolerance for comparing a sum of splits against a total time.
pub const SPLIT_TOLERANCE_MS: i64 = 150;

/// A time string that could not be parsed.
///
/// Unrecoverable for the given input; callers should surface the message and
/// re-prompt. Never retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    /// The input was empty after trimming.
    #[error("empty time string")]
    Empty,

    /// The input matched none of the accepted grammars.
    #[error("unsupported time format: {input}")]
    Unsupported { input: String },
}

/// Parses a time entry string into milliseconds.
///
/// Surrounding whitespace is trimmed first. See the [module docs](self) for
/// the accepted grammars.
///
/// ```
/// use st_core::timecode::parse_time_str;
///
/// assert_eq!(parse_time_str("59.83").unwrap().millis(), 59_830);
/// assert_eq!(parse_time_str("2:00").unwrap().millis(), 120_000);
/// assert!(parse_time_str("1:2").is_err());
/// ```
pub fn parse_time_str(input: &str) -> Result<TimeMs, ParseTimeError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(ParseTimeError::Empty);
    }

    let unsupported = || ParseTimeError::Unsupported {
        input: input.to_string(),
    };

    if let Some((minutes_part, rest)) = value.split_once(':') {
        // Grammars 1 and 2: minutes, a 2-digit seconds field, optional fraction.
        let minutes = parse_digits(minutes_part).ok_or_else(unsupported)?;
        let (seconds_part, fraction_part) = match rest.split_once('.') {
            Some((seconds, fraction)) => (seconds, Some(fraction)),
            None => (rest, None),
        };
        if seconds_part.len() != 2 {
            return Err(unsupported());
        }
        let seconds = parse_digits(seconds_part).ok_or_else(unsupported)?;
        let fraction = match fraction_part {
            Some(fraction) => parse_fraction(fraction).ok_or_else(unsupported)?,
            None => 0,
        };
        let total = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .and_then(|s| s.checked_mul(MS_PER_SECOND))
            .and_then(|t| t.checked_add(fraction))
            .ok_or_else(unsupported)?;
        return make_time(total, input);
    }

    if let Some((seconds_part, fraction_part)) = value.split_once('.') {
        // Grammar 3: 1-2 digit seconds with a fraction.
        if seconds_part.is_empty() || seconds_part.len() > 2 {
            return Err(unsupported());
        }
        let seconds = parse_digits(seconds_part).ok_or_else(unsupported)?;
        let fraction = parse_fraction(fraction_part).ok_or_else(unsupported)?;
        return make_time(seconds * MS_PER_SECOND + fraction, input);
    }

    // Grammar 4: plain integer seconds.
    let seconds = parse_digits(value).ok_or_else(unsupported)?;
    let total = seconds.checked_mul(MS_PER_SECOND).ok_or_else(unsupported)?;
    make_time(total, input)
}

/// Formats milliseconds for display.
///
/// With `show_hundredths` the sub-second remainder is divided by 10 and
/// rounded half-up to hundredths; otherwise the raw millisecond remainder is
/// shown. Times of a minute or more render as `minutes:SS.frac`.
///
/// A remainder that rounds up to a full second is rendered as a 3-digit
/// fraction (`59.100`) rather than carried into the seconds field. Display
/// behavior is frozen; do not "fix" without a correctness report.
#[must_use]
pub fn format_ms(time: TimeMs, show_hundredths: bool) -> String {
    let ms = time.millis();
    let total_seconds = ms / MS_PER_SECOND;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let remainder = ms % MS_PER_SECOND;

    let (precision, divisor): (usize, i64) = if show_hundredths { (2, 10) } else { (3, 1) };
    // Integer round-half-up of remainder / divisor.
    let rounded = (remainder + divisor / 2) / divisor;
    let fraction = format!("{rounded:0precision$}");

    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{fraction}")
    } else {
        format!("{seconds}.{fraction}")
    }
}

/// Sums a sequence of split times.
#[must_use]
pub fn sum_splits(splits: &[TimeMs]) -> i64 {
    splits.iter().map(|split| split.millis()).sum()
}

/// Whether two millisecond values agree within `tol_ms` (inclusive).
///
/// Used to sanity-check that entered splits add up to the total time.
#[must_use]
pub const fn almost_equal(a: i64, b: i64, tol_ms: i64) -> bool {
    (a - b).abs() <= tol_ms
}

/// Parses a run of ASCII digits, rejecting anything else.
fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses a 1-3 digit fraction field into milliseconds.
///
/// The field is right-padded with zeros to 3 digits, so `"1"` is 100 ms,
/// `"83"` is 830 ms, and `"123"` is 123 ms as written.
fn parse_fraction(s: &str) -> Option<i64> {
    if !(1..=3).contains(&s.len()) {
        return None;
    }
    let millis = parse_digits(s)?;
    Some(match s.len() {
        1 => millis * 100,
        2 => millis * 10,
        _ => millis,
    })
}

fn make_time(ms: i64, input: &str) -> Result<TimeMs, ParseTimeError> {
    TimeMs::new(ms).map_err(|_| ParseTimeError::Unsupported {
        input: input.to_string(),
    })
}
