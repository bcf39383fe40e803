//! Pattern-based parsing of textual timestamp literals.
//!
//! The grammar is `YYYY-M-D[ H:Mi[:S[.fraction]]][ zone]`: a 4-digit year,
//! 1–2-digit month/day/time fields, an optional fraction of one or more
//! digits, and an optional trailing zone token. A single anchored regex
//! with named groups matches the whole literal; missing time fields
//! default to zero, and the fraction's digit count (not its numeric
//! value) is the parsed precision.
//!
//! The parse entry points accept only zone-naive literals; the zone is a
//! parameter, never discovered in the string. The declared precision
//! routes between the two encodings: 0–6 parses into the compact tier
//! (millis up to three fraction digits, micros for four to six), 7–12
//! into the extended tier.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use snafu::{OptionExt, ResultExt, ensure};

use crate::encoding::{self, TimestampValue};
use crate::precision::{
    self, MAX_COMPACT_PRECISION, MAX_MILLIS_PRECISION, MAX_PRECISION, MICROSECONDS_PER_SECOND,
    MILLISECONDS_PER_SECOND,
};
use crate::text::error::{self, ParseError};
use crate::zone::ZoneContext;

static DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<year>\d{4})-(?P<month>\d{1,2})-(?P<day>\d{1,2})(?: (?P<hour>\d{1,2}):(?P<minute>\d{1,2})(?::(?P<second>\d{1,2})(?:\.(?P<fraction>\d+))?)?)?\s*(?P<timezone>.+)?$",
    )
    .expect("datetime pattern is valid")
});

fn match_literal<'t>(value: &'t str) -> Result<Captures<'t>, ParseError> {
    DATETIME_PATTERN
        .captures(value)
        .context(error::MalformedSnafu { value })
}

/// Whether the literal carries a trailing zone token.
///
/// Errors on text that does not match the timestamp grammar at all.
pub fn timestamp_has_time_zone(value: &str) -> Result<bool, ParseError> {
    let captures = match_literal(value)?;
    Ok(captures.name("timezone").is_some())
}

/// The precision implied by the literal's fraction: 0 when no fraction is
/// present, otherwise the fraction's literal digit count (`"1.50"` has
/// precision 2, not 1).
pub fn extract_timestamp_precision(value: &str) -> Result<u32, ParseError> {
    let captures = match_literal(value)?;
    Ok(captures
        .name("fraction")
        .map_or(0, |fraction| fraction.as_str().len() as u32))
}

/// Parse a zone-naive timestamp literal, resolving the civil time in UTC.
///
/// Declared precisions 0–6 produce a [`TimestampValue::Compact`] value,
/// 7–12 a [`TimestampValue::Extended`] one.
pub fn parse_timestamp(precision: u32, value: &str) -> Result<TimestampValue, ParseError> {
    if precision <= MAX_COMPACT_PRECISION {
        parse_compact(value, &ZoneContext::Utc)
    } else {
        parse_extended(value, &ZoneContext::Utc)
    }
}

/// Parse a zone-naive timestamp literal, resolving the civil time in the
/// session's zone (the legacy path).
///
/// Daylight-saving gaps are errors; folds resolve deterministically to
/// the zone's first-listed offset.
pub fn parse_legacy_timestamp(
    precision: u32,
    zone: &ZoneContext,
    value: &str,
) -> Result<TimestampValue, ParseError> {
    if precision <= MAX_COMPACT_PRECISION {
        parse_compact(value, zone)
    } else {
        parse_extended(value, zone)
    }
}

fn parse_field(captures: &Captures<'_>, name: &str, value: &str) -> Result<u32, ParseError> {
    match captures.name(name) {
        Some(matched) => matched
            .as_str()
            .parse()
            .ok()
            .context(error::MalformedSnafu { value }),
        None => Ok(0),
    }
}

fn resolve_epoch_second(
    captures: &Captures<'_>,
    zone: &ZoneContext,
    value: &str,
) -> Result<i64, ParseError> {
    let year = parse_field(captures, "year", value)?;
    let month = parse_field(captures, "month", value)?;
    let day = parse_field(captures, "day", value)?;
    let hour = parse_field(captures, "hour", value)?;
    let minute = parse_field(captures, "minute", value)?;
    let second = parse_field(captures, "second", value)?;

    // The pattern only constrains digit counts; invalid civil components
    // (month 13, hour 25, ...) surface here.
    let local = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .context(error::MalformedSnafu { value })?;

    zone.to_epoch_second(local)
        .context(error::CivilTimeSnafu { value })
}

fn parse_fraction(captures: &Captures<'_>, value: &str) -> Result<(u32, i64), ParseError> {
    match captures.name("fraction") {
        None => Ok((0, 0)),
        Some(fraction) => {
            let digits = fraction.as_str();
            let parsed = digits
                .parse::<i64>()
                .ok()
                .context(error::MalformedSnafu { value })?;
            Ok((digits.len() as u32, parsed))
        }
    }
}

fn parse_compact(value: &str, zone: &ZoneContext) -> Result<TimestampValue, ParseError> {
    let captures = match_literal(value)?;
    ensure!(
        captures.name("timezone").is_none(),
        error::UnexpectedZoneSnafu { value }
    );

    let epoch_second = resolve_epoch_second(&captures, zone, value)?;
    let (precision, fraction_value) = parse_fraction(&captures, value)?;

    let encoded = if precision <= MAX_MILLIS_PRECISION {
        let millis = precision::rescale(fraction_value, precision, MAX_MILLIS_PRECISION)
            .context(error::RescaleSnafu { value, precision })?;
        epoch_second
            .checked_mul(MILLISECONDS_PER_SECOND)
            .and_then(|scaled| scaled.checked_add(millis))
            .context(error::OverflowSnafu { value })?
    } else if precision <= MAX_COMPACT_PRECISION {
        let micros = precision::rescale(fraction_value, precision, MAX_COMPACT_PRECISION)
            .context(error::RescaleSnafu { value, precision })?;
        epoch_second
            .checked_mul(MICROSECONDS_PER_SECOND)
            .and_then(|scaled| scaled.checked_add(micros))
            .context(error::OverflowSnafu { value })?
    } else {
        return error::NotCompactSnafu { value }.fail();
    };

    Ok(TimestampValue::Compact(encoded))
}

fn parse_extended(value: &str, zone: &ZoneContext) -> Result<TimestampValue, ParseError> {
    let captures = match_literal(value)?;
    ensure!(
        captures.name("timezone").is_none(),
        error::UnexpectedZoneSnafu { value }
    );

    let digits = match captures.name("fraction") {
        Some(fraction) if fraction.as_str().len() > MAX_COMPACT_PRECISION as usize => {
            fraction.as_str()
        }
        _ => return error::NotExtendedSnafu { value }.fail(),
    };

    let precision = digits.len() as u32;
    let epoch_second = resolve_epoch_second(&captures, zone, value)?;
    let fraction_value = digits
        .parse::<i64>()
        .ok()
        .context(error::MalformedSnafu { value })?;
    let pico_fraction = precision::rescale(fraction_value, precision, MAX_PRECISION)
        .context(error::RescaleSnafu { value, precision })?;

    let extended = encoding::extended_from_epoch(epoch_second, pico_fraction)
        .context(error::EncodeSnafu { value })?;
    Ok(TimestampValue::Extended(extended))
}
