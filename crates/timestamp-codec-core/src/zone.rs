//! Zone contexts and local-time offset resolution.
//!
//! Parsing and decoding need to turn a zone-naive civil date-time into an
//! absolute instant (and back). The zone itself is always supplied by the
//! caller; this module never loads, caches, or refreshes rule tables. For
//! named zones it queries the compiled-in IANA database through `chrono-tz`.
//!
//! Resolution semantics for named zones:
//!
//! - A unique local time maps to its single offset.
//! - A local time inside a daylight-saving gap (spring forward) has no
//!   valid offset and is an error.
//! - A local time inside a fold (fall back) has two valid offsets; the
//!   earlier-instant offset is listed first and picked deterministically.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use snafu::{OptionExt, Snafu};

/// Errors from zone lookup and civil-time resolution.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ZoneError {
    /// The zone name is neither `UTC`, a fixed offset, nor an IANA id.
    #[snafu(display("Unknown time zone: {name}"))]
    UnknownZone {
        /// The unrecognized zone name.
        name: String,
    },

    /// The local date-time falls inside a daylight-saving gap and does not
    /// exist in the zone.
    #[snafu(display("Invalid timestamp due to daylight savings transition: {local}"))]
    DaylightSavingGap {
        /// The nonexistent local date-time.
        local: NaiveDateTime,
    },
}

/// A caller-supplied time zone capability.
///
/// `Utc` and `Fixed` always resolve local times to exactly one offset; the
/// `Named` variant carries daylight-saving rules and may resolve to zero
/// (gap) or two (fold) offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneContext {
    /// Fixed UTC, the zone of the zone-naive conversion path.
    Utc,
    /// A fixed offset from UTC with no transition rules.
    Fixed(FixedOffset),
    /// An IANA-named zone with daylight-saving rules.
    Named(Tz),
}

impl ZoneContext {
    /// Parse a zone name: `UTC`/`Z`, a `±HH:MM` fixed offset, or an IANA id
    /// such as `America/New_York`.
    pub fn parse(name: &str) -> Result<Self, ZoneError> {
        if name.eq_ignore_ascii_case("utc") || name == "Z" {
            return Ok(ZoneContext::Utc);
        }
        if let Ok(offset) = FixedOffset::from_str(name) {
            return Ok(ZoneContext::Fixed(offset));
        }
        Tz::from_str(name)
            .ok()
            .map(ZoneContext::Named)
            .context(UnknownZoneSnafu { name })
    }

    /// All offsets under which `local` is a valid civil time in this zone.
    ///
    /// Returns an empty vector for a daylight-saving gap and two offsets
    /// (earlier instant first) for a fold.
    pub fn valid_offsets(&self, local: NaiveDateTime) -> Vec<FixedOffset> {
        match self {
            ZoneContext::Utc => vec![Utc.fix()],
            ZoneContext::Fixed(offset) => vec![*offset],
            ZoneContext::Named(tz) => match tz.offset_from_local_datetime(&local) {
                LocalResult::Single(offset) => vec![offset.fix()],
                LocalResult::Ambiguous(earliest, latest) => {
                    vec![earliest.fix(), latest.fix()]
                }
                LocalResult::None => Vec::new(),
            },
        }
    }

    /// Resolve a zone-naive civil date-time to an epoch second in this zone.
    ///
    /// Gaps are errors; folds resolve to the first-listed (earlier-instant)
    /// offset so the result is deterministic.
    pub fn to_epoch_second(&self, local: NaiveDateTime) -> Result<i64, ZoneError> {
        let offsets = self.valid_offsets(local);
        let Some(offset) = offsets.first() else {
            return DaylightSavingGapSnafu { local }.fail();
        };
        if offsets.len() > 1 {
            debug!("local time {local} is ambiguous in {self:?}; resolving with offset {offset}");
        }
        Ok(local.and_utc().timestamp() - i64::from(offset.local_minus_utc()))
    }

    /// Calendar view of an absolute instant in this zone.
    pub fn local_date_time(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            ZoneContext::Utc => instant.naive_utc(),
            ZoneContext::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            ZoneContext::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parse_recognizes_utc_aliases() {
        assert_eq!(ZoneContext::parse("UTC").unwrap(), ZoneContext::Utc);
        assert_eq!(ZoneContext::parse("utc").unwrap(), ZoneContext::Utc);
        assert_eq!(ZoneContext::parse("Z").unwrap(), ZoneContext::Utc);
    }

    #[test]
    fn parse_recognizes_fixed_offsets() {
        let zone = ZoneContext::parse("+05:30").unwrap();
        assert_eq!(
            zone,
            ZoneContext::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );

        let zone = ZoneContext::parse("-08:00").unwrap();
        assert_eq!(zone, ZoneContext::Fixed(FixedOffset::west_opt(8 * 3600).unwrap()));
    }

    #[test]
    fn parse_recognizes_iana_names() {
        let zone = ZoneContext::parse("America/New_York").unwrap();
        assert_eq!(zone, ZoneContext::Named(chrono_tz::America::New_York));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!(matches!(
            ZoneContext::parse("Not/A_Zone"),
            Err(ZoneError::UnknownZone { .. })
        ));
    }

    #[test]
    fn utc_and_fixed_zones_always_have_one_offset() {
        let when = local(2020, 6, 15, 10, 30, 0);
        assert_eq!(ZoneContext::Utc.valid_offsets(when).len(), 1);

        let fixed = ZoneContext::parse("+02:00").unwrap();
        assert_eq!(fixed.valid_offsets(when).len(), 1);
    }

    #[test]
    fn spring_forward_gap_has_no_offsets() {
        // 2020-03-08 02:30 does not exist in America/New_York (02:00 jumps
        // to 03:00).
        let zone = ZoneContext::parse("America/New_York").unwrap();
        let gap = local(2020, 3, 8, 2, 30, 0);
        assert!(zone.valid_offsets(gap).is_empty());
        assert!(matches!(
            zone.to_epoch_second(gap),
            Err(ZoneError::DaylightSavingGap { .. })
        ));
    }

    #[test]
    fn fall_back_fold_lists_earlier_offset_first() {
        // 2020-11-01 01:30 happens twice in America/New_York: first as EDT
        // (-04:00), then as EST (-05:00).
        let zone = ZoneContext::parse("America/New_York").unwrap();
        let fold = local(2020, 11, 1, 1, 30, 0);

        let offsets = zone.valid_offsets(fold);
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets[0], FixedOffset::west_opt(4 * 3600).unwrap());
        assert_eq!(offsets[1], FixedOffset::west_opt(5 * 3600).unwrap());
    }

    #[test]
    fn fold_resolves_to_first_offset() {
        // The EDT reading of 01:30 is 05:30 UTC.
        let zone = ZoneContext::parse("America/New_York").unwrap();
        let fold = local(2020, 11, 1, 1, 30, 0);

        let epoch_second = zone.to_epoch_second(fold).unwrap();
        let expected = local(2020, 11, 1, 5, 30, 0).and_utc().timestamp();
        assert_eq!(epoch_second, expected);
    }

    #[test]
    fn epoch_second_accounts_for_fixed_offsets() {
        let when = local(2020, 1, 1, 0, 0, 0);
        let utc_epoch = ZoneContext::Utc.to_epoch_second(when).unwrap();

        let east = ZoneContext::parse("+02:00").unwrap();
        assert_eq!(east.to_epoch_second(when).unwrap(), utc_epoch - 2 * 3600);

        let west = ZoneContext::parse("-05:00").unwrap();
        assert_eq!(west.to_epoch_second(when).unwrap(), utc_epoch + 5 * 3600);
    }

    #[test]
    fn local_date_time_round_trips_through_epoch_second() {
        let zone = ZoneContext::parse("America/New_York").unwrap();
        let when = local(2020, 6, 15, 10, 30, 0);

        let epoch_second = zone.to_epoch_second(when).unwrap();
        let instant = Utc.timestamp_opt(epoch_second, 0).single().unwrap();
        assert_eq!(zone.local_date_time(instant), when);
    }
}
