//! Two-tier binary timestamp encodings and instant conversions.
//!
//! A timestamp value is stored in one of two fixed-width encodings, picked
//! by its precision:
//!
//! - [`TimestampValue::Compact`]: one `i64` for precisions 0 through 6.
//!   The unit follows the precision: epoch milliseconds up to precision 3,
//!   epoch microseconds for 4 through 6.
//! - [`TimestampValue::Extended`]: an [`ExtendedTimestamp`] pair of epoch
//!   microseconds plus a picosecond-of-microsecond remainder, for
//!   precisions 7 through 12.
//!
//! The sum type makes the tier boundary an explicit branch instead of a
//! run-time type probe. Conversions to calendar views carry the zone
//! resolution mode as an explicit [`ZoneResolution`] parameter; there is no
//! ambient session state anywhere in this crate.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

use crate::precision::{
    self, MAX_COMPACT_PRECISION, MAX_MILLIS_PRECISION, MAX_PRECISION, MICROSECONDS_PER_SECOND,
    NANOSECONDS_PER_MICROSECOND, PICOSECONDS_PER_MICROSECOND, PICOSECONDS_PER_NANOSECOND,
    PrecisionError,
};
use crate::zone::ZoneContext;

const NANOSECONDS_PER_SECOND: i64 = 1_000_000_000;

/// Errors from encoding construction and decoding.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum EncodingError {
    /// Combining epoch seconds with a fraction overflowed the 64-bit
    /// microsecond encoding.
    #[snafu(display("Timestamp overflows the 64-bit encoding (epoch second {epoch_second})"))]
    EpochOverflow {
        /// The epoch second whose scaled value did not fit.
        epoch_second: i64,
    },

    /// The requested precision requires the extended encoding.
    #[snafu(display(
        "Precision {precision} is out of range [{min}, {MAX_PRECISION}]",
        min = MAX_COMPACT_PRECISION + 1
    ))]
    ExtendedPrecisionOutOfRange {
        /// The precision that does not fit the extended tier.
        precision: u32,
    },

    /// The declared precision routes to the other encoding tier than the
    /// one the value actually uses.
    #[snafu(display("Precision {precision} does not match the value's encoding tier"))]
    TierMismatch {
        /// The declared precision.
        precision: u32,
    },

    /// The decoded epoch second cannot be represented as an instant.
    #[snafu(display("Epoch second {epoch_second} is outside the representable instant range"))]
    UnrepresentableInstant {
        /// The out-of-range epoch second.
        epoch_second: i64,
    },

    /// Precision arithmetic failed while scaling a component.
    #[snafu(display("Precision arithmetic failed: {source}"))]
    Arithmetic {
        /// The underlying precision error.
        source: PrecisionError,
    },
}

/// Extended two-word timestamp encoding for precisions 7 through 12.
///
/// Holds epoch microseconds plus the sub-microsecond remainder in
/// picoseconds. The remainder is always normalized into [0, 1_000_000);
/// carries are folded into `epoch_micros` before construction, never
/// represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExtendedTimestamp {
    epoch_micros: i64,
    picos_of_micro: i32,
}

impl ExtendedTimestamp {
    /// Build from already-normalized parts.
    ///
    /// `picos_of_micro` must lie in [0, 1_000_000); any microsecond carry
    /// has to be folded into `epoch_micros` by the caller. The range is
    /// checked again at the formatting entry point rather than re-derived
    /// on every construction.
    pub fn new(epoch_micros: i64, picos_of_micro: i32) -> Self {
        debug_assert!(
            (0..PICOSECONDS_PER_MICROSECOND as i32).contains(&picos_of_micro),
            "picos_of_micro {picos_of_micro} out of [0, 1_000_000)"
        );
        Self {
            epoch_micros,
            picos_of_micro,
        }
    }

    /// Elapsed microseconds since the epoch.
    pub fn epoch_micros(&self) -> i64 {
        self.epoch_micros
    }

    /// Sub-microsecond remainder in picoseconds, in [0, 1_000_000).
    pub fn picos_of_micro(&self) -> i32 {
        self.picos_of_micro
    }
}

/// Precision-tagged union over the two timestamp encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimestampValue {
    /// Single-word encoding, precision 0–6. Epoch millis up to precision
    /// 3, epoch micros for 4–6.
    Compact(i64),
    /// Two-word encoding, precision 7–12.
    Extended(ExtendedTimestamp),
}

/// Zone selection for decoded calendar views.
///
/// The two resolution modes of the codec are distinct code paths carried
/// explicitly through every call, never a hidden session flag.
#[derive(Debug, Clone, Copy)]
pub enum ZoneResolution {
    /// Non-legacy path: instants always render in UTC.
    Utc,
    /// Legacy path: instants render in the session-configured zone.
    Legacy(ZoneContext),
}

/// Collapse an epoch second plus picosecond-of-second fraction into epoch
/// microseconds, rounding the sub-microsecond part half-up.
pub fn epoch_second_to_micros_with_rounding(
    epoch_second: i64,
    pico_of_second: i64,
) -> Result<i64, EncodingError> {
    let micros = epoch_second
        .checked_mul(MICROSECONDS_PER_SECOND)
        .context(EpochOverflowSnafu { epoch_second })?;
    let rounded = precision::round_div(pico_of_second, PICOSECONDS_PER_MICROSECOND)
        .context(ArithmeticSnafu)?;
    micros
        .checked_add(rounded)
        .context(EpochOverflowSnafu { epoch_second })
}

/// Build an extended timestamp from an epoch second and a fraction in
/// picoseconds.
///
/// `fraction_in_picos` must lie in [0, 10^12); whole microseconds in the
/// fraction are folded into the microsecond word, the remainder becomes
/// `picos_of_micro`.
pub fn extended_from_epoch(
    epoch_second: i64,
    fraction_in_picos: i64,
) -> Result<ExtendedTimestamp, EncodingError> {
    let epoch_micros = epoch_second
        .checked_mul(MICROSECONDS_PER_SECOND)
        .and_then(|micros| micros.checked_add(fraction_in_picos / PICOSECONDS_PER_MICROSECOND))
        .context(EpochOverflowSnafu { epoch_second })?;

    Ok(ExtendedTimestamp::new(
        epoch_micros,
        (fraction_in_picos % PICOSECONDS_PER_MICROSECOND) as i32,
    ))
}

/// Build an extended timestamp from an absolute instant at a target
/// precision in [7, 12].
///
/// The sub-microsecond nanoseconds are scaled to picoseconds and rounded
/// to the nearest `10^(12 - precision)`; a rounded-up carry into the next
/// microsecond is folded into the microsecond word.
pub fn extended_from_instant(
    precision: u32,
    instant: DateTime<Utc>,
) -> Result<ExtendedTimestamp, EncodingError> {
    ensure!(
        precision > MAX_COMPACT_PRECISION && precision <= MAX_PRECISION,
        ExtendedPrecisionOutOfRangeSnafu { precision }
    );

    let epoch_second = instant.timestamp();
    let mut epoch_micros = epoch_second
        .checked_mul(MICROSECONDS_PER_SECOND)
        .and_then(|micros| micros.checked_add(i64::from(instant.timestamp_subsec_micros())))
        .context(EpochOverflowSnafu { epoch_second })?;

    let sub_micro_nanos = i64::from(instant.timestamp_subsec_nanos()) % NANOSECONDS_PER_MICROSECOND;
    let mut picos = precision::round(
        sub_micro_nanos * PICOSECONDS_PER_NANOSECOND,
        MAX_PRECISION - precision,
    )
    .context(ArithmeticSnafu)?;

    if picos >= PICOSECONDS_PER_MICROSECOND {
        epoch_micros = epoch_micros
            .checked_add(1)
            .context(EpochOverflowSnafu { epoch_second })?;
        picos -= PICOSECONDS_PER_MICROSECOND;
    }

    Ok(ExtendedTimestamp::new(epoch_micros, picos as i32))
}

/// Decode a timestamp value into a zone-naive calendar view.
///
/// The compact tier is scaled from its precision-dependent unit to true
/// microseconds, the extended tier's picoseconds are rounded to the
/// nearest nanosecond, and the resulting instant is rendered under the
/// given [`ZoneResolution`].
///
/// # Errors
///
/// - `TierMismatch` when `precision` routes to the other tier than the
///   one `value` uses.
/// - `UnrepresentableInstant` when the epoch second exceeds the calendar
///   range.
/// - `Arithmetic` / `EpochOverflow` when a scaled component does not fit.
pub fn to_local_date_time(
    value: TimestampValue,
    precision: u32,
    resolution: ZoneResolution,
) -> Result<NaiveDateTime, EncodingError> {
    let (epoch_micros, picos_of_micro) = match value {
        TimestampValue::Compact(encoded) => {
            ensure!(precision <= MAX_COMPACT_PRECISION, TierMismatchSnafu { precision });
            if precision <= MAX_MILLIS_PRECISION {
                (
                    precision::scale_epoch_millis_to_micros(encoded).context(ArithmeticSnafu)?,
                    0,
                )
            } else {
                (encoded, 0)
            }
        }
        TimestampValue::Extended(extended) => {
            ensure!(
                precision > MAX_COMPACT_PRECISION && precision <= MAX_PRECISION,
                TierMismatchSnafu { precision }
            );
            (extended.epoch_micros(), i64::from(extended.picos_of_micro()))
        }
    };

    let mut epoch_second = precision::scale_epoch_micros_to_seconds(epoch_micros);
    let nanos = precision::round_to_nearest(picos_of_micro, PICOSECONDS_PER_NANOSECOND)
        .context(ArithmeticSnafu)?
        / PICOSECONDS_PER_NANOSECOND;
    let mut nano_of_second =
        precision::micros_of_second(epoch_micros) * NANOSECONDS_PER_MICROSECOND + nanos;

    // Rounding picos up at .999999 can carry into the next second.
    if nano_of_second >= NANOSECONDS_PER_SECOND {
        epoch_second = epoch_second
            .checked_add(1)
            .context(EpochOverflowSnafu { epoch_second })?;
        nano_of_second -= NANOSECONDS_PER_SECOND;
    }

    let instant = Utc
        .timestamp_opt(epoch_second, nano_of_second as u32)
        .single()
        .context(UnrepresentableInstantSnafu { epoch_second })?;

    Ok(match resolution {
        ZoneResolution::Utc => instant.naive_utc(),
        ZoneResolution::Legacy(zone) => zone.local_date_time(instant),
    })
}
