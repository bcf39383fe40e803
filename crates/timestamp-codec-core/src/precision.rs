//! Exact integer arithmetic over fractional-second precisions.
//!
//! A *precision* is the number of fractional-second digits a timestamp
//! retains, from 0 (whole seconds) to 12 (picoseconds). This module owns:
//!
//! - The power-of-ten scale table shared by every conversion in the crate.
//! - [`rescale`], the only way values move between precisions: widening is
//!   an exact multiply, narrowing is a truncating divide. Callers that want
//!   rounding instead of truncation must pre-round with [`round`].
//! - [`round_to_nearest`] / [`round`], the single rounding primitive used
//!   wherever ties must be broken. The tie-break is half-up for
//!   non-negative values and carries the same additive bias for negative
//!   values (ties round toward positive infinity), which is not
//!   round-half-to-even. Stored values depend on this exact rule.
//! - Unit-scaling helpers between epoch seconds, millis, and micros with
//!   floor semantics for negative (pre-epoch) values.
//!
//! Everything here is pure and overflow-checked; results that do not fit an
//! `i64` are reported as errors, never wrapped.

use snafu::{OptionExt, Snafu, ensure};

/// Highest supported fractional-second precision (picoseconds).
pub const MAX_PRECISION: u32 = 12;

/// Highest precision that still fits the compact single-`i64` encoding.
pub const MAX_COMPACT_PRECISION: u32 = 6;

/// Highest precision stored at millisecond resolution within the compact
/// encoding; precisions 4 through [`MAX_COMPACT_PRECISION`] store micros.
pub const MAX_MILLIS_PRECISION: u32 = 3;

/// Milliseconds in one second.
pub const MILLISECONDS_PER_SECOND: i64 = 1_000;
/// Microseconds in one second.
pub const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
/// Microseconds in one millisecond.
pub const MICROSECONDS_PER_MILLISECOND: i64 = 1_000;
/// Picoseconds in one second.
pub const PICOSECONDS_PER_SECOND: i64 = 1_000_000_000_000;
/// Nanoseconds in one microsecond.
pub const NANOSECONDS_PER_MICROSECOND: i64 = 1_000;
/// Picoseconds in one microsecond.
pub const PICOSECONDS_PER_MICROSECOND: i64 = 1_000_000;
/// Picoseconds in one nanosecond.
pub const PICOSECONDS_PER_NANOSECOND: i64 = 1_000;

const POWERS_OF_TEN: [i64; 13] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
];

/// Errors from precision arithmetic.
///
/// All variants are synchronous, non-retryable argument or range failures;
/// nothing here is recovered internally.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum PrecisionError {
    /// A precision or magnitude argument fell outside the supported range.
    #[snafu(display("Precision {precision} is out of range [0, {MAX_PRECISION}]"))]
    PrecisionOutOfRange {
        /// The offending precision value.
        precision: u32,
    },

    /// Rescaling is only defined for non-negative values.
    #[snafu(display("Cannot rescale negative value {value}"))]
    NegativeValue {
        /// The negative input that was rejected.
        value: i64,
    },

    /// Rounding bounds must be positive.
    #[snafu(display("Rounding bound must be positive, got {bound}"))]
    NonPositiveBound {
        /// The non-positive bound that was rejected.
        bound: i64,
    },

    /// The result does not fit an `i64`.
    #[snafu(display("Arithmetic overflow while scaling {value}"))]
    Overflow {
        /// The input value whose scaled result overflowed.
        value: i64,
    },
}

fn check_precision(precision: u32) -> Result<(), PrecisionError> {
    ensure!(precision <= MAX_PRECISION, PrecisionOutOfRangeSnafu { precision });
    Ok(())
}

fn power_of_ten(magnitude: u32) -> Result<i64, PrecisionError> {
    check_precision(magnitude)?;
    Ok(POWERS_OF_TEN[magnitude as usize])
}

/// Divide `value` by `factor`, rounding the quotient to nearest.
///
/// Ties break half-up for non-negative values; negative values get the same
/// additive bias, so their ties round toward positive infinity.
pub(crate) fn round_div(value: i64, factor: i64) -> Result<i64, PrecisionError> {
    ensure!(factor > 0, NonPositiveBoundSnafu { bound: factor });

    let biased = if value >= 0 {
        value.checked_add(factor / 2)
    } else {
        value.checked_add(1 - factor / 2)
    };
    Ok(biased.context(OverflowSnafu { value })? / factor)
}

/// Round `value` to the nearest multiple of `bound`.
///
/// `bound` must be positive; in practice it is always a power of ten from
/// the supported table. See the module docs for the exact tie-break.
pub fn round_to_nearest(value: i64, bound: i64) -> Result<i64, PrecisionError> {
    let quotient = round_div(value, bound)?;
    quotient.checked_mul(bound).context(OverflowSnafu { value })
}

/// Round `value` to the nearest `10^magnitude`, for `magnitude` in [0, 12].
pub fn round(value: i64, magnitude: u32) -> Result<i64, PrecisionError> {
    round_to_nearest(value, power_of_ten(magnitude)?)
}

/// Rescale a non-negative `value` from one precision to another.
///
/// Widening (`from_precision <= to_precision`) appends zero digits via an
/// exact multiply; narrowing truncates the dropped digits. Both precisions
/// must lie in [0, [`MAX_PRECISION`]].
///
/// # Errors
///
/// - `NegativeValue` for `value < 0`.
/// - `PrecisionOutOfRange` when either precision exceeds [`MAX_PRECISION`].
/// - `Overflow` when widening does not fit an `i64`.
pub fn rescale(value: i64, from_precision: u32, to_precision: u32) -> Result<i64, PrecisionError> {
    check_precision(from_precision)?;
    check_precision(to_precision)?;
    ensure!(value >= 0, NegativeValueSnafu { value });

    if from_precision <= to_precision {
        let factor = POWERS_OF_TEN[(to_precision - from_precision) as usize];
        value.checked_mul(factor).context(OverflowSnafu { value })
    } else {
        Ok(value / POWERS_OF_TEN[(from_precision - to_precision) as usize])
    }
}

/// Scale an epoch-microsecond count down to epoch milliseconds (floor).
pub fn scale_epoch_micros_to_millis(epoch_micros: i64) -> i64 {
    epoch_micros.div_euclid(MICROSECONDS_PER_MILLISECOND)
}

/// Scale an epoch-millisecond count up to epoch microseconds.
pub fn scale_epoch_millis_to_micros(epoch_millis: i64) -> Result<i64, PrecisionError> {
    epoch_millis
        .checked_mul(MICROSECONDS_PER_MILLISECOND)
        .context(OverflowSnafu { value: epoch_millis })
}

/// Scale an epoch-microsecond count down to whole epoch seconds (floor).
pub fn scale_epoch_micros_to_seconds(epoch_micros: i64) -> i64 {
    epoch_micros.div_euclid(MICROSECONDS_PER_SECOND)
}

/// Microsecond-of-second remainder of an epoch-microsecond count.
///
/// Always in [0, 1_000_000), including for pre-epoch values.
pub fn micros_of_second(epoch_micros: i64) -> i64 {
    epoch_micros.rem_euclid(MICROSECONDS_PER_SECOND)
}

/// Microsecond-of-millisecond remainder of an epoch-microsecond count.
pub fn micros_of_milli(epoch_micros: i64) -> i64 {
    epoch_micros.rem_euclid(MICROSECONDS_PER_MILLISECOND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_is_identity_at_equal_precision() {
        for precision in 0..=MAX_PRECISION {
            assert_eq!(rescale(12_345, precision, precision).unwrap(), 12_345);
        }
    }

    #[test]
    fn rescale_widen_then_narrow_returns_original() {
        for p1 in 0..=MAX_PRECISION {
            for p2 in p1..=MAX_PRECISION {
                // Keep the widened value inside i64.
                if p2 - p1 > 6 {
                    continue;
                }
                let widened = rescale(987_654, p1, p2).unwrap();
                assert_eq!(rescale(widened, p2, p1).unwrap(), 987_654);
            }
        }
    }

    #[test]
    fn rescale_narrowing_truncates() {
        assert_eq!(rescale(1_999, 3, 0).unwrap(), 1);
        assert_eq!(rescale(123_456, 6, 3).unwrap(), 123);
        assert_eq!(rescale(999, 3, 1).unwrap(), 9);
    }

    #[test]
    fn rescale_widening_appends_zeros() {
        assert_eq!(rescale(123, 3, 6).unwrap(), 123_000);
        assert_eq!(rescale(5, 0, 12).unwrap(), 5_000_000_000_000);
    }

    #[test]
    fn rescale_rejects_negative_values() {
        assert_eq!(rescale(-1, 0, 3), Err(PrecisionError::NegativeValue { value: -1 }));
    }

    #[test]
    fn rescale_rejects_out_of_range_precisions() {
        assert_eq!(
            rescale(1, 13, 0),
            Err(PrecisionError::PrecisionOutOfRange { precision: 13 })
        );
        assert_eq!(
            rescale(1, 0, 13),
            Err(PrecisionError::PrecisionOutOfRange { precision: 13 })
        );
    }

    #[test]
    fn rescale_overflow_is_an_error() {
        let result = rescale(i64::MAX / 10 + 1, 0, 1);
        assert!(matches!(result, Err(PrecisionError::Overflow { .. })));
    }

    #[test]
    fn round_to_nearest_breaks_ties_half_up() {
        assert_eq!(round_to_nearest(1_250, 1_000).unwrap(), 1_000);
        assert_eq!(round_to_nearest(1_499, 1_000).unwrap(), 1_000);
        assert_eq!(round_to_nearest(1_500, 1_000).unwrap(), 2_000);
        assert_eq!(round_to_nearest(1_501, 1_000).unwrap(), 2_000);
    }

    #[test]
    fn round_to_nearest_negative_ties_go_toward_positive_infinity() {
        assert_eq!(round_to_nearest(-1_500, 1_000).unwrap(), -1_000);
        assert_eq!(round_to_nearest(-1_501, 1_000).unwrap(), -2_000);
        assert_eq!(round_to_nearest(-1_499, 1_000).unwrap(), -1_000);
        assert_eq!(round_to_nearest(-500, 1_000).unwrap(), 0);
    }

    #[test]
    fn round_to_nearest_rejects_non_positive_bound() {
        assert_eq!(
            round_to_nearest(100, 0),
            Err(PrecisionError::NonPositiveBound { bound: 0 })
        );
        assert_eq!(
            round_to_nearest(100, -10),
            Err(PrecisionError::NonPositiveBound { bound: -10 })
        );
    }

    #[test]
    fn round_uses_power_of_ten_magnitudes() {
        assert_eq!(round(123_456, 3).unwrap(), 123_000);
        assert_eq!(round(123_500, 3).unwrap(), 124_000);
        assert_eq!(round(7, 0).unwrap(), 7);
        assert_eq!(
            round(1, 13),
            Err(PrecisionError::PrecisionOutOfRange { precision: 13 })
        );
    }

    #[test]
    fn epoch_scaling_uses_floor_semantics_for_pre_epoch_values() {
        assert_eq!(scale_epoch_micros_to_millis(1_999), 1);
        assert_eq!(scale_epoch_micros_to_millis(-1), -1);
        assert_eq!(scale_epoch_micros_to_seconds(-1), -1);
        assert_eq!(scale_epoch_micros_to_seconds(-1_000_000), -1);
        assert_eq!(scale_epoch_millis_to_micros(5).unwrap(), 5_000);
    }

    #[test]
    fn remainders_are_non_negative_for_pre_epoch_values() {
        assert_eq!(micros_of_second(1_500_001), 500_001);
        assert_eq!(micros_of_second(-1), 999_999);
        assert_eq!(micros_of_milli(-1), 999);
        assert_eq!(micros_of_milli(2_001), 1);
    }

    #[test]
    fn scale_epoch_millis_to_micros_overflow_is_an_error() {
        assert!(matches!(
            scale_epoch_millis_to_micros(i64::MAX),
            Err(PrecisionError::Overflow { .. })
        ));
    }
}
