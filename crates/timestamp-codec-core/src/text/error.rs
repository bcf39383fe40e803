//! Error enums for the text conversion layer.
//!
//! Parsing and formatting sit on top of the precision, encoding, and zone
//! layers; their errors wrap the lower-level ones through `source` fields
//! while always carrying the offending literal so callers can surface it
//! in user-facing query errors.

use snafu::Snafu;

use crate::encoding::EncodingError;
use crate::precision::{MAX_COMPACT_PRECISION, MAX_PRECISION, PrecisionError};
use crate::zone::ZoneError;

/// Errors from parsing textual timestamp literals.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    /// The text does not match the timestamp grammar.
    #[snafu(display("Invalid timestamp: {value}"))]
    Malformed {
        /// The literal that failed to match.
        value: String,
    },

    /// The literal carries a zone suffix, but this parser only accepts
    /// zone-naive literals; the zone is supplied out-of-band.
    #[snafu(display(
        "Timestamp literal {value} carries a zone suffix; the zone must be supplied separately"
    ))]
    UnexpectedZone {
        /// The literal with the embedded zone.
        value: String,
    },

    /// The fraction is too long for the compact encoding.
    #[snafu(display(
        "Cannot parse {value} as a compact timestamp; max allowed precision is {MAX_COMPACT_PRECISION}"
    ))]
    NotCompact {
        /// The literal whose fraction exceeds the compact range.
        value: String,
    },

    /// The fraction is too short for (or absent from) the extended
    /// encoding, which requires more than six digits.
    #[snafu(display(
        "Cannot parse {value} as an extended timestamp; precision must be in the range [{min}, {MAX_PRECISION}]",
        min = MAX_COMPACT_PRECISION + 1
    ))]
    NotExtended {
        /// The literal that must be long-form but is not.
        value: String,
    },

    /// The civil date-time does not exist in the supplied zone.
    #[snafu(display("Invalid timestamp {value}: {source}"))]
    CivilTime {
        /// The literal whose local time could not be resolved.
        value: String,
        /// The underlying zone resolution error.
        source: ZoneError,
    },

    /// Scaling the fraction digits to the target resolution failed.
    #[snafu(display("Invalid timestamp {value} at precision {precision}: {source}"))]
    Rescale {
        /// The literal being parsed.
        value: String,
        /// The fraction's digit count.
        precision: u32,
        /// The underlying precision error.
        source: PrecisionError,
    },

    /// Combining the epoch second with the fraction overflowed the
    /// compact 64-bit encoding.
    #[snafu(display("Timestamp {value} overflows the 64-bit encoding"))]
    Overflow {
        /// The literal whose encoded value did not fit.
        value: String,
    },

    /// Building the extended encoding failed.
    #[snafu(display("Timestamp {value} does not fit the encoding: {source}"))]
    Encode {
        /// The literal being parsed.
        value: String,
        /// The underlying encoding error.
        source: EncodingError,
    },
}

/// Errors from formatting timestamp values back to text.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    /// `picos_of_micro` must be a normalized sub-microsecond remainder.
    #[snafu(display("picos_of_micro {picos_of_micro} is out of range [0, 1_000_000)"))]
    PicosOutOfRange {
        /// The out-of-range remainder.
        picos_of_micro: i32,
    },

    /// The epoch second cannot be represented as an instant.
    #[snafu(display("Epoch second {epoch_second} is outside the representable instant range"))]
    UnrepresentableInstant {
        /// The out-of-range epoch second.
        epoch_second: i64,
    },

    /// The caller-supplied date-time pattern is not a valid strftime
    /// pattern.
    #[snafu(display("Invalid date-time pattern: {pattern}"))]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
    },

    /// Rendering the fractional suffix failed, typically because the
    /// requested precision exceeds the supported range.
    #[snafu(display("Cannot render fraction at precision {precision}: {source}"))]
    Fraction {
        /// The requested fractional digit count.
        precision: u32,
        /// The underlying precision error.
        source: PrecisionError,
    },
}
