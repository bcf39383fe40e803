//! Variable-precision timestamp codec for columnar query processing.
//!
//! This crate converts between textual timestamp literals and two
//! fixed-width binary encodings, and performs precision rescaling,
//! rounding, and zone-aware formatting of the encoded values:
//!
//! - Exact power-of-ten rescaling and the single tie-breaking rounding
//!   primitive shared by every conversion (`precision` module).
//! - The compact (`i64`, precision 0–6) and extended
//!   (epoch-micros + picosecond remainder, precision 7–12) encodings and
//!   their instant conversions (`encoding` module).
//! - Caller-supplied zone contexts with daylight-saving-aware offset
//!   resolution for the legacy session-zone path (`zone` module).
//! - Pattern-based literal parsing and precision-exact formatting
//!   (`text` module).
//!
//! Every operation is a pure, synchronous function over fixed-width
//! integers; precision loss, overflow, and nonexistent civil times are
//! reported as errors, never silently absorbed.
//!
//! ```
//! use timestamp_codec_core::encoding::TimestampValue;
//! use timestamp_codec_core::text::{format_timestamp, parse_timestamp};
//! use timestamp_codec_core::zone::ZoneContext;
//!
//! let parsed = parse_timestamp(6, "2020-06-15 10:30:00.123456")?;
//! let TimestampValue::Compact(epoch_micros) = parsed else {
//!     unreachable!("precision 6 is compact");
//! };
//!
//! let text = format_timestamp(6, epoch_micros, 0, &ZoneContext::Utc)?;
//! assert_eq!(text, "2020-06-15 10:30:00.123456");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]
pub mod encoding;
pub mod precision;
pub mod text;
pub mod zone;
