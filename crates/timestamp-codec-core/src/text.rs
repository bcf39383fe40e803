//! Text conversion layer: timestamp literals in, formatted strings out.
//!
//! This module owns both directions of the textual boundary:
//!
//! - `parse` turns a zone-naive literal into a compact or extended
//!   encoded value, routed by the declared precision.
//! - `format` renders an encoded value back to text with a
//!   caller-specified fractional digit count.
//!
//! Both directions treat the zone as an out-of-band parameter; a zone
//! token embedded in a literal is always an error.

pub mod error;
mod format;
mod parse;

pub use error::{FormatError, ParseError};
pub use format::{DEFAULT_DATE_TIME_PATTERN, format_timestamp, format_timestamp_with};
pub use parse::{
    extract_timestamp_precision, parse_legacy_timestamp, parse_timestamp, timestamp_has_time_zone,
};
