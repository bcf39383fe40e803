//! Zone-aware formatting of timestamp values back to text.
//!
//! Formatting renders the whole-second calendar portion in a caller-given
//! zone, then appends a zero-padded fractional suffix obtained by
//! truncating the full 12-digit picosecond quantity down to the requested
//! digit count. No rounding happens here; the stored value is expected
//! to already sit at the target precision.

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use snafu::{OptionExt, ResultExt, ensure};

use crate::precision::{self, MAX_PRECISION, PICOSECONDS_PER_MICROSECOND};
use crate::text::error::{self, FormatError};
use crate::zone::ZoneContext;

/// Default strftime pattern for the year-to-second portion.
pub const DEFAULT_DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp with the default year-to-second pattern.
///
/// See [`format_timestamp_with`].
pub fn format_timestamp(
    precision: u32,
    epoch_micros: i64,
    picos_of_micro: i32,
    zone: &ZoneContext,
) -> Result<String, FormatError> {
    format_timestamp_with(
        precision,
        epoch_micros,
        picos_of_micro,
        zone,
        DEFAULT_DATE_TIME_PATTERN,
    )
}

/// Format a timestamp of the given precision with a caller-supplied
/// year-to-second strftime pattern.
///
/// `picos_of_micro` must lie in [0, 1_000_000). For `precision > 0` the
/// microsecond-of-second remainder and `picos_of_micro` are combined into
/// a 12-digit picosecond quantity and truncating-rescaled to `precision`
/// digits; callers that need rounding must round the stored value first.
pub fn format_timestamp_with(
    precision: u32,
    epoch_micros: i64,
    picos_of_micro: i32,
    zone: &ZoneContext,
    date_time_pattern: &str,
) -> Result<String, FormatError> {
    ensure!(
        picos_of_micro >= 0 && i64::from(picos_of_micro) < PICOSECONDS_PER_MICROSECOND,
        error::PicosOutOfRangeSnafu { picos_of_micro }
    );

    let epoch_second = precision::scale_epoch_micros_to_seconds(epoch_micros);
    let instant = Utc
        .timestamp_opt(epoch_second, 0)
        .single()
        .context(error::UnrepresentableInstantSnafu { epoch_second })?;
    let local = zone.local_date_time(instant);

    let mut rendered = String::new();
    write!(rendered, "{}", local.format(date_time_pattern))
        .ok()
        .context(error::InvalidPatternSnafu {
            pattern: date_time_pattern,
        })?;

    if precision > 0 {
        let pico_fraction = precision::micros_of_second(epoch_micros) * PICOSECONDS_PER_MICROSECOND
            + i64::from(picos_of_micro);
        let scaled = precision::rescale(pico_fraction, MAX_PRECISION, precision)
            .context(error::FractionSnafu { precision })?;
        rendered.push('.');
        let _ = write!(rendered, "{scaled:0width$}", width = precision as usize);
    }

    Ok(rendered)
}
