//! Calendar dates in a country's local timezone.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Result, VaxError};

/// Today's date in the IANA timezone `tz` (e.g. `"Asia/Amman"`).
pub fn localdate(tz: &str) -> Result<NaiveDate> {
    localdate_at(tz, Utc::now(), None)
}

/// The date in `tz` at instant `now`.
///
/// With `hour_limit = Some(h)`, a local time before `h:00` yields the previous
/// day: sources that publish in the evening still show yesterday's figures in
/// the morning.
pub fn localdate_at(tz: &str, now: DateTime<Utc>, hour_limit: Option<u32>) -> Result<NaiveDate> {
    let zone: Tz = tz
        .parse()
        .map_err(|e| VaxError::config(format!("unknown timezone '{tz}': {e}")))?;

    let local = now.with_timezone(&zone);
    let date = local.date_naive();

    match hour_limit {
        Some(limit) if local.hour() < limit => date
            .pred_opt()
            .ok_or_else(|| VaxError::validation(format!("no day before {date}"))),
        _ => Ok(date),
    }
}
