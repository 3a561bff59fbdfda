// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Notice time conversions.
//!
//! Burst times arrive as a truncated Julian day (TJD) plus a centisecond of
//! day. TJD 12640 is 2003-01-01T00:00:00 UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

/// TJD of the 2003-01-01 anchor.
pub const TJD_ANCHOR: i32 = 12640;

/// Timestamp format used on the control socket and script command line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn anchor() -> Option<DateTime<Utc>> {
    Some(NaiveDate::from_ymd_opt(2003, 1, 1)?.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Convert a TJD and centisecond of day into a UTC timestamp.
///
/// Returns `None` only when the result is outside chrono's range.
pub fn tjd_to_datetime(tjd: i32, sod_centis: i32) -> Option<DateTime<Utc>> {
    let days = Duration::try_days(i64::from(tjd) - i64::from(TJD_ANCHOR))?;
    let millis = Duration::try_milliseconds(i64::from(sod_centis) * 10)?;
    anchor()?.checked_add_signed(days)?.checked_add_signed(millis)
}

/// Split a UTC timestamp into TJD and centisecond of day.
pub fn datetime_to_tjd(t: &DateTime<Utc>) -> Option<(i32, i32)> {
    let date = t.date_naive();
    let days = date.signed_duration_since(anchor()?.date_naive()).num_days();
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    let centis = (*t - midnight).num_milliseconds() / 10;
    let tjd = i32::try_from(i64::from(TJD_ANCHOR) + days).ok()?;
    Some((tjd, i32::try_from(centis).ok()?))
}

fn start_of_year(year: i32) -> Option<DateTime<Utc>> {
    Some(NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Decimal year of `t`, e.g. 2004.5 for mid-2004.
///
/// The fraction is the elapsed share of that calendar year, so leap years
/// are handled exactly.
pub fn decimal_year(t: &DateTime<Utc>) -> f64 {
    let year = t.year();
    match (start_of_year(year), start_of_year(year + 1)) {
        (Some(start), Some(next)) => {
            let elapsed = (*t - start).num_milliseconds() as f64;
            let length = (next - start).num_milliseconds() as f64;
            f64::from(year) + elapsed / length
        }
        _ => f64::from(year),
    }
}

/// Format as `yyyy-MM-ddTHH:mm:ss`.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse `yyyy-MM-ddTHH:mm:ss` as a UTC timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}
